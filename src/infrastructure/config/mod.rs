//! Infrastructure configuration modules.

pub mod cluster;
pub mod logging;
pub mod readiness;
pub mod settings;
pub mod timing;

pub use settings::Config;
