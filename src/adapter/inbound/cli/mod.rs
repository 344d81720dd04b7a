//! Command-line adapter: argument parsing, handlers and terminal output.

pub mod check;
pub mod command;
pub mod diagnostic;
pub mod dispatch;
pub mod output;
pub mod signal;
pub mod up;
