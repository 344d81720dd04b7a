//! Registry of launched processes.
//!
//! Records are appended in launch order and only for processes the OS
//! actually created. Teardown drains the whole registry at once.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Address, Role};
use crate::port::outbound::process::ProcessHandle;

/// A launched process and the address it was told to bind.
#[derive(Debug)]
pub struct ProcessRecord {
    handle: Box<dyn ProcessHandle>,
    address: Address,
    role: Role,
    launched_at: DateTime<Utc>,
}

impl ProcessRecord {
    #[must_use]
    pub fn new(handle: Box<dyn ProcessHandle>, address: Address, role: Role) -> Self {
        Self {
            handle,
            address,
            role,
            launched_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn address(&self) -> &Address {
        &self.address
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.handle.id()
    }

    pub fn handle_mut(&mut self) -> &mut dyn ProcessHandle {
        self.handle.as_mut()
    }

    /// Serializable snapshot for status output.
    #[must_use]
    pub fn summary(&self) -> ProcessSummary {
        ProcessSummary {
            role: self.role,
            address: self.address.clone(),
            pid: self.pid(),
            launched_at: self.launched_at,
        }
    }
}

/// Plain-data view of a [`ProcessRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessSummary {
    pub role: Role,
    pub address: Address,
    pub pid: Option<u32>,
    pub launched_at: DateTime<Utc>,
}

/// Ordered collection of launched processes.
#[derive(Debug, Default)]
pub struct ProcessRegistry {
    records: Vec<ProcessRecord>,
}

impl ProcessRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Launch order is preserved.
    pub fn register(&mut self, record: ProcessRecord) {
        self.records.push(record);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records for one role.
    #[must_use]
    pub fn count(&self, role: Role) -> usize {
        self.records.iter().filter(|r| r.role == role).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn summaries(&self) -> Vec<ProcessSummary> {
        self.records.iter().map(ProcessRecord::summary).collect()
    }

    /// Remove and return every record, leaving the registry empty.
    pub fn take_all(&mut self) -> Vec<ProcessRecord> {
        std::mem::take(&mut self.records)
    }
}
