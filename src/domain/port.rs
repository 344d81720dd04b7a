//! Per-role port counters.
//!
//! Each role draws from its own conventional range (scheduler 10001+,
//! object store 20001+, worker 40001+). Counters only move forward, so a
//! port is never handed out twice by the same allocator. The ranges are
//! conventions: nothing stops the worker range from running into ports used
//! by something else on the host.

use super::address::Address;
use super::error::DomainError;
use super::role::Role;

/// Monotonic port counter for a single role.
#[derive(Debug, Clone)]
pub struct PortCounter {
    role: Role,
    base: u16,
    next: u16,
}

impl PortCounter {
    /// Create a counter starting at the role's base port.
    #[must_use]
    pub const fn new(role: Role) -> Self {
        Self::with_base(role, role.base_port())
    }

    /// Create a counter with an explicit base.
    #[must_use]
    pub const fn with_base(role: Role, base: u16) -> Self {
        Self { role, base, next: 0 }
    }

    /// Number of ports handed out so far.
    #[must_use]
    pub const fn allocated(&self) -> u16 {
        self.next
    }

    /// Hand out the next port.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::PortsExhausted`] once `base + next` would pass
    /// 65535. The counter is left unchanged in that case.
    pub fn allocate(&mut self) -> Result<u16, DomainError> {
        let exhausted = DomainError::PortsExhausted { role: self.role };
        let next = self.next.checked_add(1).ok_or(exhausted.clone())?;
        let port = self.base.checked_add(next).ok_or(exhausted)?;
        self.next = next;
        Ok(port)
    }
}

/// The three independent counters used by one orchestrator.
#[derive(Debug, Clone)]
pub struct PortAllocator {
    scheduler: PortCounter,
    object_store: PortCounter,
    worker: PortCounter,
}

impl PortAllocator {
    /// Create an allocator with the conventional base ports.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            scheduler: PortCounter::new(Role::Scheduler),
            object_store: PortCounter::new(Role::ObjectStore),
            worker: PortCounter::new(Role::Worker),
        }
    }

    fn counter_mut(&mut self, role: Role) -> &mut PortCounter {
        match role {
            Role::Scheduler => &mut self.scheduler,
            Role::ObjectStore => &mut self.object_store,
            Role::Worker => &mut self.worker,
        }
    }

    /// Read-only view of a role's counter.
    #[must_use]
    pub fn counter(&self, role: Role) -> &PortCounter {
        match role {
            Role::Scheduler => &self.scheduler,
            Role::ObjectStore => &self.object_store,
            Role::Worker => &self.worker,
        }
    }

    /// Allocate the next port for `role`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::PortsExhausted`] when the role's range is used up.
    pub fn allocate(&mut self, role: Role) -> Result<u16, DomainError> {
        self.counter_mut(role).allocate()
    }

    /// Allocate the next port for `role` and pair it with `host`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::PortsExhausted`] when the role's range is used up.
    pub fn allocate_address(&mut self, role: Role, host: &str) -> Result<Address, DomainError> {
        let port = self.allocate(role)?;
        Ok(Address::new(host, port))
    }
}

impl Default for PortAllocator {
    fn default() -> Self {
        Self::new()
    }
}
