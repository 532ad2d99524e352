//! System memory probing used to size the cache budget.

use sysinfo::{MemoryRefreshKind, RefreshKind, System};

/// Source of the machine's total memory in bytes.
pub trait MemoryProbe: Send {
    fn total_memory(&mut self) -> u64;
}

/// [`MemoryProbe`] backed by `sysinfo`.
pub struct SystemMemory {
    system: System,
}

impl SystemMemory {
    pub fn new() -> Self {
        Self {
            system: System::new_with_specifics(
                RefreshKind::nothing().with_memory(MemoryRefreshKind::everything()),
            ),
        }
    }
}

impl Default for SystemMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for SystemMemory {
    fn total_memory(&mut self) -> u64 {
        self.system.refresh_memory();
        self.system.total_memory()
    }
}
