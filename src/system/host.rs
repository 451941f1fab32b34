use std::sync::Mutex;

use sysinfo::{MemoryRefreshKind, RefreshKind, System};

use super::cpu::CoreTimeCounters;
use super::memory::MemoryBytes;
use super::platform;
use crate::error::{CollectError, PlatformQuery};

/// Local, synchronous OS queries used by the CPU and memory samplers.
pub trait PlatformSource: Send + Sync {
    fn core_time_counters(&self) -> Result<Vec<CoreTimeCounters>, CollectError>;
    fn memory_bytes(&self) -> Result<MemoryBytes, CollectError>;
}

/// The real machine: core counters from the platform layer, memory from sysinfo.
pub struct HostPlatform {
    sys: Mutex<System>,
}

impl Default for HostPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl HostPlatform {
    pub fn new() -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::nothing().with_memory(MemoryRefreshKind::nothing().with_ram()),
        );
        HostPlatform {
            sys: Mutex::new(sys),
        }
    }
}

impl PlatformSource for HostPlatform {
    fn core_time_counters(&self) -> Result<Vec<CoreTimeCounters>, CollectError> {
        platform::core_time_counters()
    }

    fn memory_bytes(&self) -> Result<MemoryBytes, CollectError> {
        let mut sys = self.sys.lock().map_err(|_| CollectError::PlatformRead {
            query: PlatformQuery::Memory,
            detail: "sysinfo handle poisoned by an earlier panic".to_string(),
        })?;
        sys.refresh_memory_specifics(MemoryRefreshKind::nothing().with_ram());
        // MemAvailable, not MemFree
        Ok(MemoryBytes {
            total: sys.total_memory(),
            free: sys.available_memory(),
        })
    }
}
