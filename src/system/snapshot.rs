use serde::Serialize;

use super::cpu::CpuUtilization;
use super::memory::MemoryUsage;

/// Everything one successful sampling cycle observed.
///
/// The `Default` value stands in before the first cycle completes: sequence 0,
/// no cores, zero memory and no temperatures.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SystemSnapshot {
    pub sequence: u64,
    pub collected_at_unix_ms: u64,
    pub cpu_utilization: CpuUtilization,
    pub memory: MemoryUsage,
    pub core_temperature_c: Option<f64>,
    pub ambient_temperature_c: Option<f64>,
}

impl SystemSnapshot {
    pub fn is_empty(&self) -> bool {
        self.sequence == 0
    }
}
