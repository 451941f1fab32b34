use super::cpu::CoreTimeCounters;
use crate::error::CollectError;

pub trait PlatformExtensions {
    fn core_time_counters() -> Result<Vec<CoreTimeCounters>, CollectError>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(not(target_os = "linux"))]
mod unsupported;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(not(target_os = "linux"))]
use unsupported as platform_impl;

pub fn core_time_counters() -> Result<Vec<CoreTimeCounters>, CollectError> {
    platform_impl::Platform::core_time_counters()
}
