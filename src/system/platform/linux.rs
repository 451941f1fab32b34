use super::PlatformExtensions;
use crate::error::{CollectError, PlatformQuery};
use crate::system::cpu::{CoreTimeCounters, parse_proc_stat};

const PROC_STAT: &str = "/proc/stat";

pub struct Platform;

impl PlatformExtensions for Platform {
    fn core_time_counters() -> Result<Vec<CoreTimeCounters>, CollectError> {
        // Per-core rows of /proc/stat, in USER_HZ ticks since boot
        let contents =
            std::fs::read_to_string(PROC_STAT).map_err(|e| CollectError::PlatformRead {
                query: PlatformQuery::CoreTimeCounters,
                detail: format!("{PROC_STAT}: {e}"),
            })?;
        parse_proc_stat(&contents)
    }
}
