use super::PlatformExtensions;
use crate::error::{CollectError, PlatformQuery};
use crate::system::cpu::CoreTimeCounters;

pub struct Platform;

impl PlatformExtensions for Platform {
    fn core_time_counters() -> Result<Vec<CoreTimeCounters>, CollectError> {
        Err(CollectError::PlatformRead {
            query: PlatformQuery::CoreTimeCounters,
            detail: format!("not available on {}", std::env::consts::OS),
        })
    }
}
