use serde::Serialize;

use super::host::PlatformSource;
use crate::error::{CollectError, PlatformQuery};

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Raw physical memory totals as reported by the OS.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoryBytes {
    pub total: u64,
    pub free: u64,
}

/// Physical memory in gigabytes, each value rounded to two decimals.
///
/// Rounding is applied per field, so `used_gb + free_gb` can be off from
/// `total_gb` by 0.01.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct MemoryUsage {
    pub total_gb: f64,
    pub used_gb: f64,
    pub free_gb: f64,
}

impl MemoryUsage {
    pub fn sample<P: PlatformSource + ?Sized>(platform: &P) -> Result<Self, CollectError> {
        let bytes = platform.memory_bytes()?;
        if bytes.total == 0 {
            return Err(CollectError::PlatformRead {
                query: PlatformQuery::Memory,
                detail: "platform reported zero total memory".to_string(),
            });
        }
        Ok(Self::from_bytes(bytes))
    }

    pub fn from_bytes(bytes: MemoryBytes) -> Self {
        let used = bytes.total.saturating_sub(bytes.free);
        MemoryUsage {
            total_gb: bytes_to_gb(bytes.total),
            used_gb: bytes_to_gb(used),
            free_gb: bytes_to_gb(bytes.free),
        }
    }

    /// Used share of total memory in percent.
    pub fn used_percent(&self) -> f64 {
        if self.total_gb <= 0.0 {
            return 0.0;
        }
        self.used_gb / self.total_gb * 100.0
    }
}

pub fn bytes_to_gb(bytes: u64) -> f64 {
    let gb = bytes as f64 / BYTES_PER_GB;
    (gb * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::cpu::CoreTimeCounters;

    const GB: u64 = 1024 * 1024 * 1024;

    struct FixedMemory(MemoryBytes);

    impl PlatformSource for FixedMemory {
        fn core_time_counters(&self) -> Result<Vec<CoreTimeCounters>, CollectError> {
            Ok(Vec::new())
        }

        fn memory_bytes(&self) -> Result<MemoryBytes, CollectError> {
            Ok(self.0)
        }
    }

    #[test]
    fn sample_reads_through_the_platform() {
        let usage = MemoryUsage::sample(&FixedMemory(MemoryBytes {
            total: 8 * GB,
            free: 3 * GB,
        }))
        .unwrap();
        assert_eq!(usage.total_gb, 8.0);
        assert_eq!(usage.used_gb, 5.0);
        assert_eq!(usage.free_gb, 3.0);
    }

    #[test]
    fn zero_total_is_a_memory_read_error() {
        let err = MemoryUsage::sample(&FixedMemory(MemoryBytes { total: 0, free: 0 })).unwrap_err();
        assert!(matches!(
            err,
            CollectError::PlatformRead {
                query: PlatformQuery::Memory,
                ..
            }
        ));
        assert_eq!(err.component(), "memory");
    }

    #[test]
    fn converts_whole_gigabytes() {
        assert_eq!(bytes_to_gb(0), 0.0);
        assert_eq!(bytes_to_gb(GB), 1.0);
        assert_eq!(bytes_to_gb(16 * GB), 16.0);
    }

    #[test]
    fn rounds_to_two_decimals() {
        // 1.5 GiB + a few bytes stays at 1.5
        assert_eq!(bytes_to_gb(GB + GB / 2 + 17), 1.5);
        // 1/3 GiB
        assert_eq!(bytes_to_gb(GB / 3), 0.33);
    }

    #[test]
    fn used_is_total_minus_free() {
        let usage = MemoryUsage::from_bytes(MemoryBytes {
            total: 16 * GB,
            free: 4 * GB,
        });
        assert_eq!(usage.total_gb, 16.0);
        assert_eq!(usage.used_gb, 12.0);
        assert_eq!(usage.free_gb, 4.0);
        assert_eq!(usage.used_percent(), 75.0);
    }

    #[test]
    fn free_above_total_saturates() {
        let usage = MemoryUsage::from_bytes(MemoryBytes {
            total: GB,
            free: 2 * GB,
        });
        assert_eq!(usage.used_gb, 0.0);
    }

    #[test]
    fn rounding_drift_is_accepted() {
        // each value rounds on its own, so the sum can miss total by a cent
        let usage = MemoryUsage::from_bytes(MemoryBytes {
            total: 2 * GB,
            free: GB / 200 * 101,
        });
        let drift = (usage.used_gb + usage.free_gb - usage.total_gb).abs();
        assert!(drift <= 0.0100001, "drift {drift}");
    }
}
