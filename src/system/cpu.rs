use serde::Serialize;

use super::host::PlatformSource;
use crate::error::{CollectError, PlatformQuery};

/// Cumulative ticks a single logical core has spent in each state since boot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CoreTimeCounters {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CoreTimeCounters {
    pub fn total(&self) -> u64 {
        [
            self.user,
            self.nice,
            self.system,
            self.idle,
            self.iowait,
            self.irq,
            self.softirq,
            self.steal,
        ]
        .iter()
        .fold(0u64, |acc, v| acc.saturating_add(*v))
    }

    /// Busy percentage since boot, `100 - 100 * idle / total`.
    ///
    /// A core with no recorded ticks reports `0.0`.
    pub fn utilization(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let busy = 100.0 - 100.0 * self.idle as f64 / total as f64;
        round_1(busy.clamp(0.0, 100.0))
    }
}

/// Per-core busy percentages in core-index order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CpuUtilization(pub Vec<f64>);

impl CpuUtilization {
    pub fn sample<P: PlatformSource + ?Sized>(platform: &P) -> Result<Self, CollectError> {
        let counters = platform.core_time_counters()?;
        Ok(Self::from_counters(&counters))
    }

    pub fn from_counters(counters: &[CoreTimeCounters]) -> Self {
        CpuUtilization(counters.iter().map(CoreTimeCounters::utilization).collect())
    }

    pub fn cores(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn average(&self) -> f64 {
        if self.0.is_empty() {
            return 0.0;
        }
        self.0.iter().sum::<f64>() / self.0.len() as f64
    }
}

/// Parse the per-core `cpuN` lines of `/proc/stat`.
///
/// The aggregate `cpu` line is skipped. Columns missing on older kernels read
/// as zero. `guest` and `guest_nice` are already included in `user` and `nice`,
/// so they are not counted again.
pub fn parse_proc_stat(contents: &str) -> Result<Vec<CoreTimeCounters>, CollectError> {
    let mut cores = Vec::new();

    for line in contents.lines() {
        let mut fields = line.split_whitespace();
        let Some(label) = fields.next() else {
            continue;
        };
        let Some(index) = label.strip_prefix("cpu") else {
            continue;
        };
        if index.is_empty() {
            continue;
        }
        let index: usize = index.parse().map_err(|_| CollectError::PlatformRead {
            query: PlatformQuery::CoreTimeCounters,
            detail: format!("unexpected cpu label '{label}'"),
        })?;

        let values = fields
            .take(8)
            .map(|f| f.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CollectError::PlatformRead {
                query: PlatformQuery::CoreTimeCounters,
                detail: format!("bad counter on '{label}': {e}"),
            })?;
        if values.len() < 4 {
            return Err(CollectError::PlatformRead {
                query: PlatformQuery::CoreTimeCounters,
                detail: format!("'{label}' has {} counters, expected at least 4", values.len()),
            });
        }
        let at = |i: usize| values.get(i).copied().unwrap_or(0);

        cores.push((
            index,
            CoreTimeCounters {
                user: at(0),
                nice: at(1),
                system: at(2),
                idle: at(3),
                iowait: at(4),
                irq: at(5),
                softirq: at(6),
                steal: at(7),
            },
        ));
    }

    if cores.is_empty() {
        return Err(CollectError::PlatformRead {
            query: PlatformQuery::CoreTimeCounters,
            detail: "no per-core lines found".to_string(),
        });
    }

    cores.sort_by_key(|(index, _)| *index);
    Ok(cores.into_iter().map(|(_, c)| c).collect())
}

fn round_1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROC_STAT: &str = "\
cpu  4705 150 1120 16250 520 0 25 0 0 0
cpu0 2000 50 500 7000 300 0 10 0 0 0
cpu1 2705 100 620 9250 220 0 15 0 0 0
intr 114930548 113199788 3 0 5 263 0 4
ctxt 1990473
btime 1062191376
";

    fn counters(idle: u64, busy: u64) -> CoreTimeCounters {
        CoreTimeCounters {
            user: busy,
            idle,
            ..Default::default()
        }
    }

    #[test]
    fn utilization_from_idle_ratio() {
        assert_eq!(counters(75, 25).utilization(), 25.0);
        assert_eq!(counters(0, 40).utilization(), 100.0);
        assert_eq!(counters(40, 0).utilization(), 0.0);
    }

    #[test]
    fn zero_total_reports_zero() {
        let c = CoreTimeCounters::default();
        assert_eq!(c.total(), 0);
        assert_eq!(c.utilization(), 0.0);
    }

    #[test]
    fn utilization_rounds_to_one_decimal() {
        // 100 - 100 * 2 / 3 = 33.333...
        assert_eq!(counters(2, 1).utilization(), 33.3);
    }

    #[test]
    fn total_saturates() {
        let c = CoreTimeCounters {
            user: u64::MAX,
            idle: 10,
            ..Default::default()
        };
        assert_eq!(c.total(), u64::MAX);
        assert!(c.utilization() <= 100.0);
    }

    #[test]
    fn parse_skips_aggregate_line() {
        let cores = parse_proc_stat(PROC_STAT).unwrap();
        assert_eq!(cores.len(), 2);
        assert_eq!(cores[0].user, 2000);
        assert_eq!(cores[0].idle, 7000);
        assert_eq!(cores[1].softirq, 15);
        assert_eq!(cores[0].total(), 9860);
    }

    #[test]
    fn parse_orders_by_core_index() {
        let text = "cpu1 1 0 0 9\ncpu0 5 0 0 5\n";
        let cores = parse_proc_stat(text).unwrap();
        assert_eq!(cores[0].user, 5);
        assert_eq!(cores[1].user, 1);
    }

    #[test]
    fn parse_accepts_short_rows() {
        let cores = parse_proc_stat("cpu0 10 0 10 80\n").unwrap();
        assert_eq!(cores[0].iowait, 0);
        assert_eq!(cores[0].steal, 0);
        assert_eq!(cores[0].total(), 100);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            parse_proc_stat("cpu0 a b c d\n"),
            Err(CollectError::PlatformRead { .. })
        ));
        assert!(matches!(
            parse_proc_stat("cpu0 1 2\n"),
            Err(CollectError::PlatformRead { .. })
        ));
        assert!(matches!(
            parse_proc_stat("intr 1 2 3\n"),
            Err(CollectError::PlatformRead { .. })
        ));
    }

    #[test]
    fn utilization_follows_core_order() {
        let cores = parse_proc_stat(PROC_STAT).unwrap();
        let usage = CpuUtilization::from_counters(&cores);
        assert_eq!(usage.len(), 2);
        // cpu0: 100 - 100 * 7000 / 9860
        assert_eq!(usage.cores()[0], 29.0);
        assert!(usage.cores().iter().all(|v| (0.0..=100.0).contains(v)));
    }

    #[test]
    fn average_of_empty_is_zero() {
        assert_eq!(CpuUtilization::default().average(), 0.0);
        assert_eq!(CpuUtilization(vec![10.0, 30.0]).average(), 20.0);
    }
}
