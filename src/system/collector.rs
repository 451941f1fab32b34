use std::time::{SystemTime, UNIX_EPOCH};

use tracing::Instrument;

use super::cpu::CpuUtilization;
use super::host::PlatformSource;
use super::memory::MemoryUsage;
use super::sensors::{SensorSource, TemperatureReader};
use super::snapshot::SystemSnapshot;
use crate::error::CollectError;

/// Builds one [`SystemSnapshot`] per call from the CPU, memory and sensor
/// samplers. Any failing sampler fails the whole call.
pub struct Collector<P, S> {
    platform: P,
    temperatures: TemperatureReader<S>,
}

impl<P, S> Collector<P, S>
where
    P: PlatformSource,
    S: SensorSource,
{
    pub fn new(platform: P, temperatures: TemperatureReader<S>) -> Self {
        Collector {
            platform,
            temperatures,
        }
    }

    pub async fn collect(&self, sequence: u64) -> Result<SystemSnapshot, CollectError> {
        let span = tracing::debug_span!("collector.collect", sequence);
        self.sample(sequence).instrument(span).await
    }

    async fn sample(&self, sequence: u64) -> Result<SystemSnapshot, CollectError> {
        let cpu_utilization = CpuUtilization::sample(&self.platform)?;
        let memory = MemoryUsage::sample(&self.platform)?;
        let temps = self.temperatures.read_all().await?;

        Ok(SystemSnapshot {
            sequence,
            collected_at_unix_ms: unix_millis(),
            cpu_utilization,
            memory,
            core_temperature_c: Some(temps.core_c),
            ambient_temperature_c: Some(temps.ambient_c),
        })
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
