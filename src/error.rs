use std::fmt;

/// Which of the two tracked temperature sensors a value belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reading {
    Core,
    Ambient,
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Core => f.write_str("core"),
            Reading::Ambient => f.write_str("ambient"),
        }
    }
}

/// Local OS query made by the CPU and memory samplers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlatformQuery {
    CoreTimeCounters,
    Memory,
}

impl fmt::Display for PlatformQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformQuery::CoreTimeCounters => f.write_str("core time counters"),
            PlatformQuery::Memory => f.write_str("memory totals"),
        }
    }
}

/// Errors that abort a single sampling cycle.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// A local OS query (core counters or memory) failed.
    #[error("failed to read {query}: {detail}")]
    PlatformRead { query: PlatformQuery, detail: String },

    /// The sensor command could not be spawned or exited unsuccessfully.
    #[error("sensor command `{command}` failed: {detail}")]
    Execution { command: String, detail: String },

    /// The sensor command did not finish within the configured timeout.
    #[error("sensor command `{command}` timed out after {timeout_ms} ms")]
    Timeout { command: String, timeout_ms: u64 },

    #[error("could not parse {reading} temperature from sensor output")]
    Parse { reading: Reading },
}

impl CollectError {
    /// Name of the sampler that produced the error, used as a log field.
    pub fn component(&self) -> &'static str {
        match self {
            CollectError::PlatformRead {
                query: PlatformQuery::CoreTimeCounters,
                ..
            } => "cpu",
            CollectError::PlatformRead {
                query: PlatformQuery::Memory,
                ..
            } => "memory",
            CollectError::Execution { .. }
            | CollectError::Timeout { .. }
            | CollectError::Parse { .. } => "sensors",
        }
    }
}

/// Errors in user-supplied configuration that prevent startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {reading} temperature pattern: {source}")]
    InvalidPattern {
        reading: Reading,
        #[source]
        source: regex::Error,
    },

    #[error("{reading} temperature pattern `{pattern}` has no capture group for the value")]
    MissingCaptureGroup { reading: Reading, pattern: String },

    #[error("sensor command must not be empty")]
    EmptyCommand,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_the_reading() {
        let core = CollectError::Parse {
            reading: Reading::Core,
        };
        let ambient = CollectError::Parse {
            reading: Reading::Ambient,
        };
        assert_eq!(
            core.to_string(),
            "could not parse core temperature from sensor output"
        );
        assert_eq!(
            ambient.to_string(),
            "could not parse ambient temperature from sensor output"
        );
    }

    #[test]
    fn components_follow_the_failing_sampler() {
        let cpu = CollectError::PlatformRead {
            query: PlatformQuery::CoreTimeCounters,
            detail: "missing".to_string(),
        };
        let memory = CollectError::PlatformRead {
            query: PlatformQuery::Memory,
            detail: "zero".to_string(),
        };
        let timeout = CollectError::Timeout {
            command: "sensors -A".to_string(),
            timeout_ms: 10,
        };
        assert_eq!(cpu.component(), "cpu");
        assert_eq!(memory.component(), "memory");
        assert_eq!(timeout.component(), "sensors");
    }
}
