//! Temperature readings scraped from `sensors` (lm-sensors) text output.
//!
//! The sensor command is an external collaborator: its output is free-form text
//! and a format change upstream surfaces as [`CollectError::Parse`].

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use regex::Regex;
use tokio::process::Command;

use crate::config::SensorsConfig;
use crate::error::{CollectError, ConfigError, Reading};

/// Produces the raw text of one sensor listing.
pub trait SensorSource: Send + Sync {
    fn read(&self) -> impl Future<Output = Result<String, CollectError>> + Send;
}

/// Runs the configured sensor command, bounded by a timeout.
#[derive(Clone, Debug)]
pub struct SensorsCommand {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl SensorsCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        SensorsCommand {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &SensorsConfig) -> Result<Self, ConfigError> {
        if config.command.trim().is_empty() {
            return Err(ConfigError::EmptyCommand);
        }
        Ok(Self::new(
            config.command.clone(),
            config.args.clone(),
            config.timeout(),
        ))
    }

    fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

impl SensorSource for SensorsCommand {
    async fn read(&self) -> Result<String, CollectError> {
        let command = self.display();
        tracing::trace!(%command, "running sensor command");

        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(CollectError::Execution {
                    command,
                    detail: e.to_string(),
                });
            }
            Err(_) => {
                return Err(CollectError::Timeout {
                    command,
                    timeout_ms: self.timeout.as_millis() as u64,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CollectError::Execution {
                command,
                detail: format!("{} ({})", output.status, stderr.trim()),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// The two regexes that locate the core and ambient values.
///
/// Capture group 1 of each pattern must hold the signed decimal number.
#[derive(Clone, Debug)]
pub struct TemperaturePatterns {
    core: Regex,
    ambient: Regex,
}

impl TemperaturePatterns {
    pub fn new(core: &str, ambient: &str) -> Result<Self, ConfigError> {
        Ok(TemperaturePatterns {
            core: compile(Reading::Core, core)?,
            ambient: compile(Reading::Ambient, ambient)?,
        })
    }

    pub fn from_config(config: &SensorsConfig) -> Result<Self, ConfigError> {
        Self::new(&config.core_pattern, &config.ambient_pattern)
    }

    /// Extract one reading from sensor text. The first matching line wins.
    pub fn parse(&self, reading: Reading, output: &str) -> Result<f64, CollectError> {
        let regex = match reading {
            Reading::Core => &self.core,
            Reading::Ambient => &self.ambient,
        };
        regex
            .captures(output)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .ok_or(CollectError::Parse { reading })
    }

    pub fn parse_all(&self, output: &str) -> Result<Temperatures, CollectError> {
        Ok(Temperatures {
            core_c: self.parse(Reading::Core, output)?,
            ambient_c: self.parse(Reading::Ambient, output)?,
        })
    }
}

fn compile(reading: Reading, pattern: &str) -> Result<Regex, ConfigError> {
    let regex =
        Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern { reading, source })?;
    // captures_len counts the implicit whole-match group
    if regex.captures_len() < 2 {
        return Err(ConfigError::MissingCaptureGroup {
            reading,
            pattern: pattern.to_string(),
        });
    }
    Ok(regex)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Temperatures {
    pub core_c: f64,
    pub ambient_c: f64,
}

pub struct TemperatureReader<S> {
    source: S,
    patterns: TemperaturePatterns,
}

impl<S: SensorSource> TemperatureReader<S> {
    pub fn new(source: S, patterns: TemperaturePatterns) -> Self {
        TemperatureReader { source, patterns }
    }

    pub async fn read_core(&self) -> Result<f64, CollectError> {
        let output = self.source.read().await?;
        self.patterns.parse(Reading::Core, &output)
    }

    pub async fn read_ambient(&self) -> Result<f64, CollectError> {
        let output = self.source.read().await?;
        self.patterns.parse(Reading::Ambient, &output)
    }

    /// Both readings from a single sensor command run.
    pub async fn read_all(&self) -> Result<Temperatures, CollectError> {
        let output = self.source.read().await?;
        self.patterns.parse_all(&output)
    }
}
