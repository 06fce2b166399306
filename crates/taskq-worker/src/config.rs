//! Worker configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How a worker hands outcomes to the broker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportMode {
    /// Every outcome is stored as a success-shaped envelope.
    #[default]
    Envelope,
    /// Failures go through the broker's failure channel in positional form.
    Native,
}

impl FromStr for ReportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "envelope" => Ok(Self::Envelope),
            "native" => Ok(Self::Native),
            other => Err(format!(
                "unknown report mode '{other}' (expected 'envelope' or 'native')"
            )),
        }
    }
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Envelope => f.write_str("envelope"),
            Self::Native => f.write_str("native"),
        }
    }
}

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Number of jobs executed concurrently.
    pub concurrency: usize,

    /// Upper bound on a single task's execution time.
    pub task_timeout: Duration,

    /// Artificial latency added by the built-in tasks.
    pub task_delay: Duration,

    /// Outcome reporting strategy.
    pub report_mode: ReportMode,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            task_timeout: Duration::from_secs(300),
            task_delay: Duration::ZERO,
            report_mode: ReportMode::Envelope,
        }
    }
}
