//! Encoder process status models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of the supervised encoder process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EncoderState {
    /// No process and nothing scheduled
    #[default]
    Idle,
    /// Process is being launched
    Starting,
    /// Process is alive
    Running,
    /// Process exited with status 0
    ExitedClean,
    /// Process exited with a nonzero status or was killed by a signal
    Crashed,
    /// A deferred start is scheduled
    RestartPending,
}

impl EncoderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncoderState::Idle => "idle",
            EncoderState::Starting => "starting",
            EncoderState::Running => "running",
            EncoderState::ExitedClean => "exited_clean",
            EncoderState::Crashed => "crashed",
            EncoderState::RestartPending => "restart_pending",
        }
    }

    /// Whether a live process handle exists in this state.
    pub fn is_live(&self) -> bool {
        matches!(self, EncoderState::Starting | EncoderState::Running)
    }
}

impl fmt::Display for EncoderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a process terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitInfo {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl ExitInfo {
    pub fn is_clean(&self) -> bool {
        self.code == Some(0)
    }
}

impl fmt::Display for ExitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "exit code {}", code),
            (None, Some(signal)) => write!(f, "signal {}", signal),
            (None, None) => f.write_str("unknown status"),
        }
    }
}

/// Read-only snapshot of the supervisor's process handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderStatus {
    pub state: EncoderState,
    pub pid: Option<u32>,
    pub armed: bool,
    pub last_exit_code: Option<i32>,
    pub last_exit_signal: Option<i32>,
    pub restart_count: u64,
    pub started_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_info_classification() {
        assert!(ExitInfo { code: Some(0), signal: None }.is_clean());
        assert!(!ExitInfo { code: Some(1), signal: None }.is_clean());
        assert!(!ExitInfo { code: None, signal: Some(9) }.is_clean());
        assert_eq!(ExitInfo { code: None, signal: Some(2) }.to_string(), "signal 2");
    }

    #[test]
    fn test_state_serializes_snake_case() {
        let json = serde_json::to_string(&EncoderState::RestartPending).unwrap();
        assert_eq!(json, "\"restart_pending\"");
        assert!(EncoderState::Running.is_live());
        assert!(!EncoderState::RestartPending.is_live());
    }
}
