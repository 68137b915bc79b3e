use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of the streaming session
///
/// ```text
/// Disconnected --connect--> Connecting --open--> SetupSent --setupComplete--> Active
/// Active --ENDED--> Ended                       (socket stays open)
/// Connecting | SetupSent | Active | Ended --close--> Disconnected (+ reconnect)
/// Disconnected --attempts exhausted--> Failed   (explicit connect() recovers)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Disconnected,
    Connecting,
    SetupSent,
    Active,
    Ended,
    Failed,
}

impl SessionState {
    /// Socket is open (handshake may or may not be complete)
    pub fn is_open(self) -> bool {
        matches!(self, Self::SetupSent | Self::Active | Self::Ended)
    }

    /// A socket handle exists (opening or open)
    pub fn has_socket(self) -> bool {
        self == Self::Connecting || self.is_open()
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::SetupSent => "setup-sent",
            Self::Active => "active",
            Self::Ended => "ended",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
