//! Error types for rawsniff.

use std::fmt;

use thiserror::Error;

/// Protocol layer a decode step was working on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Link,
    Ipv4,
    Ipv6,
    Ipv6Extension,
    Transport,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Layer::Link => "link",
            Layer::Ipv4 => "ipv4",
            Layer::Ipv6 => "ipv6",
            Layer::Ipv6Extension => "ipv6 extension",
            Layer::Transport => "transport",
        };
        f.write_str(name)
    }
}

/// Errors raised while opening or reading from a capture source.
///
/// All of these are setup failures: the capture loop cannot continue.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Interface not found: {0}")]
    InterfaceNotFound(String),

    #[error("Failed to create capture channel: {0}")]
    ChannelCreation(String),

    #[error("Insufficient permissions to open a raw capture channel")]
    InsufficientPermissions,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Hint printed alongside setup errors that may come from missing privileges.
pub const PRIVILEGE_HINT: &str = "have you run the program with administrative privileges (sudo)?";

impl CaptureError {
    /// Whether running with elevated privileges could fix this error.
    pub fn may_need_privileges(&self) -> bool {
        matches!(
            self,
            CaptureError::InsufficientPermissions | CaptureError::ChannelCreation(_)
        )
    }
}

/// Per-frame decode failures. The frame is dropped, capture continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Truncated frame at {layer} layer: need {required} bytes, have {available}")]
    TruncatedFrame {
        layer: Layer,
        required: usize,
        available: usize,
    },

    #[error("Invalid {layer} header length: {declared} bytes")]
    InvalidHeaderLength { layer: Layer, declared: usize },

    #[error("IP version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u8, found: u8 },
}

/// Errors from the rtnetlink interface monitor.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Failed to open netlink socket: {0}")]
    Socket(#[source] std::io::Error),

    #[error("Failed to bind netlink socket: {0}")]
    Bind(#[source] std::io::Error),

    #[error("Failed to receive netlink message: {0}")]
    Receive(#[source] std::io::Error),
}

impl MonitorError {
    /// Whether running with elevated privileges could fix this error.
    pub fn may_need_privileges(&self) -> bool {
        matches!(self, MonitorError::Socket(_) | MonitorError::Bind(_))
    }
}

/// Errors from loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: String, value: String },
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, value: &str) -> Self {
        ConfigError::Invalid {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}
