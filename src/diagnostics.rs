//! Non-fatal decode diagnostics.
//!
//! Decoders never print. Every recoverable condition is handed to a
//! `DiagnosticSink`, which the caller can route to logs, collect, or drop.

use std::fmt;
use std::sync::Mutex;

use pnet::packet::ethernet::EtherType;

use crate::error::DecodeError;

/// Network layer a protocol code was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkKind {
    Ipv4,
    Ipv6,
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkKind::Ipv4 => f.write_str("ipv4"),
            NetworkKind::Ipv6 => f.write_str("ipv6"),
        }
    }
}

/// A non-fatal condition observed while decoding one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// No network decoder is registered for this EtherType.
    UnhandledLinkType { ether_type: EtherType },
    /// Protocol code missing from the name registry.
    UnknownProtocol { code: u8, network: NetworkKind },
    /// The frame could not be decoded and was skipped.
    FrameDropped { length: usize, error: DecodeError },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnhandledLinkType { ether_type } => write!(
                f,
                "potential unimplemented protocol (saw unfamiliar EtherType {:#06x})",
                ether_type.0
            ),
            Diagnostic::UnknownProtocol { code, network } => write!(
                f,
                "potential unimplemented {} protocol (saw unfamiliar protocol number {})",
                network, code
            ),
            Diagnostic::FrameDropped { length, error } => {
                write!(f, "dropped {}-byte frame: {}", length, error)
            }
        }
    }
}

/// Receiver for decode diagnostics.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing` at WARN level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        tracing::warn!("{}", diagnostic);
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&self, _diagnostic: Diagnostic) {}
}

/// Keeps diagnostics in memory until taken.
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything collected so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        match self.diagnostics.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn len(&self) -> usize {
        match self.diagnostics.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        match self.diagnostics.lock() {
            Ok(mut guard) => guard.push(diagnostic),
            Err(poisoned) => poisoned.into_inner().push(diagnostic),
        }
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for std::sync::Arc<T> {
    fn emit(&self, diagnostic: Diagnostic) {
        (**self).emit(diagnostic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Layer;
    use pnet::packet::ethernet::EtherTypes;

    #[test]
    fn test_collecting_sink_take_drains() {
        let sink = CollectingSink::new();
        sink.emit(Diagnostic::UnhandledLinkType {
            ether_type: EtherTypes::Arp,
        });

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.take().len(), 1);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_display_unhandled_link_type() {
        let diagnostic = Diagnostic::UnhandledLinkType {
            ether_type: EtherTypes::Arp,
        };

        assert_eq!(
            diagnostic.to_string(),
            "potential unimplemented protocol (saw unfamiliar EtherType 0x0806)"
        );
    }

    #[test]
    fn test_display_frame_dropped() {
        let diagnostic = Diagnostic::FrameDropped {
            length: 10,
            error: DecodeError::TruncatedFrame {
                layer: Layer::Link,
                required: 14,
                available: 10,
            },
        };

        assert_eq!(
            diagnostic.to_string(),
            "dropped 10-byte frame: Truncated frame at link layer: need 14 bytes, have 10"
        );
    }

    #[test]
    fn test_null_sink_accepts_anything() {
        NullSink.emit(Diagnostic::UnknownProtocol {
            code: 200,
            network: NetworkKind::Ipv6,
        });
    }
}
