//! Frame decode pipeline.

use pnet::packet::ethernet::EtherType;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::domain::{CapturedFrame, DecodedRecord, NetworkLayer};
use crate::error::DecodeError;
use crate::parser::{EthernetParser, Ipv4Parser, Ipv6Parser, NetworkParser};

/// Decodes captured frames through link and network layers.
///
/// Network parsers are looked up by EtherType in a small table. Frames
/// whose type has no entry decode to `NetworkLayer::Unhandled`.
pub struct FrameDecoder {
    ethernet: EthernetParser,
    parsers: Vec<Box<dyn NetworkParser>>,
}

impl FrameDecoder {
    /// Create a decoder with the IPv4 and IPv6 parsers registered.
    pub fn new() -> Self {
        Self::empty()
            .with_parser(Box::new(Ipv4Parser::new()))
            .with_parser(Box::new(Ipv6Parser::new()))
    }

    /// Create a decoder with no network parsers.
    pub fn empty() -> Self {
        Self {
            ethernet: EthernetParser::new(),
            parsers: Vec::new(),
        }
    }

    /// Register a network parser, replacing any existing one for its EtherType.
    pub fn with_parser(mut self, parser: Box<dyn NetworkParser>) -> Self {
        let ether_type = parser.ether_type();
        self.parsers.retain(|p| p.ether_type() != ether_type);
        self.parsers.push(parser);
        self
    }

    /// The parser registered for `ether_type`, if any.
    pub fn parser_for(&self, ether_type: EtherType) -> Option<&dyn NetworkParser> {
        self.parsers
            .iter()
            .find(|p| p.ether_type() == ether_type)
            .map(|p| p.as_ref())
    }

    /// Label for a link-layer type, as used in rendered output.
    pub fn label_for(&self, ether_type: EtherType) -> Option<&'static str> {
        self.parser_for(ether_type).map(|p| p.label())
    }

    /// Decode one frame.
    ///
    /// Unhandled link types and unknown protocol codes are reported
    /// through `sink`; truncated or malformed headers are returned as
    /// errors and nothing is reported for them here.
    pub fn decode(
        &self,
        frame: &CapturedFrame<'_>,
        sink: &dyn DiagnosticSink,
    ) -> Result<DecodedRecord, DecodeError> {
        let (link, payload) = self.ethernet.parse(frame)?;

        let (network, link_label, protocol_name) = match self.parser_for(link.ether_type) {
            Some(parser) => {
                let (network, name) = parser.decode(payload, sink)?;
                (network, Some(parser.label()), Some(name))
            }
            None => {
                sink.emit(Diagnostic::UnhandledLinkType {
                    ether_type: link.ether_type,
                });
                (NetworkLayer::Unhandled, None, None)
            }
        };

        tracing::debug!(
            "decoded {}-byte frame, ethertype {:#06x}",
            frame.len(),
            link.ether_type.0
        );

        Ok(DecodedRecord {
            link,
            network,
            link_label,
            protocol_name,
            length: frame.len(),
            timestamp: frame.timestamp(),
        })
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}
