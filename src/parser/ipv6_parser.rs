//! IPv6 header parser.
//!
//! Walks the extension header chain so ports are read from the real
//! transport header.

use std::net::Ipv6Addr;

use pnet::packet::ethernet::{EtherType, EtherTypes};

use super::{read_ports, Cursor, NetworkParser};
use crate::diagnostics::{DiagnosticSink, NetworkKind};
use crate::domain::protocol::{self, codes};
use crate::domain::{Ipv6View, NetworkLayer};
use crate::error::{DecodeError, Layer};

/// Fixed IPv6 header length
pub const IPV6_HEADER_LEN: usize = 40;

/// Fragment extension header length
const FRAGMENT_HEADER_LEN: usize = 8;

/// Upper bound on extension headers walked per packet.
const MAX_EXTENSION_HEADERS: usize = 16;

/// Parser for IPv6 headers.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ipv6Parser;

impl Ipv6Parser {
    pub fn new() -> Self {
        Self
    }

    /// Parse an IPv6 header from the bytes following the link-layer header.
    pub fn parse(&self, data: &[u8]) -> Result<Ipv6View, DecodeError> {
        let mut cursor = Cursor::new(data, Layer::Ipv6);
        cursor.require(IPV6_HEADER_LEN)?;

        let version = cursor.read_u8()? >> 4;
        if version != 6 {
            return Err(DecodeError::VersionMismatch {
                expected: 6,
                found: version,
            });
        }
        cursor.skip(3)?; // traffic class, flow label
        let payload_length = usize::from(cursor.read_u16_be()?);
        let next_header = cursor.read_u8()?;
        cursor.skip(1)?; // hop limit
        let source = Ipv6Addr::from(cursor.read_array::<16>()?);
        let destination = Ipv6Addr::from(cursor.read_array::<16>()?);

        // Jumbograms carry a zero payload length; fall back to the capture.
        let payload = cursor.rest();
        let payload = if payload_length == 0 {
            payload
        } else {
            &payload[..payload.len().min(payload_length)]
        };

        let chain = walk_extensions(next_header, payload)?;

        let ports = if chain.first_fragment && protocol::has_ports(chain.protocol) {
            Some(read_ports(chain.transport)?)
        } else {
            None
        };

        Ok(Ipv6View {
            next_header,
            protocol: chain.protocol,
            extension_headers: chain.count,
            source,
            destination,
            ports,
        })
    }
}

/// Result of skipping the extension header chain.
struct ExtensionChain<'a> {
    protocol: u8,
    count: usize,
    first_fragment: bool,
    transport: &'a [u8],
}

fn walk_extensions(first: u8, payload: &[u8]) -> Result<ExtensionChain<'_>, DecodeError> {
    let mut cursor = Cursor::new(payload, Layer::Ipv6Extension);
    let mut protocol = first;
    let mut count = 0;
    let mut first_fragment = true;

    while count < MAX_EXTENSION_HEADERS {
        let header_len = match protocol {
            codes::HOPOPT | codes::IPV6_ROUTE | codes::IPV6_OPTS => {
                let fixed = cursor.peek(2)?;
                (usize::from(fixed[1]) + 1) * 8
            }
            codes::AH => {
                let fixed = cursor.peek(2)?;
                (usize::from(fixed[1]) + 2) * 4
            }
            codes::IPV6_FRAG => {
                let fixed = cursor.peek(FRAGMENT_HEADER_LEN)?;
                let offset = u16::from_be_bytes([fixed[2], fixed[3]]) >> 3;
                first_fragment = offset == 0;
                FRAGMENT_HEADER_LEN
            }
            _ => break,
        };

        let header = cursor.take(header_len)?;
        protocol = header[0];
        count += 1;
    }

    Ok(ExtensionChain {
        protocol,
        count,
        first_fragment,
        transport: cursor.rest(),
    })
}

impl NetworkParser for Ipv6Parser {
    fn ether_type(&self) -> EtherType {
        EtherTypes::Ipv6
    }

    fn label(&self) -> &'static str {
        "ipv6"
    }

    fn decode(
        &self,
        payload: &[u8],
        sink: &dyn DiagnosticSink,
    ) -> Result<(NetworkLayer, &'static str), DecodeError> {
        let view = self.parse(payload)?;
        let name = protocol::display_name(view.protocol, NetworkKind::Ipv6, sink);
        Ok((NetworkLayer::Ipv6(view), name))
    }
}
