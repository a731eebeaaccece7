//! IPv4 header parser.
//!
//! Uses the IHL field to find the transport header, so headers carrying
//! options are handled.

use std::net::Ipv4Addr;

use pnet::packet::ethernet::{EtherType, EtherTypes};

use super::{read_ports, Cursor, NetworkParser};
use crate::diagnostics::{DiagnosticSink, NetworkKind};
use crate::domain::protocol;
use crate::domain::{Ipv4View, NetworkLayer};
use crate::error::{DecodeError, Layer};

/// Minimum IPv4 header length (IHL = 5)
pub const MIN_IPV4_HEADER_LEN: usize = 20;

/// Fragment offset bits of the flags/fragment word.
const FRAGMENT_OFFSET_MASK: u16 = 0x1fff;

/// Parser for IPv4 headers.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ipv4Parser;

impl Ipv4Parser {
    pub fn new() -> Self {
        Self
    }

    /// Parse an IPv4 header from the bytes following the link-layer header.
    pub fn parse(&self, data: &[u8]) -> Result<Ipv4View, DecodeError> {
        let mut cursor = Cursor::new(data, Layer::Ipv4);
        cursor.require(MIN_IPV4_HEADER_LEN)?;

        let version_ihl = cursor.read_u8()?;
        let version = version_ihl >> 4;
        if version != 4 {
            return Err(DecodeError::VersionMismatch {
                expected: 4,
                found: version,
            });
        }

        let header_length = usize::from(version_ihl & 0x0f) * 4;
        if header_length < MIN_IPV4_HEADER_LEN {
            return Err(DecodeError::InvalidHeaderLength {
                layer: Layer::Ipv4,
                declared: header_length,
            });
        }
        // Options must be captured in full before the transport header.
        cursor.require(header_length - 1)?;

        cursor.skip(1)?; // DSCP/ECN
        let total_length = usize::from(cursor.read_u16_be()?);
        cursor.skip(2)?; // identification
        let fragment_offset = cursor.read_u16_be()? & FRAGMENT_OFFSET_MASK;
        cursor.skip(1)?; // TTL
        let protocol = cursor.read_u8()?;
        cursor.skip(2)?; // checksum
        let source = Ipv4Addr::from(cursor.read_array::<4>()?);
        let destination = Ipv4Addr::from(cursor.read_array::<4>()?);
        cursor.skip(header_length - MIN_IPV4_HEADER_LEN)?;

        // Zero total length is seen on segmentation-offloaded packets.
        let payload = cursor.rest();
        let payload = if total_length == 0 {
            payload
        } else if total_length < header_length {
            return Err(DecodeError::InvalidHeaderLength {
                layer: Layer::Ipv4,
                declared: total_length,
            });
        } else {
            // Drop link-layer padding; keep whatever was captured of the datagram.
            &payload[..payload.len().min(total_length - header_length)]
        };

        let ports = if fragment_offset == 0 && protocol::has_ports(protocol) {
            Some(read_ports(payload)?)
        } else {
            None
        };

        Ok(Ipv4View {
            header_length,
            protocol,
            source,
            destination,
            ports,
        })
    }
}

impl NetworkParser for Ipv4Parser {
    fn ether_type(&self) -> EtherType {
        EtherTypes::Ipv4
    }

    fn label(&self) -> &'static str {
        "ipv4"
    }

    fn decode(
        &self,
        payload: &[u8],
        sink: &dyn DiagnosticSink,
    ) -> Result<(NetworkLayer, &'static str), DecodeError> {
        let view = self.parse(payload)?;
        let name = protocol::display_name(view.protocol, NetworkKind::Ipv4, sink);
        Ok((NetworkLayer::Ipv4(view), name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Ports;
    use crate::parser::test_frames::{ipv4_packet, Transport};

    #[test]
    fn test_parse_tcp_ports() {
        let packet = ipv4_packet(
            Ipv4Addr::new(192, 168, 1, 1),
            Ipv4Addr::new(10, 0, 0, 5),
            Transport::Tcp(80, 4444),
        );

        let view = Ipv4Parser::new().parse(&packet).unwrap();

        assert_eq!(view.header_length, 20);
        assert_eq!(view.protocol, protocol::codes::TCP);
        assert_eq!(view.source, Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(view.destination, Ipv4Addr::new(10, 0, 0, 5));
        assert_eq!(
            view.ports,
            Some(Ports {
                source: 80,
                destination: 4444
            })
        );
    }

    #[test]
    fn test_ports_read_at_fixed_offsets() {
        let mut packet = vec![
            0x45, 0x00, 0x00, 0x1c, // version/IHL, DSCP, total length 28
            0x00, 0x00, 0x00, 0x00, // identification, flags/offset
            0x40, 0x11, 0x00, 0x00, // TTL, UDP, checksum
            0x0a, 0x00, 0x00, 0x01, // 10.0.0.1
            0x0a, 0x00, 0x00, 0x02, // 10.0.0.2
        ];
        packet.extend_from_slice(&[0x00, 0x35, 0xc3, 0x50, 0x00, 0x08, 0x00, 0x00]);

        let view = Ipv4Parser::new().parse(&packet).unwrap();

        assert_eq!(
            view.ports,
            Some(Ports {
                source: 53,
                destination: 50000
            })
        );
    }

    #[test]
    fn test_options_shift_transport_header() {
        let mut packet = vec![
            0x46, 0x00, 0x00, 0x20, // IHL 6, total length 32
            0x00, 0x00, 0x00, 0x00, //
            0x40, 0x06, 0x00, 0x00, // TCP
            0xc0, 0xa8, 0x00, 0x01, //
            0xc0, 0xa8, 0x00, 0x02, //
            0x01, 0x01, 0x01, 0x00, // NOP NOP NOP EOL
        ];
        packet.extend_from_slice(&[0x1f, 0x90, 0x00, 0x50, 0, 0, 0, 0]);

        let view = Ipv4Parser::new().parse(&packet).unwrap();

        assert_eq!(view.header_length, 24);
        assert_eq!(
            view.ports,
            Some(Ports {
                source: 8080,
                destination: 80
            })
        );
    }

    #[test]
    fn test_icmp_has_no_ports() {
        let packet = ipv4_packet(
            Ipv4Addr::new(8, 8, 8, 8),
            Ipv4Addr::new(192, 168, 1, 1),
            Transport::Other(protocol::codes::ICMP, 8),
        );

        let view = Ipv4Parser::new().parse(&packet).unwrap();

        assert_eq!(view.protocol, protocol::codes::ICMP);
        assert!(view.ports.is_none());
    }

    #[test]
    fn test_non_first_fragment_has_no_ports() {
        let mut packet = ipv4_packet(
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
            Transport::Udp(1000, 2000),
        );
        // fragment offset 185 (1480 bytes)
        packet[6] = 0x00;
        packet[7] = 0xb9;

        let view = Ipv4Parser::new().parse(&packet).unwrap();

        assert!(view.ports.is_none());
    }

    #[test]
    fn test_short_header_is_truncated() {
        let packet = [0x45u8; 19];

        let err = Ipv4Parser::new().parse(&packet).unwrap_err();

        assert_eq!(
            err,
            DecodeError::TruncatedFrame {
                layer: Layer::Ipv4,
                required: 20,
                available: 19,
            }
        );
    }

    #[test]
    fn test_declared_options_beyond_capture() {
        let mut packet = ipv4_packet(
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
            Transport::Other(protocol::codes::ICMP, 0),
        );
        packet[0] = 0x4f; // IHL 15 = 60 bytes

        let err = Ipv4Parser::new().parse(&packet).unwrap_err();

        assert!(matches!(
            err,
            DecodeError::TruncatedFrame {
                layer: Layer::Ipv4,
                required: 60,
                ..
            }
        ));
    }

    #[test]
    fn test_ihl_below_minimum() {
        let mut packet = ipv4_packet(
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
            Transport::Tcp(1, 2),
        );
        packet[0] = 0x44;

        let err = Ipv4Parser::new().parse(&packet).unwrap_err();

        assert_eq!(
            err,
            DecodeError::InvalidHeaderLength {
                layer: Layer::Ipv4,
                declared: 16,
            }
        );
    }

    #[test]
    fn test_wrong_version() {
        let mut packet = ipv4_packet(
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
            Transport::Tcp(1, 2),
        );
        packet[0] = 0x65;

        let err = Ipv4Parser::new().parse(&packet).unwrap_err();

        assert_eq!(err, DecodeError::VersionMismatch { expected: 4, found: 6 });
    }

    #[test]
    fn test_tcp_without_port_bytes_is_truncated() {
        let packet = ipv4_packet(
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
            Transport::Tcp(1, 2),
        );

        let err = Ipv4Parser::new().parse(&packet[..22]).unwrap_err();

        assert!(matches!(
            err,
            DecodeError::TruncatedFrame {
                layer: Layer::Transport,
                required: 4,
                available: 2,
            }
        ));
    }

    #[test]
    fn test_padding_ignored_by_total_length() {
        let mut packet = ipv4_packet(
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
            Transport::Tcp(1, 2),
        );
        // total length claims only the header: port bytes are padding
        packet[2] = 0x00;
        packet[3] = 0x14;

        let err = Ipv4Parser::new().parse(&packet).unwrap_err();

        assert!(matches!(
            err,
            DecodeError::TruncatedFrame {
                layer: Layer::Transport,
                ..
            }
        ));
    }

    #[test]
    fn test_total_length_below_header() {
        let mut packet = ipv4_packet(
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
            Transport::Udp(1, 2),
        );
        packet[2] = 0x00;
        packet[3] = 0x10;

        let err = Ipv4Parser::new().parse(&packet).unwrap_err();

        assert_eq!(
            err,
            DecodeError::InvalidHeaderLength {
                layer: Layer::Ipv4,
                declared: 16,
            }
        );
    }

    #[test]
    fn test_zero_total_length_uses_capture() {
        let mut packet = ipv4_packet(
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
            Transport::Tcp(8443, 40000),
        );
        packet[2] = 0x00;
        packet[3] = 0x00;

        let view = Ipv4Parser::new().parse(&packet).unwrap();

        assert_eq!(
            view.ports,
            Some(Ports {
                source: 8443,
                destination: 40000
            })
        );
    }

    #[test]
    fn test_unknown_protocol_still_reports_addresses() {
        let packet = ipv4_packet(
            Ipv4Addr::new(172, 16, 0, 1),
            Ipv4Addr::new(172, 16, 0, 2),
            Transport::Other(253, 4),
        );
        let sink = crate::diagnostics::CollectingSink::new();

        let (layer, name) = Ipv4Parser::new().decode(&packet, &sink).unwrap();

        assert_eq!(name, "unknown");
        assert_eq!(sink.len(), 1);
        match layer {
            NetworkLayer::Ipv4(view) => {
                assert_eq!(view.source, Ipv4Addr::new(172, 16, 0, 1));
                assert_eq!(view.destination, Ipv4Addr::new(172, 16, 0, 2));
            }
            other => panic!("expected ipv4, got {:?}", other),
        }
    }
}
