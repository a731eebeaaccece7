//! Decoded frame records.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::SystemTime;

use macaddr::MacAddr6;
use pnet::packet::ethernet::EtherType;

/// Ethernet II header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkLayerHeader {
    pub destination: MacAddr6,
    pub source: MacAddr6,
    pub ether_type: EtherType,
}

/// Transport source and destination ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ports {
    pub source: u16,
    pub destination: u16,
}

/// Fields extracted from an IPv4 header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4View {
    /// Header length in bytes, from the IHL field.
    pub header_length: usize,
    pub protocol: u8,
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
    /// Present for TCP and UDP on the first fragment only.
    pub ports: Option<Ports>,
}

/// Fields extracted from an IPv6 header and its extension chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv6View {
    /// Next-header code from the fixed header.
    pub next_header: u8,
    /// Upper-layer protocol after skipping extension headers.
    pub protocol: u8,
    pub extension_headers: usize,
    pub source: Ipv6Addr,
    pub destination: Ipv6Addr,
    pub ports: Option<Ports>,
}

/// Network-layer outcome of decoding a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkLayer {
    Ipv4(Ipv4View),
    Ipv6(Ipv6View),
    /// No decoder is registered for the link-layer type.
    Unhandled,
}

impl NetworkLayer {
    /// Upper-layer protocol code, if a network header was decoded.
    pub fn protocol(&self) -> Option<u8> {
        match self {
            NetworkLayer::Ipv4(view) => Some(view.protocol),
            NetworkLayer::Ipv6(view) => Some(view.protocol),
            NetworkLayer::Unhandled => None,
        }
    }

    pub fn ports(&self) -> Option<Ports> {
        match self {
            NetworkLayer::Ipv4(view) => view.ports,
            NetworkLayer::Ipv6(view) => view.ports,
            NetworkLayer::Unhandled => None,
        }
    }

    pub fn is_unhandled(&self) -> bool {
        matches!(self, NetworkLayer::Unhandled)
    }
}

/// Everything decoded from one captured frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    pub link: LinkLayerHeader,
    pub network: NetworkLayer,
    /// Label of the network parser that handled the frame, e.g. `ipv4`.
    pub link_label: Option<&'static str>,
    /// Display name of the upper-layer protocol; `None` for unhandled frames.
    pub protocol_name: Option<&'static str>,
    /// Captured length of the frame in bytes.
    pub length: usize,
    pub timestamp: Option<SystemTime>,
}
