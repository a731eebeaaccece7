//! Protocol header parsing module.
//!
//! Each parser turns one layer of raw bytes into domain types (SRP).
//! All reads go through `Cursor`, so no parser can look past the
//! captured extent of a frame.

mod cursor;
mod ethernet_parser;
mod ipv4_parser;
mod ipv6_parser;

#[cfg(test)]
pub(crate) mod test_frames;

pub use cursor::Cursor;
pub use ethernet_parser::{EthernetParser, ETHERNET_HEADER_LEN};
pub use ipv4_parser::{Ipv4Parser, MIN_IPV4_HEADER_LEN};
pub use ipv6_parser::{Ipv6Parser, IPV6_HEADER_LEN};

use pnet::packet::ethernet::EtherType;

use crate::diagnostics::DiagnosticSink;
use crate::domain::{NetworkLayer, Ports};
use crate::error::{DecodeError, Layer};

/// A network-layer parser selected by EtherType.
///
/// Implementations must be stateless so one instance can decode frames
/// from any number of threads.
pub trait NetworkParser: Send + Sync {
    /// The link-layer type this parser handles.
    fn ether_type(&self) -> EtherType;

    /// Short label used when rendering records.
    fn label(&self) -> &'static str;

    /// Decode the bytes following the link-layer header.
    ///
    /// Returns the network layer and the display name of its upper-layer
    /// protocol. Unknown protocol codes are reported through `sink`.
    fn decode(
        &self,
        payload: &[u8],
        sink: &dyn DiagnosticSink,
    ) -> Result<(NetworkLayer, &'static str), DecodeError>;
}

/// Read the source and destination ports at the start of a TCP/UDP header.
pub(crate) fn read_ports(transport: &[u8]) -> Result<Ports, DecodeError> {
    let mut cursor = Cursor::new(transport, Layer::Transport);
    cursor.require(4)?;

    Ok(Ports {
        source: cursor.read_u16_be()?,
        destination: cursor.read_u16_be()?,
    })
}
