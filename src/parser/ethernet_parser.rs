//! Ethernet II header parser.

use macaddr::MacAddr6;
use pnet::packet::ethernet::EtherType;

use super::Cursor;
use crate::domain::{CapturedFrame, LinkLayerHeader};
use crate::error::{DecodeError, Layer};

/// Ethernet II header length: two MAC addresses plus the EtherType.
pub const ETHERNET_HEADER_LEN: usize = 14;

/// Parser for the link-layer header of a captured frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct EthernetParser;

impl EthernetParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse the header and return it with the network-layer payload.
    pub fn parse<'a>(
        &self,
        frame: &CapturedFrame<'a>,
    ) -> Result<(LinkLayerHeader, &'a [u8]), DecodeError> {
        let mut cursor = Cursor::new(frame.data(), Layer::Link);
        cursor.require(ETHERNET_HEADER_LEN)?;

        let destination = MacAddr6::from(cursor.read_array::<6>()?);
        let source = MacAddr6::from(cursor.read_array::<6>()?);
        let ether_type = EtherType(cursor.read_u16_be()?);

        let header = LinkLayerHeader {
            destination,
            source,
            ether_type,
        };

        Ok((header, cursor.rest()))
    }
}
