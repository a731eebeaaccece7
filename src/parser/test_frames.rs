//! Synthetic frame builders shared by the decoder tests.

use std::net::{Ipv4Addr, Ipv6Addr};

use macaddr::MacAddr6;
use pnet::packet::ethernet::{EtherType, MutableEthernetPacket};
use pnet::packet::ip::IpNextHeaderProtocol;
use pnet::packet::ipv4::MutableIpv4Packet;
use pnet::packet::ipv6::MutableIpv6Packet;
use pnet::packet::tcp::MutableTcpPacket;
use pnet::packet::udp::MutableUdpPacket;
use pnet::util::MacAddr;

use crate::domain::protocol::codes;

const TCP_HEADER_LEN: usize = 20;
const UDP_HEADER_LEN: usize = 8;

/// Transport header to place after the network header.
#[derive(Debug, Clone, Copy)]
pub enum Transport {
    Tcp(u16, u16),
    Udp(u16, u16),
    /// Protocol code and a zero-filled payload of the given length.
    Other(u8, usize),
}

impl Transport {
    fn protocol(&self) -> u8 {
        match self {
            Transport::Tcp(..) => codes::TCP,
            Transport::Udp(..) => codes::UDP,
            Transport::Other(code, _) => *code,
        }
    }

    fn len(&self) -> usize {
        match self {
            Transport::Tcp(..) => TCP_HEADER_LEN,
            Transport::Udp(..) => UDP_HEADER_LEN,
            Transport::Other(_, len) => *len,
        }
    }

    fn write(&self, buf: &mut [u8]) {
        match *self {
            Transport::Tcp(source, destination) => {
                let mut tcp = MutableTcpPacket::new(buf).unwrap();
                tcp.set_source(source);
                tcp.set_destination(destination);
                tcp.set_data_offset(5);
            }
            Transport::Udp(source, destination) => {
                let len = buf.len() as u16;
                let mut udp = MutableUdpPacket::new(buf).unwrap();
                udp.set_source(source);
                udp.set_destination(destination);
                udp.set_length(len);
            }
            Transport::Other(..) => {}
        }
    }
}

/// IPv4 header (no options) followed by the transport header.
pub fn ipv4_packet(source: Ipv4Addr, destination: Ipv4Addr, transport: Transport) -> Vec<u8> {
    let mut buf = vec![0u8; 20 + transport.len()];
    let total_length = buf.len() as u16;
    {
        let mut ip = MutableIpv4Packet::new(&mut buf).unwrap();
        ip.set_version(4);
        ip.set_header_length(5);
        ip.set_total_length(total_length);
        ip.set_ttl(64);
        ip.set_next_level_protocol(IpNextHeaderProtocol(transport.protocol()));
        ip.set_source(source);
        ip.set_destination(destination);
    }
    transport.write(&mut buf[20..]);
    buf
}

/// Fixed IPv6 header followed by the transport header.
pub fn ipv6_packet(source: Ipv6Addr, destination: Ipv6Addr, transport: Transport) -> Vec<u8> {
    let mut buf = vec![0u8; 40 + transport.len()];
    {
        let mut ip = MutableIpv6Packet::new(&mut buf).unwrap();
        ip.set_version(6);
        ip.set_payload_length(transport.len() as u16);
        ip.set_next_header(IpNextHeaderProtocol(transport.protocol()));
        ip.set_hop_limit(64);
        ip.set_source(source);
        ip.set_destination(destination);
    }
    transport.write(&mut buf[40..]);
    buf
}

/// Ethernet II frame carrying `payload`.
pub fn ethernet_frame(
    source: MacAddr6,
    destination: MacAddr6,
    ether_type: EtherType,
    payload: &[u8],
) -> Vec<u8> {
    let mut buf = vec![0u8; 14 + payload.len()];
    {
        let mut eth = MutableEthernetPacket::new(&mut buf).unwrap();
        eth.set_destination(to_pnet(destination));
        eth.set_source(to_pnet(source));
        eth.set_ethertype(ether_type);
    }
    buf[14..].copy_from_slice(payload);
    buf
}

fn to_pnet(mac: MacAddr6) -> MacAddr {
    let b = mac.as_bytes();
    MacAddr::new(b[0], b[1], b[2], b[3], b[4], b[5])
}
