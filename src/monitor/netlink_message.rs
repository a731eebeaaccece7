//! rtnetlink message parsing.
//!
//! Netlink headers use host byte order and 4-byte alignment.

use std::fmt;

/// Netlink message header length (struct nlmsghdr).
pub const NLMSG_HEADER_LEN: usize = 16;

/// Link message header length (struct ifinfomsg).
const IFINFOMSG_LEN: usize = 16;

/// Attribute header length (struct rtattr).
const RTATTR_HEADER_LEN: usize = 4;

/// Control and rtnetlink message types.
pub mod msg_type {
    pub const NLMSG_NOOP: u16 = 1;
    pub const NLMSG_ERROR: u16 = 2;
    pub const NLMSG_DONE: u16 = 3;
    pub const RTM_NEWLINK: u16 = 16;
    pub const RTM_DELLINK: u16 = 17;
    pub const RTM_NEWADDR: u16 = 20;
    pub const RTM_DELADDR: u16 = 21;
    pub const RTM_NEWROUTE: u16 = 24;
    pub const RTM_DELROUTE: u16 = 25;
}

/// Interface is operationally up
const IFF_RUNNING: u32 = 0x40;

/// Interface name attribute
const IFLA_IFNAME: u16 = 3;

/// State carried by an RTM_NEWLINK message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkState {
    pub index: u32,
    pub running: bool,
    /// Name from the IFLA_IFNAME attribute, when present.
    pub name: Option<String>,
}

impl LinkState {
    pub fn status(&self) -> &'static str {
        if self.running {
            "UP"
        } else {
            "DOWN"
        }
    }
}

/// One notification from the routing netlink family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetlinkEvent {
    NewAddr,
    DelAddr,
    NewRoute,
    DelRoute,
    NewLink(Option<LinkState>),
    DelLink,
    /// NLMSG_ERROR; zero is an acknowledgement.
    Error(i32),
    Unknown(u16),
}

impl NetlinkEvent {
    /// Output lines for this event.
    ///
    /// `resolve` maps an interface index to a name when the message did
    /// not carry one.
    pub fn render(&self, resolve: &dyn Fn(u32) -> String) -> Vec<String> {
        let mut lines = vec![self.to_string()];
        if let NetlinkEvent::NewLink(Some(state)) = self {
            let name = state
                .name
                .clone()
                .unwrap_or_else(|| resolve(state.index));
            lines.push(format!("interface {} {}", name, state.status()));
        }
        lines
    }
}

impl fmt::Display for NetlinkEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetlinkEvent::NewAddr => f.write_str("RTM_NEWADDR"),
            NetlinkEvent::DelAddr => f.write_str("RTM_DELADDR"),
            NetlinkEvent::NewRoute => f.write_str("RTM_NEWROUTE"),
            NetlinkEvent::DelRoute => f.write_str("RTM_DELROUTE"),
            NetlinkEvent::NewLink(_) => f.write_str("RTM_NEWLINK"),
            NetlinkEvent::DelLink => f.write_str("RTM_DELLINK"),
            NetlinkEvent::Error(code) => write!(f, "NLMSG_ERROR {}", code),
            NetlinkEvent::Unknown(kind) => write!(f, "unknown nlmsg_type {}", kind),
        }
    }
}

/// Parse every message in a receive buffer.
///
/// Stops at NLMSG_DONE, after an NLMSG_ERROR, or at the first header
/// whose length does not fit the buffer.
pub fn parse_messages(mut data: &[u8]) -> Vec<NetlinkEvent> {
    let mut events = Vec::new();

    while data.len() >= NLMSG_HEADER_LEN {
        let len = u32::from_ne_bytes([data[0], data[1], data[2], data[3]]) as usize;
        let kind = u16::from_ne_bytes([data[4], data[5]]);

        if len < NLMSG_HEADER_LEN || len > data.len() {
            tracing::debug!("Malformed netlink message length {}", len);
            break;
        }

        let payload = &data[NLMSG_HEADER_LEN..len];

        match kind {
            msg_type::NLMSG_DONE => break,
            msg_type::NLMSG_NOOP => {}
            msg_type::NLMSG_ERROR => {
                let code = if payload.len() >= 4 {
                    i32::from_ne_bytes([payload[0], payload[1], payload[2], payload[3]])
                } else {
                    0
                };
                events.push(NetlinkEvent::Error(code));
                break;
            }
            msg_type::RTM_NEWADDR => events.push(NetlinkEvent::NewAddr),
            msg_type::RTM_DELADDR => events.push(NetlinkEvent::DelAddr),
            msg_type::RTM_NEWROUTE => events.push(NetlinkEvent::NewRoute),
            msg_type::RTM_DELROUTE => events.push(NetlinkEvent::DelRoute),
            msg_type::RTM_NEWLINK => events.push(NetlinkEvent::NewLink(parse_link(payload))),
            msg_type::RTM_DELLINK => events.push(NetlinkEvent::DelLink),
            other => events.push(NetlinkEvent::Unknown(other)),
        }

        let aligned = align(len);
        if aligned >= data.len() {
            break;
        }
        data = &data[aligned..];
    }

    events
}

/// Parse the ifinfomsg header and IFLA_IFNAME attribute of a link message.
fn parse_link(payload: &[u8]) -> Option<LinkState> {
    if payload.len() < IFINFOMSG_LEN {
        return None;
    }

    let index = u32::from_ne_bytes([payload[4], payload[5], payload[6], payload[7]]);
    let flags = u32::from_ne_bytes([payload[8], payload[9], payload[10], payload[11]]);

    Some(LinkState {
        index,
        running: flags & IFF_RUNNING != 0,
        name: parse_ifname(&payload[IFINFOMSG_LEN..]),
    })
}

fn parse_ifname(mut attrs: &[u8]) -> Option<String> {
    while attrs.len() >= RTATTR_HEADER_LEN {
        let len = usize::from(u16::from_ne_bytes([attrs[0], attrs[1]]));
        let kind = u16::from_ne_bytes([attrs[2], attrs[3]]);

        if len < RTATTR_HEADER_LEN || len > attrs.len() {
            return None;
        }

        if kind == IFLA_IFNAME {
            let value = &attrs[RTATTR_HEADER_LEN..len];
            let value = value.split(|&b| b == 0).next().unwrap_or_default();
            return std::str::from_utf8(value).ok().map(str::to_string);
        }

        let aligned = align(len);
        if aligned >= attrs.len() {
            return None;
        }
        attrs = &attrs[aligned..];
    }
    None
}

fn align(len: usize) -> usize {
    (len + 3) & !3
}
