//! Interface, address and route change monitor.
//!
//! Listens for rtnetlink notifications and prints one line per event.
//! Independent of the frame decoder.

mod netlink_message;
#[cfg(target_os = "linux")]
mod netlink_socket;

pub use netlink_message::{msg_type, parse_messages, LinkState, NetlinkEvent};
#[cfg(target_os = "linux")]
pub use netlink_socket::{interface_name, NetlinkMonitor, DEFAULT_GROUPS, ROUTE_GROUPS};
