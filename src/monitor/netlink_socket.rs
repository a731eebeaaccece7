//! NETLINK_ROUTE socket subscribed to link/address/route groups.

use std::io::{ErrorKind, Read};
use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pnet::datalink;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use super::netlink_message::{parse_messages, NetlinkEvent};
use crate::error::MonitorError;

/// Receive buffer size for one batch of netlink messages
const RECV_BUFFER_LEN: usize = 8192;

/// Receive timeout, used to poll the running flag
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Multicast groups for link state and IPv4 address changes.
pub const DEFAULT_GROUPS: u32 = (libc::RTMGRP_LINK | libc::RTMGRP_IPV4_IFADDR) as u32;

/// Additional groups for IPv6 addresses and IPv4/IPv6 routes.
pub const ROUTE_GROUPS: u32 = (libc::RTMGRP_IPV6_IFADDR
    | libc::RTMGRP_IPV4_ROUTE
    | libc::RTMGRP_IPV6_ROUTE) as u32;

/// Listener for interface, address and route change notifications.
pub struct NetlinkMonitor {
    socket: Socket,
    buffer: Vec<u8>,
    running: Option<Arc<AtomicBool>>,
}

impl NetlinkMonitor {
    /// Open a NETLINK_ROUTE socket bound to `groups`.
    pub fn open(groups: u32) -> Result<Self, MonitorError> {
        let socket = Socket::new(
            Domain::from(libc::AF_NETLINK),
            Type::from(libc::SOCK_RAW),
            Some(Protocol::from(libc::NETLINK_ROUTE)),
        )
        .map_err(MonitorError::Socket)?;

        socket
            .bind(&netlink_address(groups))
            .map_err(MonitorError::Bind)?;
        socket
            .set_read_timeout(Some(POLL_INTERVAL))
            .map_err(MonitorError::Socket)?;

        tracing::info!("Listening for rtnetlink events (groups {:#x})", groups);

        Ok(Self {
            socket,
            buffer: vec![0u8; RECV_BUFFER_LEN],
            running: None,
        })
    }

    /// When the flag is cleared, `next_events` returns `Ok(None)`.
    pub fn set_running(&mut self, running: Arc<AtomicBool>) {
        self.running = Some(running);
    }

    /// Block until the next batch of notifications.
    ///
    /// Returns `Ok(None)` on orderly shutdown: a zero-length receive or
    /// the running flag cleared.
    pub fn next_events(&mut self) -> Result<Option<Vec<NetlinkEvent>>, MonitorError> {
        loop {
            if !self.is_running() {
                return Ok(None);
            }

            match self.socket.read(&mut self.buffer) {
                Ok(0) => {
                    tracing::info!("Netlink socket closed (orderly shutdown)");
                    return Ok(None);
                }
                Ok(len) => return Ok(Some(parse_messages(&self.buffer[..len]))),
                Err(e)
                    if matches!(
                        e.kind(),
                        ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                    ) =>
                {
                    continue
                }
                Err(e) => return Err(MonitorError::Receive(e)),
            }
        }
    }

    fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .map(|flag| flag.load(Ordering::SeqCst))
            .unwrap_or(true)
    }
}

/// Name of the interface with `index`, or `if<index>` if it is gone.
pub fn interface_name(index: u32) -> String {
    datalink::interfaces()
        .into_iter()
        .find(|iface| iface.index == index)
        .map(|iface| iface.name)
        .unwrap_or_else(|| format!("if{}", index))
}

fn netlink_address(groups: u32) -> SockAddr {
    // SAFETY: sockaddr_storage is plain data and large enough for
    // sockaddr_nl; the length passed matches the written struct.
    unsafe {
        let mut storage: libc::sockaddr_storage = mem::zeroed();
        let nl = &mut storage as *mut libc::sockaddr_storage as *mut libc::sockaddr_nl;
        (*nl).nl_family = libc::AF_NETLINK as libc::sa_family_t;
        (*nl).nl_pid = 0;
        (*nl).nl_groups = groups;
        SockAddr::new(
            storage,
            mem::size_of::<libc::sockaddr_nl>() as libc::socklen_t,
        )
    }
}
