//! pnet-based packet capture implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use pnet::datalink::{self, Channel, Config, DataLinkReceiver, NetworkInterface};

use super::FrameSource;
use crate::domain::CapturedFrame;
use crate::error::CaptureError;

/// Default capture buffer size in bytes
pub const DEFAULT_SNAPLEN: usize = 2048;

/// Default read timeout, used to poll the running flag
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Channel settings for a live capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOptions {
    /// Receive buffer size; longer frames are truncated to this length.
    pub snaplen: usize,
    pub read_timeout: Duration,
    pub promiscuous: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            snaplen: DEFAULT_SNAPLEN,
            read_timeout: DEFAULT_READ_TIMEOUT,
            promiscuous: true,
        }
    }
}

/// Packet capture using the pnet library.
pub struct PnetCapture {
    interface: NetworkInterface,
    options: CaptureOptions,
    rx: Option<Box<dyn DataLinkReceiver>>,
    /// Copy of the last received frame, lent out by `next_frame`
    buffer: Vec<u8>,
    running: Option<Arc<AtomicBool>>,
}

impl PnetCapture {
    /// Create a new capture on the specified interface.
    pub fn new(interface_name: &str) -> Result<Self, CaptureError> {
        let interface = datalink::interfaces()
            .into_iter()
            .find(|iface| iface.name == interface_name)
            .ok_or_else(|| CaptureError::InterfaceNotFound(interface_name.to_string()))?;

        Ok(Self::with_interface(interface))
    }

    /// Create a capture on the first suitable interface.
    ///
    /// Looks for an interface that is up and not a loopback.
    pub fn on_default_interface() -> Result<Self, CaptureError> {
        let interface = datalink::interfaces()
            .into_iter()
            .find(|iface| iface.is_up() && !iface.is_loopback() && !iface.ips.is_empty())
            .ok_or_else(|| {
                CaptureError::InterfaceNotFound("no suitable interface found".to_string())
            })?;

        Ok(Self::with_interface(interface))
    }

    fn with_interface(interface: NetworkInterface) -> Self {
        Self {
            interface,
            options: CaptureOptions::default(),
            rx: None,
            buffer: Vec::with_capacity(DEFAULT_SNAPLEN),
            running: None,
        }
    }

    /// Override the channel settings. Takes effect on `open`.
    pub fn with_options(mut self, options: CaptureOptions) -> Self {
        self.options = options;
        self
    }

    /// Open the datalink channel.
    ///
    /// This is where privileges are needed; `next_frame` opens the
    /// channel lazily if this was not called.
    pub fn open(&mut self) -> Result<(), CaptureError> {
        if self.rx.is_some() {
            return Ok(());
        }

        let config = Config {
            read_buffer_size: self.options.snaplen,
            read_timeout: Some(self.options.read_timeout),
            promiscuous: self.options.promiscuous,
            ..Config::default()
        };

        let rx = match datalink::channel(&self.interface, config) {
            Ok(Channel::Ethernet(_tx, rx)) => rx,
            Ok(_) => {
                return Err(CaptureError::ChannelCreation(
                    "unsupported channel type".to_string(),
                ))
            }
            Err(e) => {
                let msg = e.to_string();
                if e.kind() == std::io::ErrorKind::PermissionDenied
                    || msg.contains("permission")
                    || msg.contains("Operation not permitted")
                {
                    return Err(CaptureError::InsufficientPermissions);
                }
                return Err(CaptureError::ChannelCreation(msg));
            }
        };

        tracing::info!(
            "Opened capture on {} (snaplen {}, promiscuous {})",
            self.interface.name,
            self.options.snaplen,
            self.options.promiscuous
        );
        self.rx = Some(rx);
        Ok(())
    }

    /// List all available network interfaces.
    pub fn list_interfaces() -> Vec<String> {
        datalink::interfaces()
            .into_iter()
            .map(|iface| {
                let status = if iface.is_up() { "UP" } else { "DOWN" };
                let ips: Vec<_> = iface.ips.iter().map(|ip| ip.to_string()).collect();
                format!(
                    "{}: {} [{}]",
                    iface.name,
                    status,
                    if ips.is_empty() {
                        "no IP".to_string()
                    } else {
                        ips.join(", ")
                    }
                )
            })
            .collect()
    }

    fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .map(|flag| flag.load(Ordering::SeqCst))
            .unwrap_or(true)
    }
}

impl FrameSource for PnetCapture {
    fn next_frame(&mut self) -> Result<Option<CapturedFrame<'_>>, CaptureError> {
        self.open()?;

        loop {
            if !self.is_running() {
                return Ok(None);
            }

            let Some(rx) = self.rx.as_mut() else {
                return Ok(None);
            };

            match rx.next() {
                Ok([]) => {
                    tracing::info!("Capture channel closed (orderly shutdown)");
                    return Ok(None);
                }
                Ok(data) => {
                    self.buffer.clear();
                    self.buffer.extend_from_slice(data);
                    break;
                }
                Err(e) => {
                    // Timeout is expected, continue
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::TimedOut
                            | std::io::ErrorKind::WouldBlock
                            | std::io::ErrorKind::Interrupted
                    ) {
                        continue;
                    }
                    return Err(CaptureError::Io(e));
                }
            }
        }

        Ok(Some(
            CapturedFrame::new(&self.buffer).with_timestamp(SystemTime::now()),
        ))
    }

    fn interface_name(&self) -> &str {
        &self.interface.name
    }

    fn set_running(&mut self, running: Arc<AtomicBool>) {
        self.running = Some(running);
    }
}
