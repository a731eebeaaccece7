//! Console-based record reporter.

use std::fmt::Write as _;
use std::io::{self, Write};
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::{DecodedRecord, NetworkLayer};
use crate::reporter::RecordReporter;
use crate::sniffer::SniffStats;

/// Reports decoded frames to stdout, one line per frame.
///
/// Line format:
/// `<link> <protocol> packet: <src-mac> > <dst-mac> <src>:<port> > <dst>:<port>`
pub struct ConsoleReporter {
    /// Whether to prefix timestamps and append the captured length
    verbose: bool,
    /// Set after the first failed write so it is only logged once
    write_failed: AtomicBool,
}

impl ConsoleReporter {
    /// Create a new console reporter.
    pub fn new() -> Self {
        Self {
            verbose: false,
            write_failed: AtomicBool::new(false),
        }
    }

    /// Whether any record line could not be written (e.g. a closed pipe).
    pub fn write_failed(&self) -> bool {
        self.write_failed.load(Ordering::Relaxed)
    }

    /// Write one rendered record to `out`.
    ///
    /// Write errors are not fatal to capture; the first one is logged.
    pub fn write_record<W: Write>(&self, out: &mut W, record: &DecodedRecord) {
        if let Err(e) = writeln!(out, "{}", self.format_record(record)) {
            if !self.write_failed.swap(true, Ordering::Relaxed) {
                tracing::debug!("Failed to write record output: {}", e);
            }
        }
    }

    /// Enable or disable verbose output.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Render a record as a single line.
    pub fn format_record(&self, record: &DecodedRecord) -> String {
        let link = &record.link;
        let mut output = String::new();

        if self.verbose {
            if let Some(ts) = record.timestamp {
                let _ = write!(output, "{} ", format_timestamp(ts));
            }
        }

        let endpoints = match &record.network {
            NetworkLayer::Ipv4(view) => Some((
                format_endpoint(view.source.into(), view.ports.map(|p| p.source)),
                format_endpoint(view.destination.into(), view.ports.map(|p| p.destination)),
            )),
            NetworkLayer::Ipv6(view) => Some((
                format_endpoint(view.source.into(), view.ports.map(|p| p.source)),
                format_endpoint(view.destination.into(), view.ports.map(|p| p.destination)),
            )),
            NetworkLayer::Unhandled => None,
        };
        let protocol = record.protocol_name.unwrap_or("unknown");

        let _ = match (record.link_label, endpoints) {
            (Some(label), Some((source, destination))) => write!(
                output,
                "{} {} packet: {} > {} {} > {}",
                label, protocol, link.source, link.destination, source, destination
            ),
            (Some(label), None) => write!(
                output,
                "{} {} packet: {} > {}",
                label, protocol, link.source, link.destination
            ),
            (None, _) => write!(
                output,
                "ethertype {:#06x} packet: {} > {}",
                link.ether_type.0, link.source, link.destination
            ),
        };

        if self.verbose {
            let _ = write!(output, " len {}", record.length);
        }

        output
    }
}

/// `addr` or `addr:port`; IPv6 with a port uses bracket notation.
fn format_endpoint(addr: IpAddr, port: Option<u16>) -> String {
    match port {
        Some(port) => SocketAddr::new(addr, port).to_string(),
        None => addr.to_string(),
    }
}

/// Seconds and microseconds since the epoch, tcpdump `-tt` style.
fn format_timestamp(ts: SystemTime) -> String {
    match ts.duration_since(UNIX_EPOCH) {
        Ok(d) => format!("{}.{:06}", d.as_secs(), d.subsec_micros()),
        Err(_) => "0.000000".to_string(),
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordReporter for ConsoleReporter {
    fn report(&self, record: &DecodedRecord) {
        self.write_record(&mut io::stdout().lock(), record);
    }

    fn on_start(&self, interface: &str) {
        eprintln!("Capturing frames on interface: {}", interface);
        eprintln!("Press Ctrl+C to stop.\n");
    }

    fn on_stop(&self, stats: &SniffStats) {
        eprintln!(
            "\n{} frames captured, {} decoded, {} unhandled, {} dropped",
            stats.frames, stats.decoded, stats.unhandled, stats.dropped
        );
    }
}
