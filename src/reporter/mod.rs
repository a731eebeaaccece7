//! Reporting module for decoded frames.
//!
//! This module defines the `RecordReporter` trait (ISP, DIP) and provides
//! implementations for different output formats.

mod console_reporter;

pub use console_reporter::ConsoleReporter;

use crate::domain::DecodedRecord;
use crate::sniffer::SniffStats;

/// Trait for reporting decoded frames (Interface Segregation Principle).
///
/// This trait only handles output. Decode failures and warnings go to the
/// diagnostic sink instead, so a reporter never sees a partial record.
pub trait RecordReporter: Send {
    /// Report one decoded frame.
    fn report(&self, record: &DecodedRecord);

    /// Called when capture starts.
    fn on_start(&self, interface: &str);

    /// Called when capture stops.
    fn on_stop(&self, stats: &SniffStats);
}
