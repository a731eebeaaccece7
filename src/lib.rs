//! rawsniff - promiscuous-mode frame inspector.
//!
//! Captures Ethernet frames, decodes the link, IPv4/IPv6 and transport
//! port headers, and renders one line per frame. A separate monitor
//! prints rtnetlink interface, address and route notifications.
//!
//! Decoding is pure: [`pipeline::FrameDecoder::decode`] takes a borrowed
//! frame and returns a [`domain::DecodedRecord`] or a
//! [`error::DecodeError`], reporting non-fatal conditions through a
//! [`diagnostics::DiagnosticSink`].

pub mod capture;
pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod monitor;
pub mod parser;
pub mod pipeline;
pub mod reporter;
pub mod sniffer;

pub use config::Config;
pub use sniffer::{SniffStats, Sniffer};
