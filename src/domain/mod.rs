//! Domain models for frame decoding.
//!
//! These types are independent of the capture backend and of how
//! records are rendered.

mod frame;
pub mod protocol;
mod record;

pub use frame::CapturedFrame;
pub use record::{DecodedRecord, Ipv4View, Ipv6View, LinkLayerHeader, NetworkLayer, Ports};
