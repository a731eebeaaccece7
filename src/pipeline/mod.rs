//! Frame dispatch module.
//!
//! Routes a captured frame from the link-layer parser to the network
//! parser registered for its EtherType (SRP).

mod frame_decoder;

pub use frame_decoder::FrameDecoder;
