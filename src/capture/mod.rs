//! Frame sources.
//!
//! The sniffer loop only sees `FrameSource`; `PnetCapture` is the live
//! implementation and tests substitute in-memory sources.

mod pnet_capture;

pub use pnet_capture::{CaptureOptions, PnetCapture, DEFAULT_READ_TIMEOUT, DEFAULT_SNAPLEN};

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::domain::CapturedFrame;
use crate::error::CaptureError;

/// Supplier of captured link-layer frames (DIP).
pub trait FrameSource: Send {
    /// Block until the next frame arrives.
    ///
    /// Returns `Ok(None)` on orderly shutdown: the peer closed the
    /// channel (zero-length receive) or the running flag was cleared.
    /// The returned frame borrows the source's receive buffer and is only
    /// valid until the next call.
    fn next_frame(&mut self) -> Result<Option<CapturedFrame<'_>>, CaptureError>;

    /// Interface the frames come from.
    fn interface_name(&self) -> &str;

    /// Shared stop flag; once it reads false, `next_frame` returns `Ok(None)`.
    fn set_running(&mut self, running: Arc<AtomicBool>);
}
