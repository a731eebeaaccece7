//! Capture loop tying a frame source to the decoder and a reporter.

use crate::capture::FrameSource;
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::error::CaptureError;
use crate::pipeline::FrameDecoder;
use crate::reporter::RecordReporter;

/// Per-run frame counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SniffStats {
    /// Frames received from the source
    pub frames: u64,
    /// Frames with a decoded network header
    pub decoded: u64,
    /// Frames with no decoder for their link-layer type
    pub unhandled: u64,
    /// Frames dropped because a header was truncated or malformed
    pub dropped: u64,
}

/// Receives, decodes and reports frames until the source shuts down.
///
/// Frames are handled one at a time: each is decoded and reported before
/// the next receive. A decode failure only affects its own frame.
pub struct Sniffer<S, R> {
    source: S,
    decoder: FrameDecoder,
    reporter: R,
    sink: Box<dyn DiagnosticSink>,
    limit: Option<u64>,
}

impl<S: FrameSource, R: RecordReporter> Sniffer<S, R> {
    /// Create a sniffer with the default decoder, logging diagnostics via tracing.
    pub fn new(source: S, reporter: R) -> Self {
        Self {
            source,
            decoder: FrameDecoder::new(),
            reporter,
            sink: Box::new(TracingSink),
            limit: None,
        }
    }

    pub fn with_decoder(mut self, decoder: FrameDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn with_sink(mut self, sink: Box<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Stop after this many frames have been received.
    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    /// Run until orderly shutdown or the frame limit.
    ///
    /// Only capture errors end the loop early; they are returned as-is.
    pub fn run(&mut self) -> Result<SniffStats, CaptureError> {
        let mut stats = SniffStats::default();
        self.reporter.on_start(self.source.interface_name());

        while self.limit.map_or(true, |limit| stats.frames < limit) {
            let Some(frame) = self.source.next_frame()? else {
                break;
            };
            stats.frames += 1;

            match self.decoder.decode(&frame, self.sink.as_ref()) {
                Ok(record) => {
                    if record.network.is_unhandled() {
                        stats.unhandled += 1;
                    } else {
                        stats.decoded += 1;
                    }
                    self.reporter.report(&record);
                }
                Err(error) => {
                    stats.dropped += 1;
                    self.sink.emit(Diagnostic::FrameDropped {
                        length: frame.len(),
                        error,
                    });
                }
            }
        }

        tracing::info!(
            "Capture finished: {} frames, {} decoded, {} unhandled, {} dropped",
            stats.frames,
            stats.decoded,
            stats.unhandled,
            stats.dropped
        );
        self.reporter.on_stop(&stats);
        Ok(stats)
    }
}
