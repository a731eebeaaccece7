//! Captured frame type.

use std::time::SystemTime;

/// One link-layer frame as received from a capture source.
///
/// The slice length is the number of bytes actually captured, which may be
/// less than the frame's length on the wire. Decoders never read past it.
#[derive(Debug, Clone, Copy)]
pub struct CapturedFrame<'a> {
    data: &'a [u8],
    timestamp: Option<SystemTime>,
}

impl<'a> CapturedFrame<'a> {
    /// Wrap captured bytes without a timestamp.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            timestamp: None,
        }
    }

    /// Attach the time the frame was received.
    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Number of captured bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn timestamp(&self) -> Option<SystemTime> {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_len_is_captured_extent() {
        let buffer = [0u8; 2048];
        let frame = CapturedFrame::new(&buffer[..60]);

        assert_eq!(frame.len(), 60);
        assert!(!frame.is_empty());
        assert!(frame.timestamp().is_none());
    }

    #[test]
    fn test_with_timestamp() {
        let ts = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let frame = CapturedFrame::new(&[]).with_timestamp(ts);

        assert!(frame.is_empty());
        assert_eq!(frame.timestamp(), Some(ts));
    }
}
