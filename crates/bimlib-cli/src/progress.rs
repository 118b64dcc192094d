// Upload progress reporting
//
// Wraps the file being uploaded so every read reports the running byte
// count against the total. The HTTP client may read the body from its own
// thread, so the callback must be shareable.

use std::io::{self, Read};
use std::sync::Arc;

/// Receives `(bytes_sent, total_bytes)` as an upload body is read.
pub type ProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// A reader that reports how much of a known-length body has been consumed.
pub struct ProgressReader<R> {
    inner: R,
    sent: u64,
    total: u64,
    on_progress: ProgressFn,
}

impl<R: Read> ProgressReader<R> {
    pub fn new(inner: R, total: u64, on_progress: ProgressFn) -> Self {
        Self {
            inner,
            sent: 0,
            total,
            on_progress,
        }
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.sent += n as u64;
            (self.on_progress)(self.sent, self.total);
        }
        Ok(n)
    }
}

/// Fraction of the upload completed, clamped to `0.0..=1.0`.
pub fn fraction(sent: u64, total: u64) -> f64 {
    if total == 0 {
        return 1.0;
    }
    (sent as f64 / total as f64).clamp(0.0, 1.0)
}
