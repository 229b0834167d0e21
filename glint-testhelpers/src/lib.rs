#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A cloneable in-memory sink.
///
/// Clones share one buffer, so a test can hand a handler the sink by value
/// and keep a clone around to read back what was written.
#[derive(Debug, Clone, Default)]
pub struct TestSink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl TestSink {
    /// An empty sink.
    pub fn new() -> TestSink {
        TestSink::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    /// Everything written so far, as raw bytes.
    pub fn bytes(&self) -> Vec<u8> {
        self.lock().clone()
    }

    /// Discards everything written so far.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.buf.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl io::Write for TestSink {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.lock().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
