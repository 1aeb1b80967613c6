//! Byte-count progress for dump reads.

use std::io::Read;

/// Reader adapter that reports the running total of bytes read to a callback.
///
/// The count is taken from the underlying (possibly compressed) file, so it
/// lines up with the file size shown in a progress bar.
pub struct ProgressReader<R: Read, F: Fn(u64)> {
    inner: R,
    on_progress: F,
    total: u64,
}

impl<R: Read, F: Fn(u64)> ProgressReader<R, F> {
    pub fn new(inner: R, on_progress: F) -> Self {
        Self {
            inner,
            on_progress,
            total: 0,
        }
    }

    pub fn bytes_read(&self) -> u64 {
        self.total
    }
}

impl<R: Read, F: Fn(u64)> Read for ProgressReader<R, F> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.total += n as u64;
            (self.on_progress)(self.total);
        }
        Ok(n)
    }
}
