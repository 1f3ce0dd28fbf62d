//! Buffered byte scanner for the ingestion state machine.
//!
//! Thin layer over `BufRead` that tracks how many bytes have been
//! consumed (the checkpointing currency) and exposes the two access
//! patterns the pipeline mixes: whole lines for header blocks, and
//! delimiter/byte scans for comment bodies and move tokens.

use std::io::{self, BufRead};

pub(crate) struct ByteScanner<R> {
    inner: R,
    consumed: u64,
}

impl<R: BufRead> ByteScanner<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self { inner, consumed: 0 }
    }

    /// Total bytes consumed from the underlying stream.
    pub(crate) fn bytes_consumed(&self) -> u64 {
        self.consumed
    }

    /// Read one byte. `None` at end of input.
    pub(crate) fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let buf = self.inner.fill_buf()?;
        if buf.is_empty() {
            return Ok(None);
        }
        let byte = buf[0];
        self.inner.consume(1);
        self.consumed += 1;
        Ok(Some(byte))
    }

    /// Read the next line, without its terminator. `None` at end of input.
    pub(crate) fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut raw = Vec::new();
        if !self.scan_until(b'\n', Some(&mut raw))? && raw.is_empty() {
            return Ok(None);
        }
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }
        Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
    }

    /// Consume bytes up to and including `delim`, discarding them.
    /// Returns false if the input ended before the delimiter.
    pub(crate) fn skip_until(&mut self, delim: u8) -> io::Result<bool> {
        self.scan_until(delim, None)
    }

    /// Consume bytes up to and including `delim`, appending everything
    /// before the delimiter to `out`. Returns false if the input ended
    /// before the delimiter.
    pub(crate) fn read_until(&mut self, delim: u8, out: &mut Vec<u8>) -> io::Result<bool> {
        self.scan_until(delim, Some(out))
    }

    fn scan_until(&mut self, delim: u8, mut out: Option<&mut Vec<u8>>) -> io::Result<bool> {
        loop {
            let buf = self.inner.fill_buf()?;
            if buf.is_empty() {
                return Ok(false);
            }
            match memchr::memchr(delim, buf) {
                Some(pos) => {
                    if let Some(out) = out.as_deref_mut() {
                        out.extend_from_slice(&buf[..pos]);
                    }
                    self.inner.consume(pos + 1);
                    self.consumed += (pos + 1) as u64;
                    return Ok(true);
                }
                None => {
                    let len = buf.len();
                    if let Some(out) = out.as_deref_mut() {
                        out.extend_from_slice(buf);
                    }
                    self.inner.consume(len);
                    self.consumed += len as u64;
                }
            }
        }
    }
}
