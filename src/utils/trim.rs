//! Whole-stream whitespace trimming.

use std::io;

use super::text::TextWrite;

/// Pass-through sink that trims the stream as if it were one string.
///
/// Leading whitespace is dropped until the first visible character. After
/// that, trailing whitespace of each write is held back and only emitted
/// once more visible text follows, so whatever is still held when the
/// writer is finished is discarded. Memory use is bounded by the longest
/// whitespace run, not by the stream length.
///
/// # Example
///
/// ```
/// use skinpack::utils::text::TextWrite;
/// use skinpack::utils::trim::TrimmingWriter;
///
/// let mut trimmer = TrimmingWriter::new(String::new());
/// trimmer.write_str("  a ").unwrap();
/// trimmer.write_str(" b  ").unwrap();
/// assert_eq!(trimmer.char_count(), 4);
/// assert_eq!(trimmer.finish().unwrap(), "a  b");
/// ```
pub struct TrimmingWriter<W> {
    inner: W,
    trimming_start: bool,
    pending: String,
    char_count: usize,
}

impl<W: TextWrite> TrimmingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            trimming_start: true,
            pending: String::new(),
            char_count: 0,
        }
    }

    /// Characters actually written downstream so far.
    pub fn char_count(&self) -> usize {
        self.char_count
    }

    /// Drop held-back trailing whitespace, flush, and return the inner sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.pending.clear();
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn flush_pending(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.inner.write_str(&self.pending)?;
        self.char_count += self.pending.chars().count();
        self.pending.clear();
        Ok(())
    }
}

impl<W: TextWrite> TextWrite for TrimmingWriter<W> {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        let mut s = s;
        if self.trimming_start {
            s = s.trim_start();
            if s.is_empty() {
                return Ok(());
            }
            self.trimming_start = false;
        }

        let body = s.trim_end();
        if !body.is_empty() {
            self.flush_pending()?;
            self.inner.write_str(body)?;
            self.char_count += body.chars().count();
        }
        self.pending.push_str(&s[body.len()..]);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
