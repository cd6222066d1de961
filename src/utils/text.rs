//! Character sinks for the bundle pipeline.
//!
//! Bundles are produced by layering sinks: a [`TrimmingWriter`] feeds an
//! [`EncodingWriter`], which turns text into bytes in the configured
//! encoding and hands them to a byte sink (normally a digesting file
//! writer).
//!
//! [`TrimmingWriter`]: super::trim::TrimmingWriter

use std::io::{self, Write};

use encoding_rs::Encoding;

/// A sink that accepts text.
pub trait TextWrite {
    fn write_str(&mut self, s: &str) -> io::Result<()>;

    fn write_char(&mut self, c: char) -> io::Result<()> {
        self.write_str(c.encode_utf8(&mut [0; 4]))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl TextWrite for String {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.push_str(s);
        Ok(())
    }
}

impl<T: TextWrite + ?Sized> TextWrite for &mut T {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        (**self).write_str(s)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Encodes text into a byte sink.
///
/// Encodings that `encoding_rs` can only decode (UTF-16) are written as
/// UTF-8, which is what `Encoding::encode` does for them.
pub struct EncodingWriter<W> {
    inner: W,
    encoding: &'static Encoding,
}

impl<W: Write> EncodingWriter<W> {
    pub fn new(inner: W, encoding: &'static Encoding) -> Self {
        Self { inner, encoding }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> TextWrite for EncodingWriter<W> {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        let (bytes, _, _) = self.encoding.encode(s);
        self.inner.write_all(&bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Decode raw bytes with `encoding`, leaving any byte-order mark alone.
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    text.into_owned()
}

/// Look up an encoding by its WHATWG label (`"utf-8"`, `"latin1"`, ...).
pub fn encoding_for_label(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
}
