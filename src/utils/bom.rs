//! Byte-order-mark removal for member files.
//!
//! Editors on some platforms prefix UTF-8 files with `EF BB BF`. Left in
//! place, the mark would end up in the middle of a merged bundle where
//! browsers treat it as a stray character.

use std::io::{self, Read};

/// UTF-8 encoding of U+FEFF.
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Reader that drops a single leading UTF-8 byte-order mark.
///
/// The first bytes of the inner stream are probed once. If they spell the
/// mark they are discarded, otherwise they are replayed untouched before
/// reading continues from the inner stream. Any read size works, including
/// one byte at a time.
///
/// # Example
///
/// ```
/// use std::io::Read;
/// use skinpack::utils::bom::BomStripReader;
///
/// let mut reader = BomStripReader::new(&b"\xEF\xBB\xBFbody{}"[..]);
/// let mut text = String::new();
/// reader.read_to_string(&mut text).unwrap();
/// assert_eq!(text, "body{}");
/// ```
pub struct BomStripReader<R> {
    inner: R,
    /// Bytes consumed while probing that have not been handed out yet.
    probe: [u8; 3],
    probe_pos: usize,
    probe_len: usize,
    probed: bool,
    stripped: bool,
}

impl<R: Read> BomStripReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            probe: [0; 3],
            probe_pos: 0,
            probe_len: 0,
            probed: false,
            stripped: false,
        }
    }

    /// Whether a mark was found and dropped (known after the first read).
    pub fn stripped(&self) -> bool {
        self.stripped
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn probe(&mut self) -> io::Result<()> {
        let mut filled = 0;
        while filled < UTF8_BOM.len() {
            match self.inner.read(&mut self.probe[filled..]) {
                Ok(0) => break,
                Ok(n) => {
                    filled += n;
                    // Stop as soon as the prefix diverges from the mark
                    if self.probe[..filled] != UTF8_BOM[..filled] {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        self.probed = true;
        self.probe_pos = 0;
        if filled == UTF8_BOM.len() && self.probe == UTF8_BOM {
            self.stripped = true;
            self.probe_len = 0;
        } else {
            self.probe_len = filled;
        }
        Ok(())
    }
}

impl<R: Read> Read for BomStripReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if !self.probed {
            self.probe()?;
        }

        if self.probe_pos < self.probe_len {
            let n = (self.probe_len - self.probe_pos).min(buf.len());
            buf[..n].copy_from_slice(&self.probe[self.probe_pos..self.probe_pos + n]);
            self.probe_pos += n;
            return Ok(n);
        }

        self.inner.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_bulk(input: &[u8]) -> (Vec<u8>, bool) {
        let mut reader = BomStripReader::new(input);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        (out, reader.stripped())
    }

    fn read_bytewise(input: &[u8]) -> Vec<u8> {
        let mut reader = BomStripReader::new(input);
        let mut out = Vec::new();
        let mut byte = [0u8; 1];
        while reader.read(&mut byte).unwrap() == 1 {
            out.push(byte[0]);
        }
        out
    }

    /// Inner reader that hands out one byte per call.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match (self.0.split_first(), buf.is_empty()) {
                (Some((first, rest)), false) => {
                    buf[0] = *first;
                    self.0 = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    #[test]
    fn test_strips_leading_bom() {
        let (out, stripped) = read_bulk(b"\xEF\xBB\xBFa { color: red }");
        assert_eq!(out, b"a { color: red }");
        assert!(stripped);
    }

    #[test]
    fn test_no_bom_untouched() {
        let (out, stripped) = read_bulk(b"var x = 1;");
        assert_eq!(out, b"var x = 1;");
        assert!(!stripped);
    }

    #[test]
    fn test_only_first_bom_dropped() {
        let (out, _) = read_bulk(b"\xEF\xBB\xBF\xEF\xBB\xBFx");
        assert_eq!(out, b"\xEF\xBB\xBFx");
    }

    #[test]
    fn test_partial_bom_prefix_replayed() {
        let (out, stripped) = read_bulk(b"\xEF\xBBz");
        assert_eq!(out, b"\xEF\xBBz");
        assert!(!stripped);
    }

    #[test]
    fn test_bytewise_matches_bulk() {
        assert_eq!(read_bytewise(b"\xEF\xBB\xBFabc"), b"abc");
        assert_eq!(read_bytewise(b"abc"), b"abc");
        assert_eq!(read_bytewise(b"ab"), b"ab");
    }

    #[test]
    fn test_trickling_inner_reader() {
        let mut reader = BomStripReader::new(Trickle(b"\xEF\xBB\xBFhello"));
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, "hello");
    }

    #[test]
    fn test_empty_and_bom_only_inputs() {
        assert_eq!(read_bulk(b"").0, b"");
        let (out, stripped) = read_bulk(&UTF8_BOM);
        assert!(out.is_empty());
        assert!(stripped);
    }
}
