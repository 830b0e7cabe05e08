//! Bounds-checked reader over a borrowed byte buffer.
//!
//! Every decoder walks untrusted, possibly truncated input through a
//! [`ByteCursor`]. Reads past the end fail with [`ProbeError::UnexpectedEof`]
//! instead of returning partial data, so decoders can be written as straight
//! line code that bails out with `?`.

use crate::error::ProbeError;

/// Byte order for multi-byte integer reads, fixed when a cursor is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

/// Text decoding applied by the string readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// 7-bit ASCII; bytes above 0x7F become U+FFFD.
    Ascii,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
    /// UTF-8, with invalid sequences replaced by U+FFFD.
    Utf8,
}

impl TextEncoding {
    fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Ascii => bytes
                .iter()
                .map(|&b| if b.is_ascii() { b as char } else { '\u{FFFD}' })
                .collect(),
            Self::Latin1 => bytes.iter().map(|&b| b as char).collect(),
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

/// Positioned reader over a fixed buffer.
///
/// The position always stays within `0..=len`.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8], endian: Endian) -> Self {
        Self {
            data,
            pos: 0,
            endian,
        }
    }

    pub fn big_endian(data: &'a [u8]) -> Self {
        Self::new(data, Endian::Big)
    }

    pub fn little_endian(data: &'a [u8]) -> Self {
        Self::new(data, Endian::Little)
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// True iff `n` more bytes can be read from the current position.
    pub fn can_read(&self, n: usize) -> bool {
        n <= self.remaining()
    }

    /// The whole backing buffer, independent of position.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Advance by `n`, clamped to the end of the buffer. Never fails.
    pub fn skip(&mut self, n: usize) {
        self.pos = self.pos.saturating_add(n).min(self.data.len());
    }

    /// Move to an absolute position. Positions past the end are rejected.
    pub fn seek(&mut self, position: usize) -> Result<(), ProbeError> {
        if position > self.data.len() {
            return Err(ProbeError::SeekOutOfRange {
                position,
                length: self.data.len(),
            });
        }
        self.pos = position;
        Ok(())
    }

    pub fn peek_u8(&self) -> Result<u8, ProbeError> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(ProbeError::UnexpectedEof)
    }

    pub fn read_u8(&mut self) -> Result<u8, ProbeError> {
        let b = self.peek_u8()?;
        self.pos += 1;
        Ok(b)
    }

    pub fn read_u16(&mut self) -> Result<u16, ProbeError> {
        let b = self.read_array::<2>()?;
        Ok(match self.endian {
            Endian::Big => u16::from_be_bytes(b),
            Endian::Little => u16::from_le_bytes(b),
        })
    }

    /// 24-bit unsigned integer (RIFF/WebP canvas sizes).
    pub fn read_u24(&mut self) -> Result<u32, ProbeError> {
        let b = self.read_array::<3>()?;
        Ok(match self.endian {
            Endian::Big => u32::from_be_bytes([0, b[0], b[1], b[2]]),
            Endian::Little => u32::from_le_bytes([b[0], b[1], b[2], 0]),
        })
    }

    pub fn read_u32(&mut self) -> Result<u32, ProbeError> {
        let b = self.read_array::<4>()?;
        Ok(match self.endian {
            Endian::Big => u32::from_be_bytes(b),
            Endian::Little => u32::from_le_bytes(b),
        })
    }

    pub fn read_i32(&mut self) -> Result<i32, ProbeError> {
        let b = self.read_array::<4>()?;
        Ok(match self.endian {
            Endian::Big => i32::from_be_bytes(b),
            Endian::Little => i32::from_le_bytes(b),
        })
    }

    /// Read exactly `N` bytes into an array (four-character codes, magic numbers).
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ProbeError> {
        let bytes = self.read_bytes(N)?;
        let mut buf = [0u8; N];
        buf.copy_from_slice(bytes);
        Ok(buf)
    }

    /// Borrow `len` raw bytes and advance past them.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ProbeError> {
        if !self.can_read(len) {
            return Err(ProbeError::UnexpectedEof);
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_fixed_string(
        &mut self,
        len: usize,
        encoding: TextEncoding,
    ) -> Result<String, ProbeError> {
        Ok(encoding.decode(self.read_bytes(len)?))
    }

    /// Read text up to a NUL byte, scanning at most `max_len` bytes (or to the
    /// end of the buffer). The terminator is consumed when found; otherwise the
    /// cursor ends at the limit of the scanned range.
    pub fn read_null_terminated_string(
        &mut self,
        max_len: Option<usize>,
        encoding: TextEncoding,
    ) -> String {
        let limit = max_len.map_or(self.remaining(), |m| m.min(self.remaining()));
        let window = &self.data[self.pos..self.pos + limit];
        match memchr::memchr(0, window) {
            Some(nul) => {
                self.pos += nul + 1;
                encoding.decode(&window[..nul])
            }
            None => {
                self.pos += limit;
                encoding.decode(window)
            }
        }
    }

    /// Whether the bytes at the current position equal `expected`. Does not advance.
    pub fn starts_with(&self, expected: &[u8]) -> bool {
        self.data[self.pos..].starts_with(expected)
    }
}
