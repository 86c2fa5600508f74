//! Cursor over an in-memory container.
//!
//! Every read either returns exactly what it promises and advances the
//! cursor, or fails and leaves the cursor where it was. All multi-byte
//! integers are little-endian.

use crate::{Error, Result};

/// Longest ULEB128 encoding of a `u32`.
const MAX_VARINT_BYTES: usize = 5;

/// Sequential reader over a borrowed byte buffer.
///
/// Invariant: `pos <= data.len()`.
#[derive(Debug, Clone)]
pub struct StreamIn<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> StreamIn<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte position.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total length of the underlying buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the cursor sits at the end of the buffer.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Bytes left after the cursor.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Look at the next `n` bytes without consuming them.
    pub fn peek(&self, n: usize) -> Option<&'a [u8]> {
        self.data.get(self.pos..self.pos.checked_add(n)?)
    }

    /// Move the cursor to an absolute position.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(Error::EndOfStream {
                offset: self.pos,
                need: pos - self.pos,
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Skip `n` bytes forward.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    /// Read `n` bytes without copying.
    pub fn read(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read exactly `N` bytes into a fixed-size array.
    #[inline]
    pub fn bytes<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut b = [0u8; N];
        b.copy_from_slice(self.read(N)?);
        Ok(b)
    }

    #[inline]
    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.bytes::<1>()?[0])
    }

    /// Read one byte as a character (platform tags).
    #[inline]
    pub fn char(&mut self) -> Result<char> {
        self.u8().map(char::from)
    }

    #[inline]
    pub fn u16(&mut self) -> Result<u16> {
        self.bytes().map(u16::from_le_bytes)
    }

    #[inline]
    pub fn u32(&mut self) -> Result<u32> {
        self.bytes().map(u32::from_le_bytes)
    }

    #[inline]
    pub fn s32(&mut self) -> Result<i32> {
        self.bytes().map(i32::from_le_bytes)
    }

    /// Read an unsigned LEB128 integer.
    ///
    /// Returns [`Error::MalformedVarint`] if the value does not fit in 32
    /// bits or the stream ends before the last byte.
    pub fn uleb128(&mut self) -> Result<u32> {
        let start = self.pos;
        let mut value = 0u32;
        for i in 0..MAX_VARINT_BYTES {
            let Some(&byte) = self.data.get(start + i) else {
                return Err(Error::MalformedVarint { offset: start });
            };
            // The fifth byte carries bits 28..32 only and cannot continue.
            if i == MAX_VARINT_BYTES - 1 && byte & 0xF0 != 0 {
                return Err(Error::MalformedVarint { offset: start });
            }
            value |= u32::from(byte & 0x7F) << (7 * i);
            if byte & 0x80 == 0 {
                self.pos = start + i + 1;
                return Ok(value);
            }
        }
        unreachable!("fifth varint byte always terminates")
    }

    /// Read a string prefixed with its ULEB128 byte length.
    pub fn string(&mut self) -> Result<String> {
        let start = self.pos;
        let len = self.uleb128()? as usize;
        let bytes = match self.read(len) {
            Ok(b) => b,
            Err(e) => {
                self.pos = start;
                return Err(e);
            }
        };
        match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_owned()),
            Err(_) => {
                self.pos = start;
                Err(Error::InvalidEncoding { offset: start })
            }
        }
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if n > self.remaining() {
            return Err(Error::EndOfStream {
                offset: self.pos,
                need: n,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_uleb128(mut n: u32) -> Vec<u8> {
        let mut out = Vec::new();
        loop {
            let byte = (n & 0x7F) as u8;
            n >>= 7;
            if n == 0 {
                out.push(byte);
                return out;
            }
            out.push(byte | 0x80);
        }
    }

    #[test]
    fn fixed_width_reads_are_little_endian() {
        let data = [0x01, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut s = StreamIn::new(&data);
        assert_eq!(s.u8().unwrap(), 1);
        assert_eq!(s.u16().unwrap(), 0x1234);
        assert_eq!(s.u32().unwrap(), 0x1234_5678);
        assert_eq!(s.s32().unwrap(), -1);
        assert!(s.is_empty());
    }

    #[test]
    fn short_read_fails_without_moving() {
        let data = [1, 2, 3];
        let mut s = StreamIn::new(&data);
        s.skip(1).unwrap();
        assert!(matches!(
            s.u32(),
            Err(Error::EndOfStream { offset: 1, need: 4 })
        ));
        assert_eq!(s.position(), 1);
        assert_eq!(s.read(2).unwrap(), &[2, 3]);
    }

    #[test]
    fn seek_and_skip_bounds() {
        let data = [0u8; 4];
        let mut s = StreamIn::new(&data);
        s.seek(4).unwrap();
        assert!(s.is_empty());
        assert!(s.seek(5).is_err());
        s.seek(0).unwrap();
        assert!(s.skip(5).is_err());
        s.skip(4).unwrap();
        assert_eq!(s.remaining(), 0);
    }

    #[test]
    fn uleb128_round_trips() {
        let samples = [
            0,
            1,
            0x7F,
            0x80,
            0x3FFF,
            0x4000,
            0x1F_FFFF,
            0x20_0000,
            0x0FFF_FFFF,
            0x1000_0000,
            u32::MAX - 1,
            u32::MAX,
        ];
        for n in samples
            .into_iter()
            .chain((0..u32::MAX).step_by(0x0101_0101 / 7))
        {
            let bytes = encode_uleb128(n);
            let mut s = StreamIn::new(&bytes);
            assert_eq!(s.uleb128().unwrap(), n, "value {n:#x}");
            assert!(s.is_empty());
        }
    }

    #[test]
    fn truncated_uleb128_is_malformed() {
        for n in [0, 0x80, 0x4000, u32::MAX] {
            let bytes = encode_uleb128(n);
            for cut in 0..bytes.len() {
                let mut s = StreamIn::new(&bytes[..cut]);
                assert!(
                    matches!(s.uleb128(), Err(Error::MalformedVarint { offset: 0 })),
                    "value {n:#x} cut at {cut}"
                );
            }
        }
    }

    #[test]
    fn uleb128_rejects_overflow() {
        // Bits past 32 in the fifth byte.
        let mut s = StreamIn::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0x1F]);
        assert!(matches!(s.uleb128(), Err(Error::MalformedVarint { .. })));
        // A sixth byte.
        let mut s = StreamIn::new(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x00]);
        assert!(matches!(s.uleb128(), Err(Error::MalformedVarint { .. })));
    }

    #[test]
    fn strings() {
        let mut data = vec![5];
        data.extend_from_slice(b"hello");
        data.extend_from_slice(&[2, 0xC3, 0x28]);
        let mut s = StreamIn::new(&data);
        assert_eq!(s.string().unwrap(), "hello");
        let at = s.position();
        assert!(matches!(s.string(), Err(Error::InvalidEncoding { offset }) if offset == at));

        let mut s = StreamIn::new(&[4, b'a']);
        assert!(matches!(s.string(), Err(Error::EndOfStream { .. })));
    }
}
