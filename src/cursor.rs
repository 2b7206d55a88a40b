use crate::{dex_err, Result};

/// Byte order for multi-byte reads, fixed once the header's endian tag
/// has been decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// Sequential/random-access reader over an in-memory byte source.
///
/// All scalar reads honor the stored [`Endian`]. Seeking past the end is
/// allowed; the subsequent read fails instead.
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            endian: Endian::Little,
        }
    }

    #[inline(always)]
    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    #[inline(always)]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline(always)]
    pub fn seek(&mut self, offset: usize) {
        self.pos = offset;
    }

    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Fails with `TruncatedInput` unless at least `n` bytes remain. Used to
    /// validate a table's declared extent before reserving space for it.
    pub fn ensure_remaining(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return dex_err!(TruncatedInput {
                offset: self.pos,
                wanted: n,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return dex_err!(TruncatedInput {
                offset: self.pos,
                wanted: n,
                available: self.remaining(),
            });
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    #[inline]
    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        if self.remaining() < N {
            return dex_err!(UnexpectedEndOfFile { offset: self.pos });
        }
        let mut buf = [0u8; N];
        buf.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(buf)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take::<1>()?[0])
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        let buf = self.take::<2>()?;
        Ok(match self.endian {
            Endian::Little => u16::from_le_bytes(buf),
            Endian::Big => u16::from_be_bytes(buf),
        })
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        let buf = self.take::<4>()?;
        Ok(match self.endian {
            Endian::Little => u32::from_le_bytes(buf),
            Endian::Big => u32::from_be_bytes(buf),
        })
    }

    /// Reads an unsigned LEB128 value, 7 bits per byte, high bit as the
    /// continuation flag. No canonical-form or range validation: bits past
    /// the 32nd are discarded, matching the format's permissive decoding.
    pub fn read_uleb128(&mut self) -> Result<u32> {
        let mut result: u32 = 0;
        let mut shift = 0u32;
        loop {
            let b = self.read_u8()?;
            if shift < 32 {
                result |= ((b & 0x7f) as u32) << shift;
            }
            if b & 0x80 == 0 {
                break;
            }
            shift += 7;
        }
        Ok(result)
    }

    /// Reads a modified-UTF-8 string record: a uleb128 UTF-16 length, then
    /// bytes one at a time up to 3x that length (the encoding's documented
    /// worst case), stopping at the first NUL byte. The consumed prefix is
    /// decoded as UTF-8.
    pub fn read_mutf8_string(&mut self) -> Result<String> {
        let utf16_len = self.read_uleb128()? as usize;
        let bound = utf16_len.saturating_mul(3);
        // the declared length is untrusted; never reserve past the input
        let mut buf = Vec::with_capacity(bound.min(self.remaining()));
        for _ in 0..bound {
            let b = self.read_u8()?;
            if b == 0 {
                break;
            }
            buf.push(b);
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
