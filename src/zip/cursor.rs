//! Bounds-checked reader over an in-memory archive.
//!
//! Every read either succeeds or yields [`Error::Format`]; an archive that
//! claims a field past the end of the buffer is malformed, not a panic.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use crate::error::{Error, Result};

/// Little-endian cursor over a borrowed byte slice.
pub struct ByteReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    /// Create a reader positioned at `offset`.
    pub fn at(data: &'a [u8], offset: usize) -> Result<Self> {
        let mut reader = Self::new(data);
        reader.seek(offset)?;
        Ok(reader)
    }

    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    pub fn remaining(&self) -> usize {
        self.cursor.get_ref().len().saturating_sub(self.position())
    }

    pub fn seek(&mut self, offset: usize) -> Result<()> {
        if offset > self.cursor.get_ref().len() {
            return Err(Error::format(format!(
                "offset {} is beyond the end of the archive ({} bytes)",
                offset,
                self.cursor.get_ref().len()
            )));
        }
        self.cursor.set_position(offset as u64);
        Ok(())
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        let target = self
            .position()
            .checked_add(len)
            .ok_or_else(|| Error::format("field length overflows"))?;
        self.seek(target)
    }

    pub fn u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.cursor.read_u8()?)
    }

    pub fn u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        Ok(self.cursor.read_u16::<LittleEndian>()?)
    }

    pub fn u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.cursor.read_u32::<LittleEndian>()?)
    }

    /// Borrow the next `len` bytes and advance past them.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        self.ensure(len)?;
        let start = self.position();
        let data: &'a [u8] = *self.cursor.get_ref();
        self.cursor.set_position((start + len) as u64);
        Ok(&data[start..start + len])
    }

    fn ensure(&self, wanted: usize) -> Result<()> {
        if wanted > self.remaining() {
            return Err(Error::format(format!(
                "truncated archive: wanted {} bytes at offset {}, {} available",
                wanted,
                self.position(),
                self.remaining()
            )));
        }
        Ok(())
    }
}
