use core::fmt::Debug;

use thiserror::Error;

pub const RAM_SIZE: usize = 256;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MemoryError {
    #[error("address {0:#04x} is out of range")]
    OutOfRange(usize),
    #[error("program of {len} bytes at {start:#04x} does not fit in {capacity} bytes of memory")]
    ProgramTooLarge {
        len: usize,
        start: usize,
        capacity: usize,
    },
}

pub trait Memory: Debug {
    fn read_byte(&self, addr: usize) -> Result<u8, MemoryError>;

    fn write_byte(&mut self, addr: usize, data: u8) -> Result<(), MemoryError>;

    fn get_byte_size(&self) -> usize;

    /// Copies `bytes` into memory starting at `start`.
    ///
    /// Nothing is written if the program would run past the end of memory.
    fn load(&mut self, bytes: &[u8], start: usize) -> Result<(), MemoryError> {
        let capacity = self.get_byte_size();
        if start.checked_add(bytes.len()).map_or(true, |end| end > capacity) {
            return Err(MemoryError::ProgramTooLarge {
                len: bytes.len(),
                start,
                capacity,
            });
        }

        for (offset, &byte) in bytes.iter().enumerate() {
            self.write_byte(start + offset, byte)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RAM<const BYTE_SIZE: usize> {
    data: [u8; BYTE_SIZE],
}
impl<const BYTE_SIZE: usize> RAM<BYTE_SIZE> {
    pub fn new() -> Self {
        Self {
            data: [0; BYTE_SIZE],
        }
    }
}
impl<const BYTE_SIZE: usize> Default for RAM<BYTE_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}
impl<const BYTE_SIZE: usize> Memory for RAM<BYTE_SIZE> {
    fn read_byte(&self, addr: usize) -> Result<u8, MemoryError> {
        self.data
            .get(addr)
            .copied()
            .ok_or(MemoryError::OutOfRange(addr))
    }

    fn write_byte(&mut self, addr: usize, data: u8) -> Result<(), MemoryError> {
        let slot = self
            .data
            .get_mut(addr)
            .ok_or(MemoryError::OutOfRange(addr))?;
        *slot = data;
        Ok(())
    }

    fn get_byte_size(&self) -> usize {
        self.data.len()
    }
}
