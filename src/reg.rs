use thiserror::Error;

pub const REGISTER_CNT: usize = 8;

/// Register holding the stack pointer.
pub const SP: u8 = 7;

/// Stack pointer value after power-on; the stack grows down from here.
pub const SP_INIT: u8 = 0xF4;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegisterError {
    #[error("register index {0} is out of range")]
    InvalidRegister(u8),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    data: [u8; REGISTER_CNT],
}
impl Registers {
    pub fn new() -> Self {
        let mut data = [0; REGISTER_CNT];
        data[SP as usize] = SP_INIT;
        Self { data }
    }

    pub fn get(&self, index: u8) -> Result<u8, RegisterError> {
        self.data
            .get(index as usize)
            .copied()
            .ok_or(RegisterError::InvalidRegister(index))
    }

    pub fn set(&mut self, index: u8, value: u8) -> Result<(), RegisterError> {
        let slot = self
            .data
            .get_mut(index as usize)
            .ok_or(RegisterError::InvalidRegister(index))?;
        *slot = value;
        Ok(())
    }

    pub fn sp(&self) -> u8 {
        self.data[SP as usize]
    }

    pub fn set_sp(&mut self, value: u8) {
        self.data[SP as usize] = value;
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}
impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}
