use std::{fs, io, path::Path};

use log::debug;
use thiserror::Error;

use crate::inst::lookup_mnemonic;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read program: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: unknown token '{token}'")]
    UnknownToken { line: usize, token: String },
    #[error("line {line}: invalid literal '{token}'")]
    InvalidLiteral { line: usize, token: String },
}

/// Turns program source text into the bytes to place in memory at address 0.
pub trait Loader {
    fn load(&self, source: &str) -> Result<Vec<u8>, LoadError>;
}

/// Assembles `LDI R0,8`-style text.
#[derive(Debug, Default, Clone, Copy)]
pub struct MnemonicLoader;
impl Loader for MnemonicLoader {
    fn load(&self, source: &str) -> Result<Vec<u8>, LoadError> {
        let mut program = vec![];

        for (i, line) in source.lines().enumerate() {
            let line_no = i + 1;
            let code = match line.split_once('#') {
                Some((code, _comment)) => code,
                None => line,
            };

            for token in code.replace(',', " ").split_whitespace() {
                program.push(assemble_token(token, line_no)?);
            }
        }

        Ok(program)
    }
}

fn assemble_token(token: &str, line: usize) -> Result<u8, LoadError> {
    if let Some(op) = lookup_mnemonic(token) {
        return Ok(op.code);
    }

    let mut chars = token.chars();
    if let (Some('R' | 'r'), Some(digit), None) = (chars.next(), chars.next(), chars.next()) {
        if let Some(index) = digit.to_digit(10) {
            return Ok(index as u8);
        }
    }

    if token.chars().all(|c| c.is_ascii_digit()) {
        return token.parse::<u8>().map_err(|_| LoadError::InvalidLiteral {
            line,
            token: token.to_string(),
        });
    }

    Err(LoadError::UnknownToken {
        line,
        token: token.to_string(),
    })
}

/// Reads one `0b`-less binary byte per line, e.g. `10000010 # LDI R0,8`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BinaryLoader;
impl Loader for BinaryLoader {
    fn load(&self, source: &str) -> Result<Vec<u8>, LoadError> {
        let mut program = vec![];

        for (i, line) in source.lines().enumerate() {
            if !line.starts_with(|c: char| c.is_ascii_digit()) {
                continue;
            }

            let literal: String = line.chars().take(8).collect();
            let byte = u8::from_str_radix(&literal, 2).map_err(|_| LoadError::InvalidLiteral {
                line: i + 1,
                token: literal.clone(),
            })?;
            program.push(byte);
        }

        Ok(program)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramFormat {
    Mnemonic,
    Binary,
}
impl ProgramFormat {
    /// `.ls8` files hold binary text; everything else is treated as mnemonics.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("ls8") => ProgramFormat::Binary,
            _ => ProgramFormat::Mnemonic,
        }
    }

    pub fn loader(self) -> &'static dyn Loader {
        match self {
            ProgramFormat::Mnemonic => &MnemonicLoader,
            ProgramFormat::Binary => &BinaryLoader,
        }
    }
}

pub fn load_file(path: impl AsRef<Path>, format: ProgramFormat) -> Result<Vec<u8>, LoadError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)?;
    let program = format.loader().load(&source)?;
    debug!(
        "Read {} bytes of {:?} program from {}",
        program.len(),
        format,
        path.display()
    );
    Ok(program)
}
