//! Systematic Reed-Solomon forward error correction over GF(2^m).
//!
//! An [`Encoder`] fills the parity prefix of a block from its payload; a
//! [`Decoder`] locates and repairs up to `parity / 2` corrupted symbols of a
//! received block in place. Both work on fixed blocks of `field_size - 1`
//! symbols; [`stream`] adapts them to byte streams of any length.
//!
//! # Example
//!
//! ```
//! use rs_gf::{DecodeOutcome, Decoder, Encoder};
//!
//! let mut encoder = Encoder::new(16, 11, 4, 0x13).unwrap();
//! let mut decoder = Decoder::new(16, 11, 4, 0x13).unwrap();
//!
//! let mut block = [0, 0, 0, 0, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1];
//! encoder.encode(&mut block).unwrap();
//! assert_eq!(block, [12, 12, 3, 3, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1]);
//!
//! block[2] = 1;
//! block[8] = 1;
//! let outcome = decoder.decode(&mut block).unwrap();
//! assert_eq!(outcome, DecodeOutcome::Corrected { symbols: 2 });
//! assert_eq!(block, [12, 12, 3, 3, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1]);
//! ```

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod galois;
pub mod stream;

use std::io;

pub use config::{CodeConfig, MAX_FIELD_SIZE};
pub use decoder::{DecodeOutcome, Decoder};
pub use encoder::Encoder;
pub use galois::GaloisField;
pub use stream::{DecodeReader, EncodeWriter, StreamStats};

/// One field element. Valid values are `0..field_size`.
pub type Symbol = u16;

/// Errors returned by codec construction and block operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "invalid block parameters: {message_symbols} message + {parity_symbols} parity symbols \
         does not equal block size {block_size}"
    )]
    InvalidBlockParameters {
        block_size: usize,
        message_symbols: usize,
        parity_symbols: usize,
    },

    #[error("invalid parity symbol count: {0} (must be even and at least 2)")]
    InvalidParity(usize),

    #[error("message symbol count must be at least 1")]
    EmptyMessage,

    #[error(
        "unsupported field size: {0} (must be a power of two in 4..={max})",
        max = MAX_FIELD_SIZE
    )]
    UnsupportedFieldSize(usize),

    #[error("generator polynomial {gen_poly:#x} has the wrong degree for field size {field_size}")]
    InvalidGenerator { field_size: usize, gen_poly: u32 },

    #[error("block length mismatch: expected {expected} symbols, got {actual}")]
    BlockLength { expected: usize, actual: usize },

    #[error("symbol {value} at position {position} is not an element of GF({field_size})")]
    SymbolOutOfRange {
        position: usize,
        value: Symbol,
        field_size: usize,
    },

    #[error("field size {0} does not fit in a byte stream (max 256)")]
    SymbolTooWide(usize),

    #[error("truncated block: expected {expected} bytes, got {actual}")]
    TruncatedBlock { expected: usize, actual: usize },

    #[error("block {block} has more errors than the code can correct")]
    Uncorrectable { block: u64 },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(e) => e,
            Error::TruncatedBlock { .. } | Error::Uncorrectable { .. } => {
                io::Error::new(io::ErrorKind::InvalidData, err)
            }
            other => io::Error::new(io::ErrorKind::InvalidInput, other),
        }
    }
}

/// Length and range check shared by encode and decode. Runs before any
/// mutation so a rejected block is left untouched.
pub(crate) fn check_block(block: &[Symbol], expected: usize, field_size: usize) -> Result<(), Error> {
    if block.len() != expected {
        return Err(Error::BlockLength {
            expected,
            actual: block.len(),
        });
    }
    if let Some((position, &value)) = block
        .iter()
        .enumerate()
        .find(|&(_, &v)| v as usize >= field_size)
    {
        return Err(Error::SymbolOutOfRange {
            position,
            value,
            field_size,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_block() {
        assert!(check_block(&[0, 15, 3], 3, 16).is_ok());
        assert!(matches!(
            check_block(&[0, 15], 3, 16),
            Err(Error::BlockLength {
                expected: 3,
                actual: 2
            })
        ));
        assert!(matches!(
            check_block(&[0, 16, 3], 3, 16),
            Err(Error::SymbolOutOfRange { position: 1, .. })
        ));
    }

    #[test]
    fn test_io_error_kinds() {
        let err: io::Error = Error::TruncatedBlock {
            expected: 15,
            actual: 4,
        }
        .into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        let err: io::Error = Error::BlockLength {
            expected: 15,
            actual: 4,
        }
        .into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        let err: io::Error = Error::Io(io::Error::new(io::ErrorKind::BrokenPipe, "gone")).into();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_error_messages() {
        let err = Error::InvalidBlockParameters {
            block_size: 15,
            message_symbols: 10,
            parity_symbols: 4,
        };
        assert_eq!(
            err.to_string(),
            "invalid block parameters: 10 message + 4 parity symbols does not equal block size 15"
        );
        assert_eq!(
            Error::UnsupportedFieldSize(12).to_string(),
            "unsupported field size: 12 (must be a power of two in 4..=4096)"
        );
    }
}
