//! Code parameters: field size, message/parity split and field generator.

use crate::Error;

/// Largest field the table-driven engine accepts.
///
/// The multiplication table is `size * size` symbols, so 4096 already costs
/// 32 MiB. Byte-oriented fields (size <= 256) are the intended use.
pub const MAX_FIELD_SIZE: usize = 1 << 12;

/// Smallest field with room for two parity symbols and one message symbol.
pub const MIN_FIELD_SIZE: usize = 4;

/// Parameters of one Reed-Solomon code over GF(2^m).
///
/// `field_size - 1` is the block length; the first `parity_symbols` symbols
/// of every block are parity, the remaining `message_symbols` are payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodeConfig {
    /// Field cardinality, a power of two (2^m).
    pub field_size: usize,
    /// Payload symbols per block (k).
    pub message_symbols: usize,
    /// Parity symbols per block (n - k). Even, at least 2.
    pub parity_symbols: usize,
    /// Bit pattern of a primitive polynomial of degree m over GF(2).
    pub field_gen_poly: u32,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self::RS_15_11
    }
}

impl CodeConfig {
    /// RS(15,11) over GF(16), x^4 + x + 1. Corrects 2 symbols per block.
    pub const RS_15_11: Self = Self::new(16, 11, 4, 0x13);

    /// RS(255,251) over GF(256), x^8 + x^4 + x^3 + x^2 + 1.
    pub const RS_255_251: Self = Self::new(256, 251, 4, 0x11d);

    /// RS(255,239) over GF(256). Corrects 8 symbols per block.
    pub const RS_255_239: Self = Self::new(256, 239, 16, 0x11d);

    /// RS(2047,2031) over GF(2048), x^11 + x^5 + x^3 + x + 1.
    pub const RS_2047_2031: Self = Self::new(2048, 2031, 16, 0x82b);

    pub const fn new(
        field_size: usize,
        message_symbols: usize,
        parity_symbols: usize,
        field_gen_poly: u32,
    ) -> Self {
        Self {
            field_size,
            message_symbols,
            parity_symbols,
            field_gen_poly,
        }
    }

    /// Symbols per codeword: `field_size - 1`.
    pub fn block_size(&self) -> usize {
        self.field_size.saturating_sub(1)
    }

    /// Number of unknown symbol errors a block can recover from.
    pub fn correction_capacity(&self) -> usize {
        self.parity_symbols / 2
    }

    /// Check every construction-time constraint.
    ///
    /// Primitivity of `field_gen_poly` is not checked; a non-primitive
    /// polynomial of the right degree yields a malformed field silently.
    pub fn validate(&self) -> Result<(), Error> {
        validate_field(self.field_size, self.field_gen_poly)?;

        if self.message_symbols == 0 {
            return Err(Error::EmptyMessage);
        }
        if self.parity_symbols < 2 || self.parity_symbols % 2 != 0 {
            return Err(Error::InvalidParity(self.parity_symbols));
        }
        if self.block_size() != self.message_symbols + self.parity_symbols {
            return Err(Error::InvalidBlockParameters {
                block_size: self.block_size(),
                message_symbols: self.message_symbols,
                parity_symbols: self.parity_symbols,
            });
        }
        Ok(())
    }
}

/// Range checks on the field itself: size and generator degree.
pub(crate) fn validate_field(field_size: usize, gen_poly: u32) -> Result<(), Error> {
    if !field_size.is_power_of_two() || !(MIN_FIELD_SIZE..=MAX_FIELD_SIZE).contains(&field_size) {
        return Err(Error::UnsupportedFieldSize(field_size));
    }
    // Degree m: bit m set and nothing above it.
    let size = field_size as u32;
    if gen_poly < size || gen_poly >= 2 * size {
        return Err(Error::InvalidGenerator {
            field_size,
            gen_poly,
        });
    }
    Ok(())
}
