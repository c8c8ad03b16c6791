//! Systematic encoder: block → block with parity prefix.
//!
//! A block holds `parity_symbols` parity symbols followed by the payload.
//! Reading the block as a polynomial with `block[i]` the coefficient of x^i,
//! the parity is the remainder of payload·x^p divided by the code generator
//! g(x) = (x + α^0)(x + α^1)...(x + α^(p-1)), computed with a shift register.

use std::sync::Arc;

use crate::config::CodeConfig;
use crate::galois::GaloisField;
use crate::{check_block, Error, Symbol};

/// Reed-Solomon encoder for one code configuration.
///
/// Owns a scratch accumulator, so `encode` takes `&mut self`. Clone one
/// encoder per worker; clones share the field tables.
#[derive(Debug, Clone)]
pub struct Encoder {
    gf: Arc<GaloisField>,
    config: CodeConfig,
    code_gen_poly: Vec<Symbol>,
    modulus: Vec<Symbol>,
}

impl Encoder {
    /// Build an encoder together with its own field tables.
    pub fn new(
        field_size: usize,
        message_symbols: usize,
        parity_symbols: usize,
        field_gen_poly: u32,
    ) -> Result<Self, Error> {
        Self::from_config(CodeConfig::new(
            field_size,
            message_symbols,
            parity_symbols,
            field_gen_poly,
        ))
    }

    pub fn from_config(config: CodeConfig) -> Result<Self, Error> {
        config.validate()?;
        let gf = GaloisField::new(config.field_size, config.field_gen_poly)?;
        Ok(Self::build(Arc::new(gf), config))
    }

    /// Build an encoder over an existing field, sharing its tables.
    pub fn with_field(
        gf: Arc<GaloisField>,
        message_symbols: usize,
        parity_symbols: usize,
    ) -> Result<Self, Error> {
        let config = CodeConfig::new(
            gf.size(),
            message_symbols,
            parity_symbols,
            gf.generator_poly(),
        );
        config.validate()?;
        Ok(Self::build(gf, config))
    }

    fn build(gf: Arc<GaloisField>, config: CodeConfig) -> Self {
        let code_gen_poly = code_generator_poly(&gf, config.parity_symbols);
        Self {
            gf,
            modulus: vec![0; config.parity_symbols],
            code_gen_poly,
            config,
        }
    }

    pub fn config(&self) -> &CodeConfig {
        &self.config
    }

    pub fn field(&self) -> &Arc<GaloisField> {
        &self.gf
    }

    /// Symbols per block (`field_size - 1`).
    pub fn block_size(&self) -> usize {
        self.config.block_size()
    }

    /// Payload symbols per block.
    pub fn message_size(&self) -> usize {
        self.config.message_symbols
    }

    pub fn parity_size(&self) -> usize {
        self.config.parity_symbols
    }

    /// Coefficients of g(x), ascending degree; the last one is always 1.
    pub fn generator_poly(&self) -> &[Symbol] {
        &self.code_gen_poly
    }

    /// Compute parity for `block` in place.
    ///
    /// The payload must already sit in `block[parity_size..]`; the first
    /// `parity_size` symbols are overwritten. Nothing is touched when the
    /// block is rejected.
    pub fn encode(&mut self, block: &mut [Symbol]) -> Result<(), Error> {
        check_block(block, self.block_size(), self.gf.size())?;

        let gf = &*self.gf;
        let g = &self.code_gen_poly;
        let z = &mut self.modulus;
        let parity = z.len();
        let top = parity - 1;

        block[..parity].fill(0);
        z.fill(0);
        let mut z_0 = 0;

        for i in (parity + 1..block.len()).rev() {
            let r = z_0 ^ block[i];
            for (slot, &coeff) in z.iter_mut().zip(g.iter()) {
                *slot ^= gf.multiply(coeff, r);
            }
            z_0 = z[top];
            z.copy_within(..top, 1);
            z[0] = 0;
        }

        // Lowest payload coefficient: fold in without shifting.
        let r = z_0 ^ block[parity];
        for (i, (&slot, &coeff)) in z.iter().zip(g.iter()).enumerate() {
            block[i] = slot ^ gf.multiply(coeff, r);
        }
        Ok(())
    }
}

/// ∏ (x + α^i) for i in 0..parity, ascending degree.
fn code_generator_poly(gf: &GaloisField, parity: usize) -> Vec<Symbol> {
    (1..parity).fold(vec![gf.alpha_pow(0), 1], |poly, i| {
        gf.poly_mult(&poly, &[gf.alpha_pow(i), 1])
    })
}
