//! Decoder: corrects up to `parity / 2` symbol errors per block in place.
//!
//! ```text
//! block -> syndromes S_i = r(α^i)           i in 0..p
//!       -> λ(x)  Berlekamp-Massey
//!       -> λ'(x) formal derivative
//!       -> Ω(x)  S(x)·λ(x) mod x^p
//!       -> Chien search over every position, Forney magnitude at each root
//! ```
//!
//! Beyond the correction radius the pipeline still produces a locator and
//! applies it; a second syndrome pass reports that as
//! [`DecodeOutcome::PossiblyUncorrectable`] instead of failing.

use std::sync::Arc;

use crate::config::CodeConfig;
use crate::galois::GaloisField;
use crate::{check_block, Error, Symbol};

/// What `decode` did to a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// Every syndrome was zero; the block was left as is.
    Unchanged,
    /// Errors were repaired and the block is a valid codeword again.
    Corrected { symbols: usize },
    /// The block was altered but is still not a codeword: more errors than
    /// the code can correct. Its content is unreliable.
    PossiblyUncorrectable,
}

impl DecodeOutcome {
    pub fn is_uncorrectable(&self) -> bool {
        matches!(self, DecodeOutcome::PossiblyUncorrectable)
    }
}

/// Reed-Solomon decoder for one code configuration.
///
/// All scratch polynomials are sized at construction and overwritten on
/// every call, so `decode` takes `&mut self` and never allocates.
#[derive(Debug, Clone)]
pub struct Decoder {
    gf: Arc<GaloisField>,
    config: CodeConfig,
    syndromes: Vec<Symbol>,
    lambda: Vec<Symbol>,
    corr_poly: Vec<Symbol>,
    lambda_star: Vec<Symbol>,
    lambda_prime: Vec<Symbol>,
    omega: Vec<Symbol>,
    /// λ evaluated at each position's inverse; zero marks an error.
    error_indexes: Vec<Symbol>,
    /// Inverse of the field element for each block position.
    chien_cache: Vec<Symbol>,
}

impl Decoder {
    /// Build a decoder together with its own field tables.
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

    /// Build a decoder over an existing field, sharing its tables.
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
        let parity = config.parity_symbols;
        let block_size = config.block_size();

        let chien_cache = (0..block_size)
            .map(|i| gf.inverse(gf.elements()[i + 1]))
            .collect();

        Self {
            syndromes: vec![0; parity],
            lambda: vec![0; parity + 1],
            corr_poly: vec![0; parity + 1],
            lambda_star: vec![0; parity + 1],
            lambda_prime: vec![0; parity],
            omega: vec![0; parity],
            error_indexes: vec![0; block_size],
            chien_cache,
            gf,
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

    /// Syndromes of the last decoded (or checked) block.
    pub fn syndromes(&self) -> &[Symbol] {
        &self.syndromes
    }

    /// Repair `block` in place.
    ///
    /// Rejected blocks (wrong length, symbol outside the field) are left
    /// untouched.
    pub fn decode(&mut self, block: &mut [Symbol]) -> Result<DecodeOutcome, Error> {
        check_block(block, self.block_size(), self.gf.size())?;

        if !self.calc_syndromes(block) {
            return Ok(DecodeOutcome::Unchanged);
        }

        self.calc_lambda();
        self.calc_lambda_prime();
        self.calc_omega();
        self.chien_search();
        let repaired = self.repair_errors(block);

        if self.calc_syndromes(block) {
            Ok(DecodeOutcome::PossiblyUncorrectable)
        } else {
            Ok(DecodeOutcome::Corrected { symbols: repaired })
        }
    }

    /// True if `block` is a codeword. Does not modify it.
    pub fn is_codeword(&mut self, block: &[Symbol]) -> Result<bool, Error> {
        check_block(block, self.block_size(), self.gf.size())?;
        Ok(!self.calc_syndromes(block))
    }

    /// Horner evaluation of the block at α^i for each check equation.
    /// Returns whether any syndrome is nonzero.
    fn calc_syndromes(&mut self, block: &[Symbol]) -> bool {
        let gf = &*self.gf;
        let mut any = false;

        for (i, syndrome) in self.syndromes.iter_mut().enumerate() {
            let root = gf.alpha_pow(i);
            let mut s = 0;
            for &coeff in block[1..].iter().rev() {
                s = gf.multiply(s ^ coeff, root);
            }
            *syndrome = s ^ block[0];
            any |= *syndrome != 0;
        }
        any
    }

    /// Berlekamp-Massey: error locator λ(x) from the syndromes.
    fn calc_lambda(&mut self) {
        let gf = &*self.gf;
        let parity = self.config.parity_symbols;
        let syndromes = &self.syndromes;
        let lambda = &mut self.lambda;
        let corr = &mut self.corr_poly;
        let lambda_star = &mut self.lambda_star;

        lambda.fill(0);
        corr.fill(0);
        lambda[0] = 1;
        corr[1] = 1;

        let mut l = 0;
        for k in 1..=parity {
            let mut e = syndromes[k - 1];
            for i in 1..=l {
                e ^= gf.multiply(lambda[i], syndromes[k - 1 - i]);
            }

            if e != 0 {
                for ((star, &lam), &c) in lambda_star.iter_mut().zip(lambda.iter()).zip(corr.iter()) {
                    *star = lam ^ gf.multiply(e, c);
                }

                if 2 * l < k {
                    l = k - l;
                    let e_inv = gf.inverse(e);
                    for (c, &lam) in corr.iter_mut().zip(lambda.iter()) {
                        *c = gf.multiply(lam, e_inv);
                    }
                }
            }

            // C(x) <- x·C(x)
            let top = corr.len() - 1;
            corr.copy_within(..top, 1);
            corr[0] = 0;

            if e != 0 {
                lambda.copy_from_slice(lambda_star);
            }
        }
    }

    /// Characteristic 2: only odd-degree terms of λ survive differentiation.
    fn calc_lambda_prime(&mut self) {
        for (i, coeff) in self.lambda_prime.iter_mut().enumerate() {
            *coeff = if i & 1 == 0 { self.lambda[i + 1] } else { 0 };
        }
    }

    fn calc_omega(&mut self) {
        let gf = &*self.gf;
        for i in 0..self.omega.len() {
            let mut coeff = self.syndromes[i];
            for j in 1..=i {
                coeff ^= gf.multiply(self.syndromes[i - j], self.lambda[j]);
            }
            self.omega[i] = coeff;
        }
    }

    fn chien_search(&mut self) {
        let gf = &*self.gf;
        for (eval, &x_inv) in self.error_indexes.iter_mut().zip(self.chien_cache.iter()) {
            *eval = gf.poly_eval(&self.lambda, x_inv);
        }
    }

    /// Forney's formula at every root of λ. Returns how many symbols changed.
    fn repair_errors(&self, block: &mut [Symbol]) -> usize {
        let gf = &*self.gf;
        let mut repaired = 0;

        for (i, symbol) in block.iter_mut().enumerate() {
            if self.error_indexes[i] != 0 {
                continue;
            }
            let x = gf.elements()[i + 1];
            let x_inv = self.chien_cache[i];

            let top = gf.multiply(gf.poly_eval(&self.omega, x_inv), x);
            let bottom = gf.poly_eval(&self.lambda_prime, x_inv);
            if bottom == 0 {
                // Repeated root: no magnitude exists, the block is beyond repair.
                continue;
            }

            let magnitude = gf.divide(top, bottom);
            if magnitude != 0 {
                *symbol ^= magnitude;
                repaired += 1;
            }
        }
        repaired
    }
}
