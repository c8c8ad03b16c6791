//! Table-driven arithmetic over GF(2^m) for an arbitrary generator polynomial.
//!
//! Elements are `Symbol`s in `0..size`. The multiplicative group is enumerated
//! by repeated doubling with reduction by the generator polynomial, and every
//! product is precomputed into a `size * size` table at construction.
//!
//! ```text
//! field[0] = 0
//! field[i] = α^(i-1)            for i in 1..size
//! log[field[i]] = i - 1
//! a * b = field[(log a + log b) mod (size - 1) + 1]
//! ```

use std::fmt;

use crate::config::validate_field;
use crate::{Error, Symbol};

/// Logarithm slot for 0, which has no logarithm. Never used in arithmetic.
const LOG_ZERO: u16 = u16::MAX;

/// GF(2^m) with precomputed exponent, logarithm, inverse and product tables.
///
/// Immutable after construction; share it behind an `Arc` between any number
/// of encoders and decoders.
pub struct GaloisField {
    size: usize,
    gen_poly: u32,
    field: Vec<Symbol>,
    logarithms: Vec<u16>,
    inverses: Vec<Symbol>,
    mult_table: Vec<Symbol>,
}

impl fmt::Debug for GaloisField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GaloisField")
            .field("size", &self.size)
            .field("gen_poly", &format_args!("{:#x}", self.gen_poly))
            .finish_non_exhaustive()
    }
}

impl GaloisField {
    /// Build the field of `size` elements reduced by `gen_poly`.
    ///
    /// `size` must be a power of two in `4..=MAX_FIELD_SIZE` and `gen_poly`
    /// must have degree `log2(size)`. Whether it is primitive is not checked:
    /// use [`GaloisField::is_valid`] when the polynomial is not known-good.
    pub fn new(size: usize, gen_poly: u32) -> Result<Self, Error> {
        validate_field(size, gen_poly)?;

        let mut gf = Self {
            size,
            gen_poly,
            field: vec![0; size],
            logarithms: vec![0; size],
            inverses: vec![0; size],
            mult_table: Vec::new(),
        };
        gf.build_field();
        gf.build_logarithms();
        gf.build_inverses();
        gf.build_mult_table();
        Ok(gf)
    }

    fn build_field(&mut self) {
        let size = self.size as u32;
        self.field[0] = 0;
        self.field[1] = 1;

        let mut last = 1u32;
        for i in 2..self.size {
            let mut next = last << 1;
            if next >= size {
                next ^= self.gen_poly;
            }
            self.field[i] = next as Symbol;
            last = next;
        }
    }

    fn build_logarithms(&mut self) {
        for (i, &value) in self.field.iter().enumerate() {
            self.logarithms[value as usize] = if i == 0 { LOG_ZERO } else { (i - 1) as u16 };
        }
    }

    // Computed from logarithms; the product table does not exist yet.
    fn build_inverses(&mut self) {
        self.inverses[0] = 0;
        for i in 1..self.size {
            let value = self.field[i];
            // Only a non-primitive generator can cycle back to 0.
            if value != 0 {
                self.inverses[value as usize] = self.log_divide(1, value);
            }
        }
    }

    fn build_mult_table(&mut self) {
        let size = self.size;
        let mut table = vec![0; size * size];
        for left in 0..size {
            for right in 0..size {
                table[left * size + right] = self.log_multiply(left as Symbol, right as Symbol);
            }
        }
        self.mult_table = table;
    }

    #[inline]
    fn log_multiply(&self, left: Symbol, right: Symbol) -> Symbol {
        if left == 0 || right == 0 {
            return 0;
        }
        let exp = (self.log_of(left) + self.log_of(right)) % self.order();
        self.field[exp + 1]
    }

    #[inline]
    fn log_divide(&self, dividend: Symbol, divisor: Symbol) -> Symbol {
        if dividend == 0 {
            return 0;
        }
        let order = self.order();
        let exp = (self.log_of(dividend) + order - self.log_of(divisor)) % order;
        self.field[exp + 1]
    }

    /// Logarithm of a nonzero element.
    #[inline]
    fn log_of(&self, value: Symbol) -> usize {
        debug_assert!(value != 0, "logarithm of zero");
        self.logarithms[value as usize] as usize
    }

    /// Field cardinality (2^m).
    pub fn size(&self) -> usize {
        self.size
    }

    /// The reduction polynomial this field was built with.
    pub fn generator_poly(&self) -> u32 {
        self.gen_poly
    }

    /// Order of the multiplicative group: `size - 1`.
    #[inline]
    pub fn order(&self) -> usize {
        self.size - 1
    }

    /// The element sequence: `0, α^0, α^1, ..., α^(size-2)`.
    pub fn elements(&self) -> &[Symbol] {
        &self.field
    }

    /// α^`power`, with `power` taken modulo the group order.
    #[inline]
    pub fn alpha_pow(&self, power: usize) -> Symbol {
        self.field[power % self.order() + 1]
    }

    /// Discrete logarithm base α, or `None` for 0.
    pub fn logarithm(&self, value: Symbol) -> Option<usize> {
        match value {
            0 => None,
            v => self.logarithms.get(v as usize).map(|&l| l as usize),
        }
    }

    /// Multiplicative inverse; 0 maps to 0.
    ///
    /// `value` must be a field element (`< size`). Larger values panic.
    #[inline]
    pub fn inverse(&self, value: Symbol) -> Symbol {
        self.inverses[value as usize]
    }

    /// Table lookup of `left * right`.
    ///
    /// Both operands must be field elements (`< size`); this is checked in
    /// debug builds only. Release builds panic or return an unrelated
    /// product for out-of-range operands. Blocks passed to the encoder and
    /// decoder are range-checked before any arithmetic.
    #[inline]
    pub fn multiply(&self, left: Symbol, right: Symbol) -> Symbol {
        debug_assert!(
            (left as usize) < self.size && (right as usize) < self.size,
            "operand outside GF({})",
            self.size
        );
        self.mult_table[left as usize * self.size + right as usize]
    }

    /// `dividend / divisor`, with the same operand range as
    /// [`multiply`](GaloisField::multiply). Dividing by 0 is a caller error:
    /// debug builds assert, release builds yield 0.
    #[inline]
    pub fn divide(&self, dividend: Symbol, divisor: Symbol) -> Symbol {
        debug_assert!(divisor != 0, "division by zero in GF({})", self.size);
        self.multiply(dividend, self.inverses[divisor as usize])
    }

    /// Product of two polynomials, coefficients in ascending degree order.
    pub fn poly_mult(&self, left: &[Symbol], right: &[Symbol]) -> Vec<Symbol> {
        if left.is_empty() || right.is_empty() {
            return Vec::new();
        }
        let mut result = vec![0; left.len() + right.len() - 1];
        for (i, &l) in left.iter().enumerate() {
            if l == 0 {
                continue;
            }
            for (j, &r) in right.iter().enumerate() {
                result[i + j] ^= self.multiply(l, r);
            }
        }
        result
    }

    /// Evaluate `poly` (ascending degree) at `x`.
    ///
    /// Powers of `x` come from its logarithm rather than repeated products,
    /// so zero coefficients are skipped.
    pub fn poly_eval(&self, poly: &[Symbol], x: Symbol) -> Symbol {
        let Some((&constant, rest)) = poly.split_first() else {
            return 0;
        };
        if x == 0 {
            return constant;
        }

        let order = self.order();
        let x_log = self.log_of(x);
        let mut sum = constant;
        for (i, &coeff) in rest.iter().enumerate() {
            if coeff == 0 {
                continue;
            }
            let power = (self.log_of(coeff) + x_log * (i + 1)) % order;
            sum ^= self.field[power + 1];
        }
        sum
    }

    /// True when the element sequence is a permutation of `0..size`, i.e. the
    /// generator polynomial is primitive.
    pub fn is_valid(&self) -> bool {
        let mut seen = vec![false; self.size];
        for &value in &self.field {
            let slot = &mut seen[value as usize];
            if *slot {
                return false;
            }
            *slot = true;
        }
        true
    }
}
