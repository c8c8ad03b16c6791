//! Property tests for field algebra, polynomial helpers and the codec.

use std::sync::{Arc, OnceLock};

use quickcheck::{quickcheck, TestResult};
use rs_gf::{CodeConfig, DecodeOutcome, Decoder, Encoder, GaloisField, Symbol};

fn gf256() -> &'static Arc<GaloisField> {
    static GF: OnceLock<Arc<GaloisField>> = OnceLock::new();
    GF.get_or_init(|| Arc::new(GaloisField::new(256, 0x11d).unwrap()))
}

fn gf16() -> &'static Arc<GaloisField> {
    static GF: OnceLock<Arc<GaloisField>> = OnceLock::new();
    GF.get_or_init(|| Arc::new(GaloisField::new(16, 0x13).unwrap()))
}

fn poly(coeffs: &[u8]) -> Vec<Symbol> {
    coeffs.iter().map(|&c| c as Symbol).collect()
}

/// Encode `payload` (cycled over the message positions) and return the block.
fn codeword(encoder: &mut Encoder, payload: &[u8]) -> Vec<Symbol> {
    let size = encoder.field().size();
    let parity = encoder.parity_size();
    let mut block = vec![0; encoder.block_size()];
    if !payload.is_empty() {
        for (dst, &b) in block[parity..].iter_mut().zip(payload.iter().cycle()) {
            *dst = (b as usize % size) as Symbol;
        }
    }
    encoder.encode(&mut block).unwrap();
    block
}

/// Apply at most `limit` corruptions at distinct positions.
fn apply_errors(block: &mut [Symbol], errors: &[(u16, u8)], limit: usize, field_size: usize) -> usize {
    let mut used: Vec<usize> = Vec::new();
    for &(pos, delta) in errors {
        if used.len() == limit {
            break;
        }
        let pos = pos as usize % block.len();
        let delta = (delta as usize % (field_size - 1) + 1) as Symbol;
        if used.contains(&pos) {
            continue;
        }
        block[pos] ^= delta;
        used.push(pos);
    }
    used.len()
}

quickcheck! {
    fn prop_mul_commutative(a: u8, b: u8) -> bool {
        let gf = gf256();
        let (a, b) = (a as Symbol, b as Symbol);
        gf.multiply(a, b) == gf.multiply(b, a)
    }

    fn prop_mul_associative(a: u8, b: u8, c: u8) -> bool {
        let gf = gf256();
        let (a, b, c) = (a as Symbol, b as Symbol, c as Symbol);
        gf.multiply(a, gf.multiply(b, c)) == gf.multiply(gf.multiply(a, b), c)
    }

    fn prop_mul_distributes_over_xor(a: u8, b: u8, c: u8) -> bool {
        let gf = gf256();
        let (a, b, c) = (a as Symbol, b as Symbol, c as Symbol);
        gf.multiply(a, b ^ c) == gf.multiply(a, b) ^ gf.multiply(a, c)
    }

    fn prop_zero_absorbs(a: u8) -> bool {
        let gf = gf256();
        gf.multiply(a as Symbol, 0) == 0 && gf.multiply(0, a as Symbol) == 0
    }

    fn prop_inverse(a: u8) -> TestResult {
        if a == 0 {
            return TestResult::discard();
        }
        let gf = gf256();
        let a = a as Symbol;
        TestResult::from_bool(gf.multiply(a, gf.inverse(a)) == 1 && gf.divide(a, a) == 1)
    }

    fn prop_divide_undoes_multiply(a: u8, b: u8) -> TestResult {
        if b == 0 {
            return TestResult::discard();
        }
        let gf = gf256();
        let (a, b) = (a as Symbol, b as Symbol);
        TestResult::from_bool(gf.divide(gf.multiply(a, b), b) == a)
    }

    fn prop_poly_mult_commutative(left: Vec<u8>, right: Vec<u8>) -> bool {
        let gf = gf256();
        let (left, right) = (poly(&left), poly(&right));
        gf.poly_mult(&left, &right) == gf.poly_mult(&right, &left)
    }

    fn prop_poly_eval_constant(c: u8, x: u8) -> bool {
        gf256().poly_eval(&[c as Symbol], x as Symbol) == c as Symbol
    }

    fn prop_poly_eval_of_product(left: Vec<u8>, right: Vec<u8>, x: u8) -> bool {
        let gf = gf256();
        let (left, right, x) = (poly(&left), poly(&right), x as Symbol);
        let product = gf.poly_mult(&left, &right);
        gf.poly_eval(&product, x) == gf.multiply(gf.poly_eval(&left, x), gf.poly_eval(&right, x))
    }

    fn prop_clean_decode_is_identity(payload: Vec<u8>) -> bool {
        let mut encoder = Encoder::with_field(Arc::clone(gf256()), 239, 16).unwrap();
        let mut decoder = Decoder::with_field(Arc::clone(gf256()), 239, 16).unwrap();
        let clean = codeword(&mut encoder, &payload);
        let mut block = clean.clone();
        decoder.decode(&mut block).unwrap() == DecodeOutcome::Unchanged && block == clean
    }

    fn prop_round_trip_gf256(payload: Vec<u8>, errors: Vec<(u16, u8)>) -> bool {
        let mut encoder = Encoder::with_field(Arc::clone(gf256()), 239, 16).unwrap();
        let mut decoder = Decoder::with_field(Arc::clone(gf256()), 239, 16).unwrap();
        let clean = codeword(&mut encoder, &payload);

        let mut block = clean.clone();
        let injected = apply_errors(&mut block, &errors, 8, 256);
        let outcome = decoder.decode(&mut block).unwrap();

        let expected = match injected {
            0 => DecodeOutcome::Unchanged,
            n => DecodeOutcome::Corrected { symbols: n },
        };
        block == clean && outcome == expected
    }

    fn prop_round_trip_gf16(payload: Vec<u8>, errors: Vec<(u16, u8)>) -> bool {
        let mut encoder = Encoder::with_field(Arc::clone(gf16()), 11, 4).unwrap();
        let mut decoder = Decoder::with_field(Arc::clone(gf16()), 11, 4).unwrap();
        let clean = codeword(&mut encoder, &payload);

        let mut block = clean.clone();
        apply_errors(&mut block, &errors, 2, 16);
        decoder.decode(&mut block).unwrap();
        block == clean
    }

    fn prop_minimum_parity_round_trip(payload: Vec<u8>, pos: u16, delta: u8) -> bool {
        let mut encoder = Encoder::with_field(Arc::clone(gf16()), 13, 2).unwrap();
        let mut decoder = Decoder::with_field(Arc::clone(gf16()), 13, 2).unwrap();
        let clean = codeword(&mut encoder, &payload);

        let mut block = clean.clone();
        apply_errors(&mut block, &[(pos, delta)], 1, 16);
        decoder.decode(&mut block).unwrap();
        block == clean
    }
}

#[test]
fn test_fields_are_permutations() {
    for config in [
        CodeConfig::RS_15_11,
        CodeConfig::RS_255_239,
        CodeConfig::RS_2047_2031,
    ] {
        let gf = GaloisField::new(config.field_size, config.field_gen_poly).unwrap();
        assert!(gf.is_valid(), "{config:?}");

        let mut sorted = gf.elements().to_vec();
        sorted.sort_unstable();
        let expected: Vec<Symbol> = (0..config.field_size as Symbol).collect();
        assert_eq!(sorted, expected);
    }
}

#[test]
fn test_generator_roots() {
    for parity in [2, 4, 8, 16, 32] {
        let encoder = Encoder::with_field(Arc::clone(gf256()), 255 - parity, parity).unwrap();
        let g = encoder.generator_poly();
        assert_eq!(g.len(), parity + 1);
        assert_eq!(g[parity], 1);
        for i in 0..parity {
            assert_eq!(gf256().poly_eval(g, gf256().alpha_pow(i)), 0, "parity {parity} root {i}");
        }
        // α^parity is not a root.
        assert_ne!(gf256().poly_eval(g, gf256().alpha_pow(parity)), 0);
    }
}
