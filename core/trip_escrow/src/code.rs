//! Private trip codes.

use rand::Rng;

/// Uppercase letters and digits minus the look-alikes `0`, `O`, `1`, `I`.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const CODE_LENGTH: usize = 8;

/// How many times a generated code is replaced after colliding with an
/// existing one before the collision is reported.
pub const MAX_CODE_REGENERATIONS: usize = 3;

/// Draw a fresh [`CODE_LENGTH`]-character code from [`CODE_ALPHABET`].
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Canonical form of a caller-supplied code (and of code lookups).
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}
