use rand::Rng;

/// Uppercase letters and digits minus the easily confused I, O, 0 and 1.
pub const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const CODE_LEN: usize = 6;

/// Insert attempts before pair creation gives up on code collisions.
pub const MAX_CODE_ATTEMPTS: usize = 5;

pub fn generate_join_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Codes are typed by humans: ignore surrounding whitespace and case.
pub fn normalize_join_code(input: &str) -> String {
    input.trim().to_ascii_uppercase()
}
