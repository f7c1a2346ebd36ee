use rand::RngCore;

/// 256 bits from the OS RNG, hex-encoded. URL-safe and far past the point of
/// being guessable; uniqueness is still backed by the database constraint.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
