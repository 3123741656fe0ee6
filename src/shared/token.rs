use rand::{rngs::OsRng, RngCore};

/// Number of random bytes behind each lease token.
pub const LEASE_TOKEN_BYTES: usize = 32;

/// Generate a new lease token (32 random bytes = 64 hex characters).
///
/// Drawn from the OS random source so tokens are unguessable by other clients.
pub fn generate_lease_token() -> String {
    let mut bytes = [0u8; LEASE_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Owner id used by clients that do not supply one.
pub fn generate_owner_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
