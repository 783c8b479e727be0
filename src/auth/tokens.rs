//! Session-token and API-key material.
//!
//! A token is 32 random bytes carried as URL-safe base64 without padding.
//! Only the URL-safe base64 of the SHA-256 of those bytes is ever stored;
//! lookups re-derive that hash from the presented token, so the plaintext
//! never reaches the database.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;
use sha2::{Digest, Sha256};

/// Random bytes backing a token.
pub const TOKEN_ENTROPY: usize = 32;

pub struct MintedToken {
    /// Transport form, handed to the client exactly once.
    pub plaintext: String,
    /// Persisted form.
    pub hash: String,
}

/// Mint a fresh token together with its storable hash.
#[must_use]
pub fn mint() -> MintedToken {
    let mut rng = rand::rng();
    let raw: [u8; TOKEN_ENTROPY] = rng.random();

    MintedToken {
        plaintext: URL_SAFE_NO_PAD.encode(raw),
        hash: URL_SAFE_NO_PAD.encode(Sha256::digest(raw)),
    }
}

/// Re-derive the persisted hash from a presented token. `None` for anything
/// that does not decode back to exactly [`TOKEN_ENTROPY`] bytes.
#[must_use]
pub fn hash_presented(token_b64: &str) -> Option<String> {
    let raw = URL_SAFE_NO_PAD.decode(token_b64).ok()?;
    if raw.len() != TOKEN_ENTROPY {
        return None;
    }
    Some(URL_SAFE_NO_PAD.encode(Sha256::digest(&raw)))
}
