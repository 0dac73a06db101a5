use async_trait::async_trait;
use minimovies_model::UserId;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// The auth collaborator: maps a bearer token to the signed-in user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionAuthenticator: Send + Sync {
    /// `Ok(None)` for unknown or expired tokens.
    async fn resolve(&self, token: &str) -> Result<Option<UserId>>;
}

/// Tokens are only ever stored and compared as lowercase SHA-256 hex.
pub fn hash_session_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_hash_is_stable_hex() {
        let hash = hash_session_token("abc");
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_ne!(hash_session_token("abd"), hash);
    }
}
