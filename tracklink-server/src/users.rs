//! Stored-user lookup and platform-token sealing
//!
//! The account system proper (signup, OAuth exchange, profile CRUD) lives
//! elsewhere; this module only reads what playlist creation needs: the
//! user's row and their sealed platform token. Tokens rest as
//! base64(nonce || AES-256-GCM ciphertext).

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use sqlx::SqlitePool;

use tracklink_common::models::Catalog;
use tracklink_common::{Error, Result};

/// 96-bit nonce prepended to every sealed token
const NONCE_LEN: usize = 12;

/// Minimal stored-user row
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub platform_id: String,
    pub catalog: Catalog,
    /// base64(nonce || ciphertext)
    pub sealed_token: String,
}

/// Look a user up by their catalog-native id
pub async fn find_by_platform_id(db: &SqlitePool, platform_id: &str) -> Result<Option<StoredUser>> {
    let row: Option<(String, String, String)> =
        sqlx::query_as("SELECT platform_id, platform, token FROM users WHERE platform_id = ?")
            .bind(platform_id)
            .fetch_optional(db)
            .await?;

    row.map(|(platform_id, platform, sealed_token)| {
        Ok(StoredUser {
            platform_id,
            catalog: platform.parse()?,
            sealed_token,
        })
    })
    .transpose()
}

/// Seal a platform token for storage
pub fn seal(token: &str, key: &[u8; 32]) -> Result<String> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, token.as_bytes())
        .map_err(|_| Error::Internal("token sealing failed".to_string()))?;

    let mut sealed = nonce.to_vec();
    sealed.extend_from_slice(&ciphertext);
    Ok(BASE64.encode(sealed))
}

/// Recover the plaintext platform token from its sealed form
pub fn unseal(sealed: &str, key: &[u8; 32]) -> Result<String> {
    let bytes = BASE64
        .decode(sealed)
        .map_err(|_| Error::InvalidInput("sealed token is not valid base64".to_string()))?;

    if bytes.len() < NONCE_LEN {
        return Err(Error::InvalidInput("sealed token too short".to_string()));
    }
    let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| Error::Unauthorized("sealed token failed authentication".to_string()))?;

    String::from_utf8(plaintext)
        .map_err(|_| Error::InvalidInput("sealed token is not utf-8".to_string()))
}
