//! Configuration loading
//!
//! All catalog endpoints and credentials come from the environment. The
//! public API bases have compiled defaults; credentials do not and fail fast
//! at startup. `.env` loading (dotenvy) happens in `main` before this runs.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::{Error, Result};

/// Spotify endpoint and app credential set
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub api_base: String,
    pub auth_base: String,
    pub client_id: String,
    pub client_secret: String,
}

/// Deezer endpoint and app credential set
#[derive(Debug, Clone)]
pub struct DeezerConfig {
    pub api_base: String,
    pub app_id: String,
    pub app_secret: String,
}

/// Process-wide configuration, built once at startup and injected by
/// reference into every component. No global state.
#[derive(Debug, Clone)]
pub struct Config {
    pub spotify: SpotifyConfig,
    pub deezer: DeezerConfig,
    /// AES-256 key sealing stored platform tokens
    pub seal_key: [u8; 32],
}

impl Config {
    /// Read configuration from the environment.
    pub fn from_env() -> Result<Self> {
        let spotify = SpotifyConfig {
            api_base: var_or("SPOTIFY_API_BASE", "https://api.spotify.com"),
            auth_base: var_or("SPOTIFY_AUTH_BASE", "https://accounts.spotify.com"),
            client_id: var("SPOTIFY_CLIENT_ID")?,
            client_secret: var("SPOTIFY_CLIENT_SECRET")?,
        };

        let deezer = DeezerConfig {
            api_base: var_or("DEEZER_API_BASE", "https://api.deezer.com"),
            app_id: var("DEEZER_APP_ID")?,
            app_secret: var("DEEZER_APP_SECRET")?,
        };

        let seal_key = decode_seal_key(&var("TOKEN_SEAL_KEY")?)?;

        Ok(Config {
            spotify,
            deezer,
            seal_key,
        })
    }
}

fn var(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| Error::Config(format!("{name} is not set")))
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Decode the base64 token-sealing key and check its length
fn decode_seal_key(encoded: &str) -> Result<[u8; 32]> {
    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|e| Error::Config(format!("TOKEN_SEAL_KEY is not valid base64: {e}")))?;

    bytes
        .try_into()
        .map_err(|_| Error::Config("TOKEN_SEAL_KEY must decode to exactly 32 bytes".to_string()))
}
