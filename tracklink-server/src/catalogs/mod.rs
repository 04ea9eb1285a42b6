//! Catalog adapters
//!
//! One adapter per external streaming catalog, each normalizing its native
//! API shapes into the canonical [`Track`]/[`Playlist`] model. Adapters are
//! polymorphic over the capability set {fetch by id, fetch playlist, search,
//! create playlist} so the resolvers never care which catalog they talk to.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use tracklink_common::models::{Catalog, Playlist, Track};
use tracklink_common::{Error, Result};

pub mod deezer;
pub mod spotify;

pub use deezer::DeezerClient;
pub use spotify::SpotifyClient;

/// Outbound HTTP timeout; the upstream catalogs answer well inside this
pub(crate) const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Capability set every catalog adapter implements
#[async_trait]
pub trait CatalogAdapter: Send + Sync {
    /// The catalog this adapter fronts
    fn catalog(&self) -> Catalog;

    /// Read a single track by its catalog-native id
    async fn fetch_track(&self, id: &str) -> Result<Track>;

    /// Read a playlist (with its track collection) by id
    async fn fetch_playlist(&self, id: &str) -> Result<Playlist>;

    /// Free-text search; first hit only, `Err(NotFound)` on zero results
    async fn search_track(&self, title: &str, artist: &str) -> Result<Track>;

    /// Create a playlist on the user's account and fill it with tracks
    async fn create_playlist(
        &self,
        user_id: &str,
        token: &str,
        title: &str,
        track_ids: &[String],
    ) -> Result<()>;
}

/// Strip a trailing `"(feat…"` annotation from a title.
///
/// Featured-artist parentheticals are catalog-idiomatic and hurt recall when
/// the title is searched on the sibling catalog.
pub fn clean_title(title: &str) -> &str {
    match title.find("(feat") {
        Some(index) => title[..index].trim_end(),
        None => title,
    }
}

/// Structured search query both catalogs understand:
/// `track:"<title>" artist:"<artist>"`
pub(crate) fn search_query(title: &str, artist: &str) -> String {
    format!("track:\"{}\" artist:\"{}\"", clean_title(title), artist)
}

/// Bounded retry for idempotent GET lookups.
///
/// Retries transport failures only (never NotFound/Unauthorized, never
/// writes), with a doubling delay. Mutating calls must not be routed here.
pub(crate) async fn get_with_retry<T, F, Fut>(mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    const MAX_RETRIES: u32 = 2;
    let mut delay = Duration::from_millis(250);
    let mut attempt = 0;

    loop {
        match op().await {
            Err(Error::Transport(err)) if attempt < MAX_RETRIES => {
                attempt += 1;
                tracing::debug!(attempt, error = %err, "transport failure, retrying lookup");
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            other => return other,
        }
    }
}

/// Shared reqwest client construction with the outbound timeout applied
pub(crate) fn build_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("tracklink/", env!("CARGO_PKG_VERSION")))
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| Error::Internal(format!("failed to build HTTP client: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_title_strips_feat_suffix() {
        assert_eq!(
            clean_title("I Got A Feeling (feat. Example Artist)"),
            "I Got A Feeling"
        );
        assert_eq!(clean_title("Plain Song"), "Plain Song");
        assert_eq!(clean_title("(feat. X) weird"), "");
    }

    #[test]
    fn search_query_shape() {
        assert_eq!(
            search_query("Song (feat. Guest)", "Artist"),
            "track:\"Song\" artist:\"Artist\""
        );
    }

    #[tokio::test]
    async fn retry_gives_up_on_not_found_immediately() {
        let mut calls = 0;
        let result: Result<()> = get_with_retry(|| {
            calls += 1;
            async { Err(Error::NotFound) }
        })
        .await;
        assert!(matches!(result, Err(Error::NotFound)));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn retry_passes_success_through() {
        let result = get_with_retry(|| async { Ok(41 + 1) }).await;
        assert_eq!(result.unwrap(), 42);
    }
}
