//! Interfaces of the external collaborators the authoring flow consumes.
//!
//! Implementations live outside this crate (see `tunedrop-remote`), except
//! for [`CanonicalWalletResolver`], which only normalizes an address string.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::bundle::PersistedBundleItem;
use crate::error::{CoreError, PersistenceError, UploadError};
use crate::form::{PersistedTrack, SubmissionPayload};
use crate::types::{Coordinates, FileHandle, RecordId, WalletAddress};

/// Minimum detector confidence for a detected BPM to be applied.
pub const MIN_BPM_CONFIDENCE: f64 = 0.5;

/// One autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSuggestion {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Output of a BPM detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BpmDetection {
    pub bpm: u32,
    pub confidence: f64,
}

/// Resolves an authenticated identity to its canonical wallet address.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, raw: &str) -> Result<WalletAddress, CoreError>;
}

/// Remote object storage for media bytes.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `data` and return its public URL.
    async fn upload(
        &self,
        bucket: &str,
        file: &FileHandle,
        data: Vec<u8>,
    ) -> Result<String, UploadError>;
}

/// The relational store holding submitted tracks.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Insert or replace a track in one logical write.
    async fn upsert(&self, payload: &SubmissionPayload) -> Result<RecordId, PersistenceError>;

    async fn load(&self, id: RecordId) -> Result<PersistedTrack, PersistenceError>;

    /// Child items of a bundle, in any order.
    async fn load_bundle_items(
        &self,
        parent_id: RecordId,
    ) -> Result<Vec<PersistedBundleItem>, PersistenceError>;
}

/// Ranked place suggestions for partial text.
#[async_trait]
pub trait LocationAutocomplete: Send + Sync {
    async fn suggest(&self, text: &str) -> Result<Vec<LocationSuggestion>, CoreError>;
}

/// Resolves free text to coordinates; `Ok(None)` when nothing matched.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, text: &str) -> Result<Option<Coordinates>, CoreError>;
}

/// Tempo detection on an audio file; `Ok(None)` when not detected.
#[async_trait]
pub trait BpmDetector: Send + Sync {
    async fn detect(&self, file: &FileHandle, data: &[u8]) -> Result<Option<BpmDetection>, CoreError>;
}

// ---------------------------------------------------------------------------
// Canonical wallet resolver
// ---------------------------------------------------------------------------

static WALLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-f]{1,64}$").expect("valid regex"));

/// Normalize a raw wallet string: trim, lower-case, require `0x` hex.
pub fn canonical_wallet(raw: &str) -> Result<WalletAddress, CoreError> {
    let lowered = raw.trim().to_ascii_lowercase();
    if !WALLET_RE.is_match(&lowered) {
        return Err(CoreError::Unauthorized(format!(
            "'{}' is not a valid wallet address",
            raw.trim()
        )));
    }
    Ok(WalletAddress::new_unchecked(lowered))
}

/// [`IdentityResolver`] that only canonicalizes the address syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalWalletResolver;

#[async_trait]
impl IdentityResolver for CanonicalWalletResolver {
    async fn resolve(&self, raw: &str) -> Result<WalletAddress, CoreError> {
        canonical_wallet(raw)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn wallets_are_lowercased() {
        let addr = canonical_wallet("  0xABCdef01  ").unwrap();
        assert_eq!(addr.as_str(), "0xabcdef01");
    }

    #[test]
    fn malformed_wallets_are_unauthorized() {
        assert_matches!(canonical_wallet(""), Err(CoreError::Unauthorized(_)));
        assert_matches!(canonical_wallet("abc"), Err(CoreError::Unauthorized(_)));
        assert_matches!(canonical_wallet("0xZZ"), Err(CoreError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn resolver_delegates_to_canonical_form() {
        let addr = CanonicalWalletResolver.resolve("0xFF").await.unwrap();
        assert_eq!(addr.as_str(), "0xff");
    }
}
