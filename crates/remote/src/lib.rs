//! HTTP implementations of the authoring collaborators: relational store,
//! object storage, location search and tempo detection.

pub mod bpm;
pub mod client;
pub mod config;
pub mod error;
pub mod geocoder;
pub mod storage;
pub mod store;

pub use bpm::RestBpmDetector;
pub use client::RestClient;
pub use config::RemoteConfig;
pub use error::RemoteError;
pub use geocoder::RestGeocoder;
pub use storage::RestObjectStorage;
pub use store::RestSubmissionStore;

/// The adapters built from one [`RemoteConfig`], sharing one HTTP
/// connection pool.
pub struct RemoteCollaborators {
    pub store: RestSubmissionStore,
    pub storage: RestObjectStorage,
    pub geocoder: RestGeocoder,
    /// Present when `bpm_detector_url` is configured.
    pub bpm_detector: Option<RestBpmDetector>,
}

impl RemoteCollaborators {
    pub fn from_config(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let http = config.http_client()?;
        Ok(Self {
            store: RestSubmissionStore::new(RestClient::new(
                http.clone(),
                &config.store_url,
                config.api_key.clone(),
            )),
            storage: RestObjectStorage::new(
                RestClient::new(http.clone(), &config.storage_url, config.api_key.clone()),
                config.clone(),
            ),
            geocoder: RestGeocoder::new(RestClient::new(http.clone(), &config.geocoder_url, None)),
            bpm_detector: config
                .bpm_detector_url
                .as_deref()
                .map(|url| RestBpmDetector::new(RestClient::new(http, url, None))),
        })
    }
}
