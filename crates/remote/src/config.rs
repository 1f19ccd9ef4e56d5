use std::time::Duration;

use tunedrop_core::uploads::{BUCKET_AUDIO, BUCKET_IMAGES, BUCKET_VIDEO};

use crate::error::RemoteError;

/// Remote collaborator configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL of the REST interface over the track tables.
    pub store_url: String,
    /// Base URL of the object storage API.
    pub storage_url: String,
    pub audio_bucket: String,
    pub video_bucket: String,
    pub images_bucket: String,
    /// Sent as `apikey` and bearer token on store and storage requests.
    pub api_key: Option<String>,
    /// Base URL of a Nominatim-compatible search API.
    pub geocoder_url: String,
    /// Base URL of the audio analysis service; unset disables BPM detection.
    pub bpm_detector_url: Option<String>,
    pub timeout_secs: u64,
}

impl RemoteConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                                   |
    /// |-------------------------|-------------------------------------------|
    /// | `SUBMISSION_STORE_URL`  | `http://localhost:54321/rest/v1`          |
    /// | `STORAGE_URL`           | `http://localhost:54321/storage/v1`       |
    /// | `STORAGE_BUCKET_AUDIO`  | `audio`                                   |
    /// | `STORAGE_BUCKET_VIDEO`  | `video`                                   |
    /// | `STORAGE_BUCKET_IMAGES` | `images`                                  |
    /// | `REMOTE_API_KEY`        | unset                                     |
    /// | `GEOCODER_URL`          | `https://nominatim.openstreetmap.org`     |
    /// | `BPM_DETECTOR_URL`      | unset                                     |
    /// | `REMOTE_TIMEOUT_SECS`   | `30`                                      |
    pub fn from_env() -> Self {
        let var = |name: &str, default: &str| std::env::var(name).unwrap_or_else(|_| default.into());

        let timeout_secs: u64 = var("REMOTE_TIMEOUT_SECS", "30")
            .parse()
            .expect("REMOTE_TIMEOUT_SECS must be a valid u64");

        Self {
            store_url: trim_base(var("SUBMISSION_STORE_URL", "http://localhost:54321/rest/v1")),
            storage_url: trim_base(var("STORAGE_URL", "http://localhost:54321/storage/v1")),
            audio_bucket: var("STORAGE_BUCKET_AUDIO", BUCKET_AUDIO),
            video_bucket: var("STORAGE_BUCKET_VIDEO", BUCKET_VIDEO),
            images_bucket: var("STORAGE_BUCKET_IMAGES", BUCKET_IMAGES),
            api_key: std::env::var("REMOTE_API_KEY").ok().filter(|k| !k.is_empty()),
            geocoder_url: trim_base(var("GEOCODER_URL", "https://nominatim.openstreetmap.org")),
            bpm_detector_url: std::env::var("BPM_DETECTOR_URL")
                .ok()
                .filter(|u| !u.is_empty())
                .map(trim_base),
            timeout_secs,
        }
    }

    /// Configuration pointing every collaborator at `base_url`.
    pub fn local(base_url: &str) -> Self {
        let base = trim_base(base_url.to_string());
        Self {
            store_url: format!("{base}/rest/v1"),
            storage_url: format!("{base}/storage/v1"),
            audio_bucket: BUCKET_AUDIO.into(),
            video_bucket: BUCKET_VIDEO.into(),
            images_bucket: BUCKET_IMAGES.into(),
            api_key: None,
            geocoder_url: base.clone(),
            bpm_detector_url: Some(format!("{base}/analysis")),
            timeout_secs: 5,
        }
    }

    /// Map a logical bucket name to the configured one.
    pub fn bucket<'a>(&'a self, logical: &'a str) -> &'a str {
        match logical {
            BUCKET_AUDIO => &self.audio_bucket,
            BUCKET_VIDEO => &self.video_bucket,
            BUCKET_IMAGES => &self.images_bucket,
            other => other,
        }
    }

    /// Shared HTTP client with the configured timeout.
    pub fn http_client(&self) -> Result<reqwest::Client, RemoteError> {
        Ok(reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .user_agent(concat!("tunedrop/", env!("CARGO_PKG_VERSION")))
            .build()?)
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_buckets_are_remapped() {
        let mut config = RemoteConfig::local("http://localhost:9000/");
        config.audio_bucket = "prod-audio".into();
        assert_eq!(config.bucket(BUCKET_AUDIO), "prod-audio");
        assert_eq!(config.bucket("misc"), "misc");
        assert_eq!(config.store_url, "http://localhost:9000/rest/v1");
    }
}
