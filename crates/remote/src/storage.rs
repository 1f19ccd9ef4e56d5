//! [`ObjectStorage`] over a bucket/object HTTP API.

use async_trait::async_trait;
use reqwest::Method;
use uuid::Uuid;

use tunedrop_core::collaborators::ObjectStorage;
use tunedrop_core::error::UploadError;
use tunedrop_core::types::FileHandle;

use crate::client::RestClient;
use crate::config::RemoteConfig;

pub struct RestObjectStorage {
    rest: RestClient,
    config: RemoteConfig,
}

/// Object name for an uploaded file: a random prefix plus the file name
/// reduced to URL-safe characters.
pub fn object_name(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}-{safe}", Uuid::new_v4())
}

impl RestObjectStorage {
    pub fn new(rest: RestClient, config: RemoteConfig) -> Self {
        Self { rest, config }
    }

    fn public_url(&self, bucket: &str, object: &str) -> String {
        format!("{}/object/public/{bucket}/{object}", self.rest.base_url())
    }
}

#[async_trait]
impl ObjectStorage for RestObjectStorage {
    async fn upload(
        &self,
        bucket: &str,
        file: &FileHandle,
        data: Vec<u8>,
    ) -> Result<String, UploadError> {
        let bucket = self.config.bucket(bucket);
        let object = object_name(&file.name);
        let content_type = file
            .mime_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let response = self
            .rest
            .request(Method::POST, &format!("object/{bucket}/{object}"))
            .header("Content-Type", content_type)
            .header("x-upsert", "false")
            .body(data)
            .send()
            .await
            .map_err(|e| UploadError::new(&file.name, e))?;
        RestClient::check_status(response)
            .await
            .map_err(|e| UploadError::new(&file.name, e))?;

        let url = self.public_url(bucket, &object);
        tracing::debug!(bucket, file = %file.name, %url, "Object stored");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_names_are_url_safe() {
        let name = object_name("my loop (final) #2.wav");
        let (prefix, rest) = name.split_at(36);
        assert!(Uuid::parse_str(prefix).is_ok());
        assert_eq!(rest, "-my_loop__final___2.wav");
    }
}
