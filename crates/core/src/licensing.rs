//! Licensing selection for a draft.
//!
//! Toggles are checked against [`allowed_licensing`] for the draft's content
//! type. Disabling downloads nulls the download price.

use serde::{Deserialize, Serialize};

use crate::content_type::ContentType;
use crate::error::CoreError;
use crate::policy::{allowed_licensing, Availability};

/// Derived license label stored with the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseType {
    /// Remixable in the mixer and downloadable.
    RemixExternal,
    /// Remixable in the mixer only.
    RemixOnly,
    /// Downloadable but remix-protected.
    DownloadOnly,
    /// Neither remixable nor downloadable.
    StreamingOnly,
}

impl LicenseType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RemixExternal => "remix_external",
            Self::RemixOnly => "remix_only",
            Self::DownloadOnly => "download_only",
            Self::StreamingOnly => "streaming_only",
        }
    }
}

/// Content-type-scoped licensing choices.
///
/// `download_price` is per item: the flat price for singletons, the price
/// per loop or per song for bundles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicensingSelection {
    pub allow_remixing: bool,
    pub allow_downloads: bool,
    pub allow_streaming: bool,
    pub download_price: Option<f64>,
}

impl LicensingSelection {
    /// Defaults for `content_type`: remix on, downloads off, streaming on
    /// where offered.
    pub fn defaults_for(content_type: ContentType) -> Self {
        let caps = allowed_licensing(content_type);
        Self {
            allow_remixing: caps.remix_default,
            allow_downloads: caps.download_default,
            allow_streaming: caps.streaming_default,
            download_price: None,
        }
    }

    /// Remix protection is the inverse of in-mixer remixing.
    pub fn remix_protected(&self) -> bool {
        !self.allow_remixing
    }

    pub fn license_type(&self) -> LicenseType {
        match (self.allow_remixing, self.allow_downloads) {
            (true, true) => LicenseType::RemixExternal,
            (true, false) => LicenseType::RemixOnly,
            (false, true) => LicenseType::DownloadOnly,
            (false, false) => LicenseType::StreamingOnly,
        }
    }

    pub fn set_remixing(&mut self, content_type: ContentType, allow: bool) -> Result<(), CoreError> {
        match allowed_licensing(content_type).remix {
            Availability::Mandatory if !allow => Err(CoreError::Validation(format!(
                "Remixing cannot be disabled for a {}",
                content_type.label()
            ))),
            Availability::Unavailable if allow => Err(CoreError::Validation(format!(
                "Remixing is not offered for a {}",
                content_type.label()
            ))),
            _ => {
                self.allow_remixing = allow;
                Ok(())
            }
        }
    }

    /// Set the "protected" flag; protecting disables in-mixer remixing.
    pub fn set_remix_protected(
        &mut self,
        content_type: ContentType,
        protected: bool,
    ) -> Result<(), CoreError> {
        self.set_remixing(content_type, !protected)
    }

    pub fn set_downloads(&mut self, content_type: ContentType, allow: bool) -> Result<(), CoreError> {
        if allow && !allowed_licensing(content_type).download.is_offered() {
            return Err(CoreError::Validation(format!(
                "Downloads are not offered for a {}",
                content_type.label()
            )));
        }
        self.allow_downloads = allow;
        if !allow {
            self.download_price = None;
        }
        Ok(())
    }

    pub fn set_streaming(&mut self, content_type: ContentType, allow: bool) -> Result<(), CoreError> {
        if !allowed_licensing(content_type).streaming.is_offered() {
            return Err(CoreError::Validation(format!(
                "Streaming is not configurable for a {}",
                content_type.label()
            )));
        }
        self.allow_streaming = allow;
        Ok(())
    }

    /// Set the per-item download price. Only accepted while downloads are on.
    pub fn set_download_price(&mut self, price: Option<f64>) -> Result<(), CoreError> {
        if price.is_some() && !self.allow_downloads {
            return Err(CoreError::Validation(
                "Enable downloads before setting a download price".to_string(),
            ));
        }
        if let Some(value) = price {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::Validation(format!(
                    "Download price must be a non-negative number, got {value}"
                )));
            }
        }
        self.download_price = price;
        Ok(())
    }

    /// Coerce the selection into what `content_type` allows.
    ///
    /// Used after a content type switch: mandatory capabilities are forced
    /// on, unavailable ones off.
    pub fn conform_to(&mut self, content_type: ContentType) {
        let caps = allowed_licensing(content_type);
        match caps.remix {
            Availability::Mandatory => self.allow_remixing = true,
            Availability::Unavailable => self.allow_remixing = false,
            Availability::Optional => {}
        }
        if !caps.download.is_offered() {
            self.allow_downloads = false;
            self.download_price = None;
        }
        if !caps.streaming.is_offered() {
            self.allow_streaming = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn defaults_per_content_type() {
        let song = LicensingSelection::defaults_for(ContentType::FullSong);
        assert!(song.allow_remixing);
        assert!(!song.allow_downloads);
        assert!(song.allow_streaming);

        let looped = LicensingSelection::defaults_for(ContentType::Loop);
        assert!(!looped.allow_streaming);
        assert_eq!(looped.license_type(), LicenseType::RemixOnly);
    }

    #[test]
    fn disabling_downloads_nulls_price() {
        let mut sel = LicensingSelection::defaults_for(ContentType::Loop);
        sel.set_downloads(ContentType::Loop, true).unwrap();
        sel.set_download_price(Some(3.0)).unwrap();
        assert_eq!(sel.license_type(), LicenseType::RemixExternal);

        sel.set_downloads(ContentType::Loop, false).unwrap();
        assert_eq!(sel.download_price, None);
    }

    #[test]
    fn price_requires_downloads_enabled() {
        let mut sel = LicensingSelection::defaults_for(ContentType::Loop);
        assert_matches!(sel.set_download_price(Some(1.0)), Err(CoreError::Validation(_)));
        assert!(sel.set_download_price(None).is_ok());
    }

    #[test]
    fn negative_price_rejected() {
        let mut sel = LicensingSelection::defaults_for(ContentType::FullSong);
        sel.set_downloads(ContentType::FullSong, true).unwrap();
        assert!(sel.set_download_price(Some(-1.0)).is_err());
        assert!(sel.set_download_price(Some(f64::NAN)).is_err());
    }

    #[test]
    fn video_remix_cannot_be_disabled() {
        let mut sel = LicensingSelection::defaults_for(ContentType::VideoClip);
        assert!(sel.set_remix_protected(ContentType::VideoClip, true).is_err());
        assert!(sel.allow_remixing);
    }

    #[test]
    fn song_remix_is_opt_out() {
        let mut sel = LicensingSelection::defaults_for(ContentType::FullSong);
        sel.set_remix_protected(ContentType::FullSong, true).unwrap();
        assert!(sel.remix_protected());
        assert_eq!(sel.license_type(), LicenseType::StreamingOnly);
    }

    #[test]
    fn streaming_only_for_songs_and_eps() {
        let mut sel = LicensingSelection::defaults_for(ContentType::Loop);
        assert!(sel.set_streaming(ContentType::Loop, true).is_err());
        let mut ep = LicensingSelection::defaults_for(ContentType::Ep);
        ep.set_streaming(ContentType::Ep, false).unwrap();
        assert!(!ep.allow_streaming);
    }

    #[test]
    fn conform_forces_mandatory_remix() {
        let mut sel = LicensingSelection::defaults_for(ContentType::FullSong);
        sel.set_remix_protected(ContentType::FullSong, true).unwrap();
        sel.conform_to(ContentType::VideoClip);
        assert!(sel.allow_remixing);
        assert!(!sel.allow_streaming);
    }
}
