use serde::Serialize;

use crate::content_type::ContentType;
use crate::licensing::LicensingSelection;
use crate::policy::{allowed_licensing, quick_download_price};
use crate::splits::SplitGroup;
use crate::types::WalletAddress;

/// Field values quick mode fills in on the creator's behalf.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartialSubmission {
    pub composition: SplitGroup,
    pub production: SplitGroup,
    pub licensing: LicensingSelection,
}

/// Defaults for a quick-mode draft: the creator owns 100% of both rights
/// categories, the content type's default licensing applies, and downloads
/// are offered at the content type's flat price.
pub fn apply_defaults(content_type: ContentType, identity: &WalletAddress) -> PartialSubmission {
    let mut licensing = LicensingSelection::defaults_for(content_type);
    if allowed_licensing(content_type).download.is_offered() {
        licensing.allow_downloads = true;
        licensing.download_price = Some(quick_download_price(content_type));
    }
    PartialSubmission {
        composition: SplitGroup::solo(identity),
        production: SplitGroup::solo(identity),
        licensing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splits::{validate, RightsCategory};

    #[test]
    fn defaults_attribute_everything_to_the_creator() {
        let me = WalletAddress::new_unchecked("0xabc");
        let partial = apply_defaults(ContentType::Loop, &me);
        assert!(validate(&partial.composition, RightsCategory::Composition).ok);
        assert!(validate(&partial.production, RightsCategory::Production).ok);
        assert_eq!(partial.production.slots[0].wallet, "0xabc");
        assert!(partial.licensing.allow_remixing);
    }

    #[test]
    fn every_content_type_gets_a_flat_download_price() {
        let me = WalletAddress::new_unchecked("0xabc");
        for (content_type, expected) in [
            (ContentType::Loop, 1.0),
            (ContentType::LoopPack, 1.0),
            (ContentType::FullSong, 2.0),
            (ContentType::Ep, 2.0),
            (ContentType::VideoClip, 1.5),
        ] {
            let licensing = apply_defaults(content_type, &me).licensing;
            assert!(licensing.allow_downloads, "{content_type:?}");
            assert_eq!(licensing.download_price, Some(expected), "{content_type:?}");
        }
    }

    #[test]
    fn advanced_defaults_keep_downloads_off() {
        let licensing = LicensingSelection::defaults_for(ContentType::FullSong);
        assert!(!licensing.allow_downloads);
        assert_eq!(licensing.download_price, None);
    }

    #[test]
    fn song_defaults_enable_streaming() {
        let me = WalletAddress::new_unchecked("0xabc");
        assert!(apply_defaults(ContentType::FullSong, &me).licensing.allow_streaming);
        assert!(!apply_defaults(ContentType::VideoClip, &me).licensing.allow_streaming);
    }
}
