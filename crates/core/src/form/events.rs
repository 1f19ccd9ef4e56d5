use serde::{Deserialize, Serialize};

use crate::collaborators::BpmDetection;
use crate::content_type::LoopCategory;
use crate::splits::RightsCategory;
use crate::uploads::MediaSlot;

use super::draft::VideoCrop;

/// One user edit, applied through
/// [`UploadFormController::apply`](super::UploadFormController::apply).
///
/// Indices address the current list order (splits, bundle items,
/// locations).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormEvent {
    SetTitle { value: String },
    SetArtist { value: String },
    SetDescription { value: String },
    SetTags { tags: Vec<String> },
    AddTag { tag: String },
    RemoveTag { tag: String },

    SetBpm { bpm: Option<u32> },
    /// Result of client-side tempo detection.
    DetectedBpm { detection: BpmDetection },
    SetLoopCategory { category: LoopCategory },
    SetLoopDescriptor { value: String },

    SetSplitWallet {
        category: RightsCategory,
        index: usize,
        wallet: String,
    },
    SetSplitPercentage {
        category: RightsCategory,
        index: usize,
        percentage: f64,
    },

    SetRemixProtected { protected: bool },
    SetAllowDownloads { allow: bool },
    SetAllowStreaming { allow: bool },
    SetDownloadPrice { price: Option<f64> },

    AddLocation { name: String, lat: f64, lng: f64 },
    AddFreeTextLocation { text: String },
    RemoveLocation { index: usize },

    MoveItemUp { index: usize },
    MoveItemDown { index: usize },
    EditItemTitle { index: usize, title: String },
    EditItemBpm { index: usize, bpm: Option<u32> },
    RemoveItem { index: usize },

    RemoveMedia { slot: MediaSlot },
    SetVideoCrop { crop: Option<VideoCrop> },
    SetNotes { value: String },
    SetConnectedRelease { url: Option<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event: FormEvent = serde_json::from_str(
            r#"{"type":"set_split_wallet","category":"production","index":1,"wallet":"0xb"}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            FormEvent::SetSplitWallet {
                category: RightsCategory::Production,
                index: 1,
                wallet: "0xb".into(),
            }
        );

        let json = serde_json::to_value(FormEvent::MoveItemUp { index: 2 }).unwrap();
        assert_eq!(json["type"], "move_item_up");
        assert_eq!(json["index"], 2);
    }

    #[test]
    fn unknown_event_is_rejected() {
        assert!(serde_json::from_str::<FormEvent>(r#"{"type":"set_price_total","value":9}"#).is_err());
    }
}
