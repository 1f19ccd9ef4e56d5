//! Ordered per-item metadata for multi-item bundles (loop packs, EPs).
//!
//! Positions are never stored while editing; they are derived from the
//! current list order when the submission metadata is assembled. New items
//! and items hydrated from a stored record behave identically.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::FileHandle;
use crate::uploads::{UploadKey, UploadStatus};

/// One item of a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleItem {
    /// Local key tying the item to its upload.
    pub key: UploadKey,
    /// `None` for items whose file was stored by an earlier session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<FileHandle>,
    pub title: String,
    pub bpm: Option<u32>,
    /// Persisted id; `None` until the item has been stored.
    pub stable_id: Option<String>,
    pub upload: UploadStatus,
}

/// A stored bundle item as returned by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedBundleItem {
    pub id: String,
    pub title: String,
    pub bpm: Option<u32>,
    pub position: i32,
    pub audio_url: String,
}

/// Per-item entry of the submission payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub id: Option<String>,
    pub title: String,
    pub bpm: Option<u32>,
    /// 1-based, from the list order at assembly time.
    pub position: u32,
    /// Storage URL; set once the item's upload finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

/// Derive a default item title from a file name: the extension is stripped
/// and underscores become spaces.
pub fn title_from_filename(name: &str) -> String {
    let stem = match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    };
    stem.replace('_', " ").trim().to_string()
}

/// Ordered bundle items with reorder and in-place edit operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundleEditor {
    items: Vec<BundleItem>,
}

impl BundleEditor {
    /// Build items from freshly picked files, in the given order.
    pub fn init_from_files(files: Vec<FileHandle>) -> Self {
        let mut editor = Self::default();
        editor.append_files(files);
        editor
    }

    /// Build items from stored rows, ordered by their stored position.
    pub fn hydrate(mut stored: Vec<PersistedBundleItem>) -> Self {
        stored.sort_by_key(|item| item.position);
        let items = stored
            .into_iter()
            .map(|item| BundleItem {
                key: Uuid::new_v4(),
                source_file: None,
                title: item.title,
                bpm: item.bpm,
                stable_id: Some(item.id),
                upload: UploadStatus::Uploaded {
                    url: item.audio_url,
                },
            })
            .collect();
        Self { items }
    }

    /// Append new files after the existing items. Returns their keys.
    pub fn append_files(&mut self, files: Vec<FileHandle>) -> Vec<UploadKey> {
        files
            .into_iter()
            .map(|file| {
                let key = Uuid::new_v4();
                self.items.push(BundleItem {
                    key,
                    title: title_from_filename(&file.name),
                    source_file: Some(file),
                    bpm: None,
                    stable_id: None,
                    upload: UploadStatus::Pending,
                });
                key
            })
            .collect()
    }

    pub fn items(&self) -> &[BundleItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Swap the item with its predecessor. No-op at the top or out of range.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.items.len() {
            return false;
        }
        self.items.swap(index - 1, index);
        true
    }

    /// Swap the item with its successor. No-op at the bottom or out of range.
    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.items.len() {
            return false;
        }
        self.items.swap(index, index + 1);
        true
    }

    pub fn edit_title(&mut self, index: usize, value: &str) -> bool {
        match self.items.get_mut(index) {
            Some(item) => {
                item.title = value.to_string();
                true
            }
            None => false,
        }
    }

    pub fn edit_bpm(&mut self, index: usize, value: Option<u32>) -> bool {
        match self.items.get_mut(index) {
            Some(item) => {
                item.bpm = value;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<BundleItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn find_mut(&mut self, key: UploadKey) -> Option<&mut BundleItem> {
        self.items.iter_mut().find(|item| item.key == key)
    }

    /// Per-item payload with positions `1..=len` from the current order.
    ///
    /// `fallback_bpm` fills items without their own BPM (pack-wide BPM).
    pub fn to_submission_metadata(&self, fallback_bpm: Option<u32>) -> Vec<TrackMetadata> {
        self.items
            .iter()
            .enumerate()
            .map(|(idx, item)| TrackMetadata {
                id: item.stable_id.clone(),
                title: item.title.clone(),
                bpm: item.bpm.or(fallback_bpm),
                position: idx as u32 + 1,
                audio_url: item.upload.url().map(str::to_string),
            })
            .collect()
    }
}
