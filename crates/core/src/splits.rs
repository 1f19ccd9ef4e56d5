//! Contributor split validation and auto-balancing.
//!
//! Each rights category holds exactly [`SPLIT_SLOTS`] `{wallet, percentage}`
//! slots. A slot with a non-empty wallet is an active contributor.
//! Validation only looks at the percentage total; auto-balancing runs when a
//! wallet slot flips between empty and occupied and is never re-applied
//! after a manual percentage edit.

use serde::{Deserialize, Serialize};

use crate::types::{round2, WalletAddress};

/// Contributor slots per rights category.
pub const SPLIT_SLOTS: usize = 3;

/// Required total of each split group.
pub const SPLIT_TOTAL: f64 = 100.0;

/// Accepted deviation from [`SPLIT_TOTAL`].
pub const SPLIT_TOLERANCE: f64 = 0.01;

/// Absorbs binary rounding of decimal percentages, so a total of exactly
/// 99.99 or 100.01 sits inside [`SPLIT_TOLERANCE`].
const TOLERANCE_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Rights category a split group attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RightsCategory {
    /// Idea rights: melody, lyrics, structure, concept.
    Composition,
    /// Implementation rights: performance, engineering, execution.
    Production,
}

impl RightsCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Composition => "composition",
            Self::Production => "production",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Composition => "Composition",
            Self::Production => "Production",
        }
    }
}

/// One contributor slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitSlot {
    pub wallet: String,
    pub percentage: f64,
}

impl SplitSlot {
    pub fn is_active(&self) -> bool {
        !self.wallet.trim().is_empty()
    }
}

/// The fixed-size set of contributor slots for one rights category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitGroup {
    pub slots: [SplitSlot; SPLIT_SLOTS],
}

/// Result of [`validate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitReport {
    pub ok: bool,
    pub errors: Vec<String>,
}

// ---------------------------------------------------------------------------
// SplitGroup
// ---------------------------------------------------------------------------

impl SplitGroup {
    /// 100% attribution to a single contributor in slot 1.
    pub fn solo(identity: &WalletAddress) -> Self {
        let mut group = Self::default();
        group.slots[0] = SplitSlot {
            wallet: identity.as_str().to_string(),
            percentage: SPLIT_TOTAL,
        };
        group
    }

    pub fn total(&self) -> f64 {
        round2(self.slots.iter().map(|s| s.percentage).sum())
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_active()).count()
    }

    /// Set the wallet of a slot.
    ///
    /// When the slot transitions between empty and occupied, occupied slots
    /// are compacted towards slot 1 and the group is auto-balanced. Editing
    /// an already-occupied wallet leaves percentages untouched. Returns
    /// `false` if `index` is out of range.
    pub fn set_wallet(&mut self, index: usize, wallet: &str) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };
        let was_active = slot.is_active();
        slot.wallet = wallet.trim().to_string();
        if was_active != slot.is_active() {
            self.compact();
            auto_balance(self);
        }
        true
    }

    /// Manually set a percentage. Trusted as-is until the next wallet change.
    pub fn set_percentage(&mut self, index: usize, percentage: f64) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                slot.percentage = percentage;
                true
            }
            None => false,
        }
    }

    /// Move occupied slots to the front, preserving their relative order.
    pub fn compact(&mut self) {
        let mut occupied: Vec<SplitSlot> = self
            .slots
            .iter()
            .filter(|s| s.is_active())
            .cloned()
            .collect();
        occupied.resize(SPLIT_SLOTS, SplitSlot::default());
        for (slot, value) in self.slots.iter_mut().zip(occupied) {
            *slot = value;
        }
    }
}

// ---------------------------------------------------------------------------
// Validation and balancing
// ---------------------------------------------------------------------------

/// Check that the group's percentages total 100 within [`SPLIT_TOLERANCE`].
pub fn validate(group: &SplitGroup, category: RightsCategory) -> SplitReport {
    let sum: f64 = group.slots.iter().map(|s| s.percentage).sum();
    let total = group.total();
    if (sum - SPLIT_TOTAL).abs() > SPLIT_TOLERANCE + TOLERANCE_EPSILON {
        SplitReport {
            ok: false,
            errors: vec![format!(
                "{} splits must total 100% (currently {total}%)",
                category.label()
            )],
        }
    } else {
        SplitReport {
            ok: true,
            errors: Vec::new(),
        }
    }
}

/// Distribute 100% across occupied slots.
///
/// With `n` occupied slots each gets `floor(100 / n)`; the first occupied
/// slot also absorbs the remainder. Unoccupied slots get 0. With no
/// occupied slot every percentage is 0.
pub fn auto_balance(group: &mut SplitGroup) {
    let n = group.active_count();
    if n == 0 {
        for slot in &mut group.slots {
            slot.percentage = 0.0;
        }
        return;
    }

    let base = (SPLIT_TOTAL as u32) / n as u32;
    let remainder = SPLIT_TOTAL as u32 - base * n as u32;
    let mut first = true;
    for slot in &mut group.slots {
        if slot.is_active() {
            slot.percentage = if first {
                first = false;
                f64::from(base + remainder)
            } else {
                f64::from(base)
            };
        } else {
            slot.percentage = 0.0;
        }
    }
}
