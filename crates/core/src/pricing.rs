//! Price derivation.
//!
//! A [`PriceQuote`] is always derived from the content type, licensing
//! selection and item count. It is never entered directly; only the
//! per-item download price is user input.

use serde::{Deserialize, Serialize};

use crate::content_type::ContentType;
use crate::licensing::LicensingSelection;
use crate::types::round2;

/// Platform remix fee per item, charged each time a remix is recorded.
pub const REMIX_FEE: f64 = 1.0;

/// Derived price for a draft.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Per item, per recorded remix. `None` when remixing is disabled.
    pub remix_fee: Option<f64>,
    /// Download price of one item. `None` when downloads are disabled.
    pub download_unit_price: Option<f64>,
    /// `download_unit_price × item_count`.
    pub download_total: Option<f64>,
    /// 1 for singletons, the bundle size otherwise.
    pub item_count: u32,
}

impl PriceQuote {
    /// Whether any price line applies; the review step shows one only then.
    pub fn has_active_price(&self) -> bool {
        self.remix_fee.is_some() || self.download_total.is_some()
    }
}

/// Derive the price for `content_type`.
///
/// `item_count` is ignored for singletons. For bundles the download total is
/// the per-item price times the item count, and the remix fee applies per
/// item.
pub fn price(
    content_type: ContentType,
    selection: &LicensingSelection,
    item_count: usize,
) -> PriceQuote {
    let item_count = if content_type.is_bundle() {
        item_count as u32
    } else {
        1
    };

    let remix_fee = selection.allow_remixing.then_some(REMIX_FEE);

    let download_unit_price = if selection.allow_downloads {
        selection.download_price.map(round2)
    } else {
        None
    };
    let download_total = download_unit_price.map(|unit| round2(unit * f64::from(item_count)));

    PriceQuote {
        remix_fee,
        download_unit_price,
        download_total,
        item_count,
    }
}
