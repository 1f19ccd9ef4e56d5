//! Property-based tests for split validation.
//!
//! Percentages are generated in whole hundredths, so the expected verdict
//! can be computed exactly in integer arithmetic.

use proptest::prelude::*;
use tunedrop_core::splits::{validate, RightsCategory, SplitGroup, SplitSlot};

fn group_from_hundredths(parts: [i64; 3]) -> SplitGroup {
    let mut group = SplitGroup::default();
    for (i, (slot, hundredths)) in group.slots.iter_mut().zip(parts).enumerate() {
        *slot = SplitSlot {
            wallet: format!("0x{:x}", i + 1),
            percentage: hundredths as f64 / 100.0,
        };
    }
    group
}

proptest! {
    /// Property: a group fails exactly when its total is more than 0.01 off 100
    #[test]
    fn fails_exactly_outside_tolerance(
        a in 0i64..=4_990,
        b in 0i64..=5_000,
        offset in -5i64..=5,
    ) {
        let c = 10_000 - a - b + offset;
        let report = validate(&group_from_hundredths([a, b, c]), RightsCategory::Composition);

        prop_assert_eq!(report.ok, offset.abs() <= 1, "offset {} hundredths", offset);
        prop_assert_eq!(report.errors.is_empty(), report.ok);
    }

    /// Property: arbitrary totals agree with the integer verdict
    #[test]
    fn arbitrary_totals_agree_with_integer_check(
        parts in prop::array::uniform3(0i64..=10_000),
    ) {
        let total: i64 = parts.iter().sum();
        let report = validate(&group_from_hundredths(parts), RightsCategory::Production);

        prop_assert_eq!(report.ok, (total - 10_000).abs() <= 1);
    }
}
