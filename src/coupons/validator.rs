// Pure coupon evaluation: no storage access, everything the checks need
// is passed in. The cart engine calls this on apply, and the discount
// computation is reused when pricing a cart for checkout.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::coupons::models::{Coupon, CouponSnapshot, DiscountType};

/// Why a coupon was refused. Checks run in a fixed order and the first
/// failure wins; rejections are never aggregated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CouponRejection {
    #[error("Invalid coupon")]
    NotFound,

    #[error("This coupon is no longer active")]
    Inactive,

    #[error("This coupon has expired")]
    Expired,

    #[error("Minimum purchase of ₹{0} required")]
    MinPurchase(Decimal),
}

/// Evaluate a coupon against a cart total at a point in time.
///
/// Check order: existence, activity flag, expiry, minimum purchase.
/// The accept path yields the snapshot to embed in the cart.
pub fn evaluate_coupon(
    coupon: Option<&Coupon>,
    cart_total: Decimal,
    now: DateTime<Utc>,
) -> Result<CouponSnapshot, CouponRejection> {
    let coupon = coupon.ok_or(CouponRejection::NotFound)?;

    if !coupon.is_active {
        return Err(CouponRejection::Inactive);
    }
    if coupon.expiry_date < now {
        return Err(CouponRejection::Expired);
    }
    if cart_total < coupon.min_purchase {
        return Err(CouponRejection::MinPurchase(coupon.min_purchase));
    }

    Ok(CouponSnapshot::from(coupon))
}

/// Discount a snapshot grants on a cart total.
///
/// Percent: total × value / 100, capped at max_discount when set.
/// Flat: the value as-is, clamped so it never exceeds the total.
pub fn discount_amount(snapshot: &CouponSnapshot, cart_total: Decimal) -> Decimal {
    match snapshot.discount_type {
        DiscountType::Percent => {
            let discount = cart_total * snapshot.discount_value / Decimal::from(100);
            match snapshot.max_discount {
                Some(cap) => discount.min(cap),
                None => discount,
            }
        }
        DiscountType::Flat => snapshot.discount_value.min(cart_total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn sample_coupon() -> Coupon {
        let now = Utc::now();
        Coupon {
            id: Uuid::new_v4(),
            code: "SAVE10".to_string(),
            description: Some("10% off".to_string()),
            discount_type: DiscountType::Percent,
            discount_value: dec!(10),
            min_purchase: Decimal::ZERO,
            max_discount: Some(dec!(80)),
            expiry_date: now + Duration::days(30),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_missing_coupon_is_invalid() {
        let result = evaluate_coupon(None, dec!(5000), Utc::now());
        assert_eq!(result.unwrap_err(), CouponRejection::NotFound);
    }

    #[test]
    fn test_inactive_coupon_rejected() {
        let mut coupon = sample_coupon();
        coupon.is_active = false;
        let result = evaluate_coupon(Some(&coupon), dec!(5000), Utc::now());
        assert_eq!(result.unwrap_err(), CouponRejection::Inactive);
    }

    #[test]
    fn test_expired_coupon_rejected_regardless_of_total() {
        let mut coupon = sample_coupon();
        coupon.expiry_date = Utc::now() - Duration::days(1);

        for total in [Decimal::ZERO, dec!(100), dec!(1000000)] {
            let result = evaluate_coupon(Some(&coupon), total, Utc::now());
            assert_eq!(result.unwrap_err(), CouponRejection::Expired);
        }
    }

    #[test]
    fn test_inactive_wins_over_expired() {
        // first failing check wins: an inactive, expired coupon reports inactive
        let mut coupon = sample_coupon();
        coupon.is_active = false;
        coupon.expiry_date = Utc::now() - Duration::days(1);
        let result = evaluate_coupon(Some(&coupon), dec!(5000), Utc::now());
        assert_eq!(result.unwrap_err(), CouponRejection::Inactive);
    }

    #[test]
    fn test_minimum_purchase_enforced() {
        let mut coupon = sample_coupon();
        coupon.min_purchase = dec!(999);

        let below = evaluate_coupon(Some(&coupon), dec!(998.99), Utc::now());
        assert_eq!(below.unwrap_err(), CouponRejection::MinPurchase(dec!(999)));

        let at = evaluate_coupon(Some(&coupon), dec!(999), Utc::now());
        assert!(at.is_ok());
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(CouponRejection::NotFound.to_string(), "Invalid coupon");
        assert_eq!(
            CouponRejection::MinPurchase(dec!(500)).to_string(),
            "Minimum purchase of ₹500 required"
        );
    }

    #[test]
    fn test_accept_path_snapshots_coupon() {
        let coupon = sample_coupon();
        let snapshot = evaluate_coupon(Some(&coupon), dec!(1000), Utc::now()).unwrap();
        assert_eq!(snapshot.code, "SAVE10");
        assert_eq!(snapshot.discount_type, DiscountType::Percent);
        assert_eq!(snapshot.discount_value, dec!(10));
        assert_eq!(snapshot.max_discount, Some(dec!(80)));
    }

    #[test]
    fn test_percent_discount_capped() {
        // 2 × 500 at 10% would be 100, but the cap holds it at 80
        let coupon = sample_coupon();
        let snapshot = CouponSnapshot::from(&coupon);
        assert_eq!(discount_amount(&snapshot, dec!(1000)), dec!(80));
    }

    #[test]
    fn test_percent_discount_under_cap() {
        let coupon = sample_coupon();
        let snapshot = CouponSnapshot::from(&coupon);
        assert_eq!(discount_amount(&snapshot, dec!(500)), dec!(50));
    }

    #[test]
    fn test_percent_discount_uncapped() {
        let mut coupon = sample_coupon();
        coupon.max_discount = None;
        let snapshot = CouponSnapshot::from(&coupon);
        assert_eq!(discount_amount(&snapshot, dec!(3000)), dec!(300));
    }

    #[test]
    fn test_flat_discount_clamped_to_total() {
        let mut coupon = sample_coupon();
        coupon.discount_type = DiscountType::Flat;
        coupon.discount_value = dec!(200);
        let snapshot = CouponSnapshot::from(&coupon);

        assert_eq!(discount_amount(&snapshot, dec!(1500)), dec!(200));
        assert_eq!(discount_amount(&snapshot, dec!(150)), dec!(150));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn coupon_with(
        discount_type: DiscountType,
        value: Decimal,
        cap: Option<Decimal>,
    ) -> CouponSnapshot {
        let now = Utc::now();
        let coupon = Coupon {
            id: Uuid::new_v4(),
            code: "PROP".to_string(),
            description: None,
            discount_type,
            discount_value: value,
            min_purchase: Decimal::ZERO,
            max_discount: cap,
            expiry_date: now + Duration::days(1),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        CouponSnapshot::from(&coupon)
    }

    /// The discount never exceeds the cart total for either type.
    #[test]
    fn prop_discount_never_exceeds_total() {
        proptest!(|(
            total_paise in 0u64..=10_000_000u64,
            value_paise in 1u64..=1_000_000u64,
            percent in 1u64..=100u64,
            flat in proptest::bool::ANY
        )| {
            let total = Decimal::from(total_paise) / Decimal::from(100);
            let snapshot = if flat {
                coupon_with(DiscountType::Flat, Decimal::from(value_paise) / Decimal::from(100), None)
            } else {
                coupon_with(DiscountType::Percent, Decimal::from(percent), None)
            };

            let discount = discount_amount(&snapshot, total);
            prop_assert!(discount >= Decimal::ZERO);
            prop_assert!(discount <= total);
        });
    }

    /// A capped percent discount never exceeds its cap.
    #[test]
    fn prop_percent_cap_holds() {
        proptest!(|(
            total_paise in 0u64..=10_000_000u64,
            percent in 1u64..=100u64,
            cap_paise in 0u64..=100_000u64
        )| {
            let total = Decimal::from(total_paise) / Decimal::from(100);
            let cap = Decimal::from(cap_paise) / Decimal::from(100);
            let snapshot = coupon_with(DiscountType::Percent, Decimal::from(percent), Some(cap));

            prop_assert!(discount_amount(&snapshot, total) <= cap);
        });
    }
}
