// Pure cart mutation rules. No storage access: the repository loads a
// CartState, the engine mutates it, the repository writes it back inside
// the same locked transaction.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::coupons::models::CouponSnapshot;

/// One line of a cart: a (product, size) pair with a quantity and the
/// unit selling price resolved from the catalog at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product_id: Uuid,
    pub size: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// In-memory cart state. Lines keep insertion order; no two lines share
/// the same (product, size) pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    pub lines: Vec<CartLine>,
    pub applied_coupon: Option<CouponSnapshot>,
}

impl CartState {
    pub fn new(lines: Vec<CartLine>, applied_coupon: Option<CouponSnapshot>) -> Self {
        Self {
            lines,
            applied_coupon,
        }
    }

    /// Cart total: Σ quantity × unit selling price.
    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .map(|line| Decimal::from(line.quantity) * line.unit_price)
            .sum()
    }

    /// Add an item. When a line with the same (product, size) already
    /// exists its quantity grows by exactly 1 — the requested quantity
    /// only applies to a brand-new line. Totals only grow here, so the
    /// coupon invariant cannot break.
    pub fn add_item(&mut self, product_id: Uuid, size: &str, quantity: i32, unit_price: Decimal) {
        match self.find_line_mut(product_id, size) {
            Some(line) => line.quantity += 1,
            None => self.lines.push(CartLine {
                product_id,
                size: size.to_string(),
                quantity,
                unit_price,
            }),
        }
    }

    /// Apply a signed quantity delta to a line. The line is dropped when
    /// its quantity falls to zero or below. Returns false when no such
    /// line exists. The coupon invariant is re-enforced afterwards.
    pub fn update_quantity(&mut self, product_id: Uuid, size: &str, delta: i32) -> bool {
        let Some(line) = self.find_line_mut(product_id, size) else {
            return false;
        };

        line.quantity += delta;
        if line.quantity <= 0 {
            self.lines
                .retain(|l| !(l.product_id == product_id && l.size == size));
        }

        self.enforce_coupon_invariant();
        true
    }

    /// Remove a (product, size) line outright, then re-enforce the
    /// coupon invariant: shrinking the cart below the coupon's minimum
    /// purchase drops the coupon.
    pub fn remove_item(&mut self, product_id: Uuid, size: &str) {
        self.lines
            .retain(|l| !(l.product_id == product_id && l.size == size));
        self.enforce_coupon_invariant();
    }

    /// Replace any applied coupon with a fresh snapshot. Coupons never
    /// stack; the cart carries at most one.
    pub fn apply_coupon(&mut self, snapshot: CouponSnapshot) {
        self.applied_coupon = Some(snapshot);
    }

    pub fn remove_coupon(&mut self) {
        self.applied_coupon = None;
    }

    /// Empty the cart and drop the coupon. Used after checkout.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.applied_coupon = None;
    }

    /// Invariant: while a coupon is applied, total >= min_purchase.
    /// Clears the coupon when a mutation broke that; returns whether it
    /// was cleared.
    pub fn enforce_coupon_invariant(&mut self) -> bool {
        if let Some(coupon) = &self.applied_coupon {
            if self.total() < coupon.min_purchase {
                self.applied_coupon = None;
                return true;
            }
        }
        false
    }

    fn find_line_mut(&mut self, product_id: Uuid, size: &str) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|l| l.product_id == product_id && l.size == size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coupons::models::DiscountType;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    fn snapshot_with_min(min_purchase: Decimal) -> CouponSnapshot {
        CouponSnapshot {
            code: "SAVE10".to_string(),
            description: None,
            discount_type: DiscountType::Percent,
            discount_value: dec!(10),
            min_purchase,
            max_discount: None,
            expiry_date: Utc::now() + Duration::days(30),
            is_active: true,
        }
    }

    #[test]
    fn test_add_item_to_empty_cart() {
        let mut cart = CartState::default();
        let product = Uuid::new_v4();

        cart.add_item(product, "M", 3, dec!(500));

        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity, 3);
        assert_eq!(cart.total(), dec!(1500));
    }

    #[test]
    fn test_add_same_item_twice_merges_by_one() {
        // the merge path bumps by 1 regardless of the requested quantity
        let mut cart = CartState::default();
        let product = Uuid::new_v4();

        cart.add_item(product, "M", 1, dec!(500));
        cart.add_item(product, "M", 1, dec!(500));

        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity, 2);
    }

    #[test]
    fn test_merge_ignores_requested_quantity() {
        let mut cart = CartState::default();
        let product = Uuid::new_v4();

        cart.add_item(product, "M", 2, dec!(500));
        cart.add_item(product, "M", 5, dec!(500));

        assert_eq!(cart.lines[0].quantity, 3);
    }

    #[test]
    fn test_same_product_different_size_is_a_new_line() {
        let mut cart = CartState::default();
        let product = Uuid::new_v4();

        cart.add_item(product, "M", 1, dec!(500));
        cart.add_item(product, "L", 1, dec!(500));

        assert_eq!(cart.lines.len(), 2);
    }

    #[test]
    fn test_update_quantity_applies_delta() {
        let mut cart = CartState::default();
        let product = Uuid::new_v4();
        cart.add_item(product, "M", 2, dec!(500));

        assert!(cart.update_quantity(product, "M", 3));
        assert_eq!(cart.lines[0].quantity, 5);

        assert!(cart.update_quantity(product, "M", -2));
        assert_eq!(cart.lines[0].quantity, 3);
    }

    #[test]
    fn test_update_quantity_to_zero_removes_line() {
        let mut cart = CartState::default();
        let product = Uuid::new_v4();
        cart.add_item(product, "M", 2, dec!(500));

        assert!(cart.update_quantity(product, "M", -2));
        assert!(cart.lines.is_empty());
    }

    #[test]
    fn test_update_quantity_below_zero_removes_line() {
        let mut cart = CartState::default();
        let product = Uuid::new_v4();
        cart.add_item(product, "M", 1, dec!(500));

        assert!(cart.update_quantity(product, "M", -5));
        assert!(cart.lines.is_empty());
    }

    #[test]
    fn test_update_quantity_missing_line_reports_not_found() {
        let mut cart = CartState::default();
        assert!(!cart.update_quantity(Uuid::new_v4(), "M", 1));
    }

    #[test]
    fn test_shrinking_below_min_purchase_drops_coupon() {
        let mut cart = CartState::default();
        let product = Uuid::new_v4();
        cart.add_item(product, "M", 2, dec!(500));
        cart.apply_coupon(snapshot_with_min(dec!(800)));

        assert!(cart.update_quantity(product, "M", -1));

        // 1 × 500 < 800, so the coupon must be gone
        assert!(cart.applied_coupon.is_none());
    }

    #[test]
    fn test_coupon_survives_while_total_stays_above_min() {
        let mut cart = CartState::default();
        let product = Uuid::new_v4();
        cart.add_item(product, "M", 3, dec!(500));
        cart.apply_coupon(snapshot_with_min(dec!(800)));

        assert!(cart.update_quantity(product, "M", -1));

        // 2 × 500 >= 800
        assert!(cart.applied_coupon.is_some());
    }

    #[test]
    fn test_remove_item_drops_coupon_when_below_min() {
        let mut cart = CartState::default();
        let shirt = Uuid::new_v4();
        let jeans = Uuid::new_v4();
        cart.add_item(shirt, "M", 1, dec!(600));
        cart.add_item(jeans, "32", 1, dec!(900));
        cart.apply_coupon(snapshot_with_min(dec!(1000)));

        cart.remove_item(jeans, "32");

        assert_eq!(cart.lines.len(), 1);
        assert!(cart.applied_coupon.is_none());
    }

    #[test]
    fn test_applying_second_coupon_overwrites_first() {
        let mut cart = CartState::default();
        cart.add_item(Uuid::new_v4(), "M", 2, dec!(500));

        cart.apply_coupon(snapshot_with_min(Decimal::ZERO));
        let mut second = snapshot_with_min(Decimal::ZERO);
        second.code = "FLAT200".to_string();
        second.discount_type = DiscountType::Flat;
        second.discount_value = dec!(200);
        cart.apply_coupon(second.clone());

        assert_eq!(cart.applied_coupon, Some(second));
    }

    #[test]
    fn test_clear_empties_lines_and_coupon() {
        let mut cart = CartState::default();
        cart.add_item(Uuid::new_v4(), "M", 2, dec!(500));
        cart.apply_coupon(snapshot_with_min(Decimal::ZERO));

        cart.clear();

        assert!(cart.lines.is_empty());
        assert!(cart.applied_coupon.is_none());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[derive(Debug, Clone)]
    enum Op {
        Add { slot: usize, size: u8, qty: i32 },
        Update { slot: usize, size: u8, delta: i32 },
        Remove { slot: usize, size: u8 },
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..4, 0u8..3, 1i32..5).prop_map(|(slot, size, qty)| Op::Add { slot, size, qty }),
            (0usize..4, 0u8..3, -5i32..5)
                .prop_map(|(slot, size, delta)| Op::Update { slot, size, delta }),
            (0usize..4, 0u8..3).prop_map(|(slot, size)| Op::Remove { slot, size }),
        ]
    }

    fn run_ops(ops: &[Op]) -> CartState {
        let products: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let sizes = ["S", "M", "L"];
        let mut cart = CartState::default();

        for op in ops {
            match op {
                Op::Add { slot, size, qty } => {
                    cart.add_item(products[*slot], sizes[*size as usize], *qty, dec!(250));
                }
                Op::Update { slot, size, delta } => {
                    cart.update_quantity(products[*slot], sizes[*size as usize], *delta);
                }
                Op::Remove { slot, size } => {
                    cart.remove_item(products[*slot], sizes[*size as usize]);
                }
            }
        }
        cart
    }

    /// No sequence of mutations ever leaves a non-positive quantity.
    #[test]
    fn prop_quantities_stay_positive() {
        proptest!(|(ops in proptest::collection::vec(op_strategy(), 0..40))| {
            let cart = run_ops(&ops);
            prop_assert!(cart.lines.iter().all(|l| l.quantity >= 1));
        });
    }

    /// No sequence of mutations ever produces duplicate (product, size) lines.
    #[test]
    fn prop_lines_stay_unique() {
        proptest!(|(ops in proptest::collection::vec(op_strategy(), 0..40))| {
            let cart = run_ops(&ops);
            let mut seen = std::collections::HashSet::new();
            for line in &cart.lines {
                prop_assert!(seen.insert((line.product_id, line.size.clone())));
            }
        });
    }

    /// The total is always the sum over lines and never negative.
    #[test]
    fn prop_total_matches_lines() {
        proptest!(|(ops in proptest::collection::vec(op_strategy(), 0..40))| {
            let cart = run_ops(&ops);
            let expected: Decimal = cart
                .lines
                .iter()
                .map(|l| Decimal::from(l.quantity) * l.unit_price)
                .sum();
            prop_assert_eq!(cart.total(), expected);
            prop_assert!(cart.total() >= Decimal::ZERO);
        });
    }
}
