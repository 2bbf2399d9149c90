use chrono::Utc;
use rand::Rng;

use crate::db_types::OrderId;

/// Generates a new order number: a time+random composite that is globally unique for all
/// practical purposes and lets a human read the creation time straight off the id.
pub fn new_order_number() -> OrderId {
    let suffix = rand::thread_rng().gen_range(0..1000);
    OrderId(format!("ORD-{}-{suffix:03}", Utc::now().timestamp_millis()))
}

/// Generates a merchant-side charge reference for providers (Korapay) that expect the
/// merchant to supply one. Same time+random shape as order numbers.
pub fn new_korapay_reference() -> String {
    let suffix = rand::thread_rng().gen_range(0..1000);
    format!("KORA-{}-{suffix:03}", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn order_numbers_have_the_expected_shape() {
        let id = new_order_number();
        let parts: Vec<&str> = id.as_str().split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 3);
    }

    #[test]
    fn korapay_references_carry_the_expected_prefix() {
        assert!(new_korapay_reference().starts_with("KORA-"));
    }
}
