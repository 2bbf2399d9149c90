mod reference;

pub use reference::{new_korapay_reference, new_order_number};
