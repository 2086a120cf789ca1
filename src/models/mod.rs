pub mod address;
pub mod cart;
pub mod coupon;
pub mod order;
pub mod product;
pub mod regions;

pub use address::Address;
pub use cart::{Cart, CartLine, LineKey};
pub use coupon::{Coupon, CouponKind, CouponOutcome, CouponRejection, CouponStatus};
pub use order::{
    generate_order_number, Order, OrderLine, OrderStatus, PaymentMethod, PriceBreakdown,
};
pub use product::ProductSummary;
