pub mod cart;
pub mod checkout;
pub mod coupon;
pub mod order_status;
pub mod pricing;
pub mod search;

pub use cart::CartStore;
pub use checkout::{validate_address, CheckoutOrchestrator, CheckoutOutcome, CouponApplication};
pub use coupon::CouponValidator;
pub use order_status::OrderLifecycleService;
pub use pricing::PricingEngine;
pub use search::SuggestionService;
