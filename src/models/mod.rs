pub mod coupon;
pub mod payment;
pub mod settings;
pub mod shop;
pub mod user;

pub use coupon::{Coupon, CouponDetails, DisplayStatus};
pub use payment::{Payment, SellerBalance};
pub use settings::BusinessSetting;
pub use shop::Shop;
pub use user::User;
