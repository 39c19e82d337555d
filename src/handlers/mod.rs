pub mod auth;
pub mod coupons;
pub mod payments;
pub mod settings;
pub mod shops;
pub mod users;
