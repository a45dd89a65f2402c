mod coupon;
mod order;
mod product;
mod role;
mod user;

pub use coupon::*;
pub use order::*;
pub use product::*;
pub use role::*;
pub use user::*;
