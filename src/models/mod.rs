pub mod admin;
pub mod cart;
pub mod common;
pub mod discount;
pub mod order;
pub mod pagination;
pub mod product;

pub use admin::*;
pub use cart::*;
pub use common::*;
pub use discount::*;
pub use order::*;
pub use pagination::*;
pub use product::*;
