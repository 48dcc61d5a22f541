pub mod code_generator;
pub mod jwt;
pub mod order_number;
pub mod password;
pub mod phone;
pub mod pricing;

pub use code_generator::{generate_product_id, generate_promo_code};
pub use jwt::*;
pub use order_number::{format_order_number, generate_unique_order_number};
pub use password::*;
pub use phone::*;
pub use pricing::*;
