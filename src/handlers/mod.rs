pub mod admin;
pub mod cart;
pub mod discount;
pub mod order;
pub mod product;
pub mod upload;

pub use admin::admin_config;
pub use cart::cart_config;
pub use discount::discount_config;
pub use order::order_config;
pub use product::product_config;
pub use upload::upload_config;
