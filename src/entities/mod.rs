pub mod discounts;
pub mod order_items;
pub mod orders;
pub mod products;

pub use discounts as discount_entity;
pub use order_items as order_item_entity;
pub use orders as order_entity;
pub use products as product_entity;

pub use discounts::DiscountType;
pub use orders::{OrderStatus, PaymentMethod, PaymentStatus};
