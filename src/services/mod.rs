pub mod admin_auth_service;
pub mod cart_service;
pub mod dashboard_service;
pub mod discount_service;
pub mod order_service;
pub mod product_service;
pub mod upload_service;

pub use admin_auth_service::*;
pub use cart_service::*;
pub use dashboard_service::*;
pub use discount_service::*;
pub use order_service::*;
pub use product_service::*;
pub use upload_service::*;
