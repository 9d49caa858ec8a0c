pub mod account_service;
pub mod approval_service;
pub mod audit;
pub mod auth_service;
pub mod entry_service;
pub mod export_service;
pub mod user_request_service;

pub use account_service::*;
pub use approval_service::*;
pub use audit::*;
pub use auth_service::*;
pub use entry_service::*;
pub use export_service::*;
pub use user_request_service::*;
