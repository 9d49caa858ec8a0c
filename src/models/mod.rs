pub mod approval;
pub mod audit;
pub mod common;
pub mod journal;
pub mod pagination;
pub mod role;
pub mod user;

pub use approval::*;
pub use audit::*;
pub use common::*;
pub use journal::*;
pub use pagination::*;
pub use role::*;
pub use user::*;
