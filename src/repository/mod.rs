//! Database repository layer

mod ledger;

pub mod activity_repo;
pub mod asset_repo;
pub mod assignment_repo;
pub mod expenditure_repo;
pub mod purchase_repo;
pub mod session_repo;
pub mod transfer_repo;
pub mod user_repo;

pub use activity_repo::*;
pub use asset_repo::*;
pub use assignment_repo::*;
pub use expenditure_repo::*;
pub use purchase_repo::*;
pub use session_repo::*;
pub use transfer_repo::*;
pub use user_repo::*;
