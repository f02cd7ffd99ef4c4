//! Business logic services layer

pub mod activity_service;
pub mod auth_service;
pub mod dashboard_service;
pub mod permission_service;
pub mod user_service;

pub use activity_service::ActivityService;
pub use auth_service::AuthService;
pub use dashboard_service::DashboardService;
pub use permission_service::PermissionService;
pub use user_service::UserService;
