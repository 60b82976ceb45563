//! Data models mirrored between the server and the local cache

pub mod app_version;
pub mod auth;
pub mod borrow;
pub mod category;
pub mod department;
pub mod equipment;
pub mod registration;
pub mod user;

/// Stand-in printed by `Debug` for passwords and tokens
pub(crate) const REDACTED: &str = "[redacted]";

// Re-export commonly used types
pub use app_version::AppVersionInfo;
pub use borrow::{BorrowHistoryEntry, BorrowStatus};
pub use category::Category;
pub use department::Department;
pub use equipment::{EquipmentItem, EquipmentStatus};
pub use registration::{RegistrationRequest, RegistrationStatus};
pub use user::{Role, User, UserStatus};
