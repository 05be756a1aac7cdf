pub mod activity_log;
pub mod context;
pub mod user_profile;

pub use activity_log::{ActionStatus, ActivityEntry, ActivityLog, MemoryError, SharedActivityLog};
pub use context::ContextManager;
pub use user_profile::UserProfile;
