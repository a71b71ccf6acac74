//! Domain models for the site.

pub mod admin_user;
pub mod session;
pub mod submission;

pub use admin_user::{AdminUser, AdminUserSummary};
pub use session::{SESSION_COOKIE_NAME, SESSION_LIFETIME, SessionRecord};
pub use submission::{
    ContactSubmission, NewSubmission, Pagination, Reply, ReplyAdmin, ReplyWithAdmin, SortField,
    SortOrder, SubmissionFilter,
};
