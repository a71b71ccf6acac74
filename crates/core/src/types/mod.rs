//! Shared domain types.

pub mod email;
pub mod id;
pub mod service;
pub mod status;

pub use email::{Email, EmailError};
pub use id::{AdminUserId, ReplyId, SubmissionId};
pub use service::ServiceInterest;
pub use status::SubmissionStatus;
