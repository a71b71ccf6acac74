//! Service clients and business logic.

pub mod auth;
pub mod email;
pub mod session;
pub mod turnstile;

pub use auth::{AuthService, hash_password};
pub use email::{EmailError, ResendClient};
pub use session::{SessionCodec, SessionError};
pub use turnstile::{TurnstileClient, TurnstileError};
