//! Authentication module

pub mod jwt;
pub mod refresh;
pub mod session;

pub use jwt::seconds_until_expiry;
pub use session::{AuthState, Session, SessionStore};
