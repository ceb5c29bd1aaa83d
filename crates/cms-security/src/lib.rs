//! # CMS Security
//! 
//! Security utilities: signed session tokens, the admin access decision, and
//! password hashing.

pub mod gate;
pub mod password;
pub mod session;

pub use gate::{AccessDecision, DenialReason};
pub use password::PasswordService;
pub use session::{IssuedSession, SessionClaims, SessionCodec, SessionError, SessionIdentity};
