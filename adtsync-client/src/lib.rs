//! # adtsync-client
//!
//! Blocking ADT object protocol over a single authenticated [`AdtSession`].
//!
//! The session is immutable once built. The CSRF token is not stored in it:
//! callers fetch it once with [`AdtSession::fetch_csrf_token`] and pass the
//! resulting [`CsrfToken`] into every state-changing call.

pub mod error;
pub mod protocol;
pub mod session;
pub mod urls;

pub use error::{AdtError, Operation};
pub use protocol::{CsrfToken, ETag, SourceText};
pub use session::{AdtSession, Credentials, SessionOptions};
