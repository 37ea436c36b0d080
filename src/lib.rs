//! # 10MinuteMail Client
//! Asynchronous wrapper around the 10MinuteMail disposable email HTTP API: open a temporary mailbox with [`Session`], keep it alive, and poll it for new [`Message`]s.
//!
//! ## Audience and uses
//! For Rust developers who need a throwaway address in integration tests, demos, or automation scripts. Configure with [`SessionBuilder`], read the address, then call [`Session::latest`] on a timer, renewing when [`Session::is_expired`] says so.
//!
//! ## Runtime requirements
//! Async-only; run inside a Tokio (v1) runtime. HTTP calls use `reqwest`. A session holds no background tasks, so a caller may stop polling at any time.
//!
//! ## Concurrency
//! One session, one caller. Operations that move the message cursor or the expiry clock take `&mut self`; wrap the session in a mutex if several tasks need it.
//!
//! ## Errors
//! Every failure kind is a separate [`Error`] variant. HTTP 403 is always [`Error::BlockedByServer`], which usually means the service is rate limiting this host. [`Session::reply`], [`Session::forward`] and [`Session::renew`] return `Ok(false)` when the server answered but declined.
//!
//! ## Logging
//! Requests and session events are reported through the `log` facade; install any logger to see them.
//!
//! ## Example
//! ```no_run
//! use tenminutemail_client::Session;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tenminutemail_client::Error> {
//!     let mut session = Session::new().await?;
//!     println!("Address: {}", session.address());
//!
//!     if session.is_expired() && !session.renew().await? {
//!         eprintln!("session permanently expired");
//!         return Ok(());
//!     }
//!
//!     for msg in session.latest().await? {
//!         println!("From: {}, Subject: {}", msg.sender, msg.subject);
//!     }
//!     Ok(())
//! }
//! ```

mod error;
mod models;
mod session;

pub use error::Error;
pub use models::Message;
pub use session::{DEFAULT_TIMEOUT, SESSION_LIFETIME, Session, SessionBuilder, join};

/// Result type alias for 10MinuteMail operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
