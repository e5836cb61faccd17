//! Utility Functions
//!
//! User-friendly formatting of fatal errors, with troubleshooting hints for
//! configuration, screen geometry, pointer control, and replay failures.
//!
//! ```rust,no_run
//! use landmark_cursor::utils::format_user_error;
//!
//! # fn run() -> anyhow::Result<()> { Ok(()) }
//! if let Err(e) = run() {
//!     eprintln!("{}", format_user_error(&e));
//! }
//! ```

pub mod errors;

pub use errors::format_user_error;
