//! SQLite access for bookshelf.
//!
//! No connection is kept open between operations: every caller acquires a
//! [`Session`] for the duration of one unit of work and the underlying
//! connection is closed when the session is dropped, on success, error and
//! unwind alike. Async callers go through [`Database::with_session`], which
//! runs the blocking SQLite work on the tokio blocking pool.

pub mod error;
pub mod migrate;
pub mod session;

pub use error::DbError;
pub use session::{Database, Session};
