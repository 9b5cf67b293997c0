//! Bookshelf application library
//!
//! Wires the books module into the kernel registry and exposes the bootstrap
//! used by both the `bookshelf-app` and `bookshelf` binaries.

pub mod app;
pub mod modules;

pub use app::Application;
