//! Resource cleanup helpers

mod handler;

pub use handler::TempFileGuard;
