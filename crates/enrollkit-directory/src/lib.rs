//! Employee Directory boundary.
//!
//! The directory is an external service; the enrollment workflow consumes it
//! through the [`EmployeeDirectory`] trait and commits each step's result
//! immediately on success. [`HttpDirectory`] talks to the real REST service;
//! [`InMemoryDirectory`] is the test double.

#![allow(async_fn_in_trait)]

pub mod client;
pub mod mock;
pub mod traits;

pub use client::{DirectoryConfig, HttpDirectory};
pub use mock::InMemoryDirectory;
pub use traits::EmployeeDirectory;
