//! Domain types, the storage trait, and the pure attendance computations for
//! Rollcall.
//!
//! No HTTP or database code lives here. The store crate implements
//! [`store::AttendanceStore`]; the API crate calls [`workflow`] and
//! [`aggregate`].

// Store impls use native `async fn`; the trait itself spells out `Send`.
#![allow(async_fn_in_trait)]

pub mod aggregate;
pub mod attendance;
pub mod cache;
pub mod error;
pub mod identity;
pub mod month;
pub mod store;
pub mod student;
pub mod subject;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
