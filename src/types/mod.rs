//! Type definitions for dealerdash

mod error;
mod report;
mod sales;

pub use error::*;
pub use report::*;
pub use sales::*;

/// Borrow an optional collection as a slice, treating "not loaded" as empty.
pub fn or_empty<T>(items: Option<&Vec<T>>) -> &[T] {
    items.map(Vec::as_slice).unwrap_or(&[])
}
