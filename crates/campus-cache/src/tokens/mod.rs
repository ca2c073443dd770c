//! Short-lived token storage module.

mod temp_url;

pub use temp_url::{TempUrlData, TempUrlStore};
