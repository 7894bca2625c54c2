//! Row structs for the `accounts` and `sessions` tables.
//!
//! Each row converts into the matching domain type from `maxpizza-core`.

pub mod account;
pub mod session;
