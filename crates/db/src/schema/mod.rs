//! Table row types.

pub mod users;
