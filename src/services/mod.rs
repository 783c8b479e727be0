//! Resource services: each operation validates its inputs, borrows one
//! pooled connection, runs the statements for the resource and maps the
//! outcome into the closed [`crate::error::ApiError`] taxonomy.

pub mod api_keys;
pub mod sessions;
pub mod stations;
pub mod users;
pub mod weather_data;
