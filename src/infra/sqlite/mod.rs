pub mod cache;
pub mod schema;
