pub mod connectivity;
pub mod import;
pub mod memory;
pub mod sqlite;
