pub mod app;
pub mod config;
pub mod domain;
pub mod infra;
pub mod usecase;


/// Rows per page of the table view.
pub const PAGE_SIZE: usize = 50;
