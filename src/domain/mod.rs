pub mod diff;
pub mod entities;
pub mod store;
pub mod view;
