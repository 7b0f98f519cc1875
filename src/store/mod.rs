pub mod entities;
pub mod list_store;
