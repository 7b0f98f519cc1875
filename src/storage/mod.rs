pub mod list_storage;
pub mod local_save;
