pub mod not_found;
pub mod orion;
pub mod summary;
pub mod todo;
pub mod upload;
