pub mod summary;
pub mod table;
