pub mod blob;
pub mod catalog;
pub mod db;
pub mod store;
pub mod types;
