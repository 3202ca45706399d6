pub mod error;
pub mod service;
pub mod storage;
pub mod utils;
