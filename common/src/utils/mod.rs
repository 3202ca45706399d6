pub mod config;
pub mod hashing;
pub mod letters;
pub mod lines;
