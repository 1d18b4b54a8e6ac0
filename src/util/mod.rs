pub mod common;
pub mod config;
pub mod password;
pub mod token;
