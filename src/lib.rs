pub mod catalog;
pub mod config;
pub mod engine;
pub mod util;
