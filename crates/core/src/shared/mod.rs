pub mod config;
pub mod constants;
pub mod embedding;
pub mod error;
pub mod frame;
pub mod label;
pub mod prediction;
