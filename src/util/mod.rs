pub mod config;
pub mod database;
pub mod log;
pub mod rag;
pub mod string;
