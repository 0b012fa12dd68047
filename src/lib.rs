pub mod app;
pub mod config;
pub mod error;
pub mod meals;
pub mod nutrition;
pub mod state;
pub mod targets;
