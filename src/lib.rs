pub mod api;
pub mod config;
pub mod db;
pub mod engine;
pub mod models;
pub mod state;
