pub mod alerts;
pub mod appointments;
pub mod assignments;
pub mod engine;
pub mod health;
