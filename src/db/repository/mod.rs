pub mod alert;
pub mod appointment;
pub mod assignment;
