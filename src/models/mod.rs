pub mod alert;
pub mod appointment;
pub mod assignment;
pub mod enums;

pub use alert::{Alert, AlertPatch};
pub use appointment::{Appointment, NewAppointment};
pub use assignment::{NewServiceAssignment, ServiceAssignment};
pub use enums::{AppointmentStatus, Audience, ReminderStage};
