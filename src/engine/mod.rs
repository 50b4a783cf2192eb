pub mod driver;
pub mod evaluator;
pub mod reminders;
pub mod sweep;

pub use driver::{start_sweep_driver, SweepDriverHandle};
pub use evaluator::{evaluate_assignment, ConditionEvent, ConditionKind};
pub use reminders::{
    dispatch_due_reminders, send_booking_confirmation, DispatchSummary, LogDispatcher,
    ReminderDispatcher,
};
pub use sweep::{run_expiration_sweep, SweepSummary};
