//! Builtin Types
//!
//! Entity and status types exchanged with the assistant host.

mod alarm;
mod status;

pub use alarm::{Alarm, AlarmValue, AlarmValueConverter, ALARM_TYPE};
pub use status::{GenericErrorStatus, SuccessStatus};
