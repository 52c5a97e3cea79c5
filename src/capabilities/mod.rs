//! Capability Definitions
//!
//! Each submodule declares one capability type: its slots, typed
//! Arguments/Output and the process-wide action spec binding them.

pub mod dismiss_alarm;

pub use dismiss_alarm::DismissAlarm;
