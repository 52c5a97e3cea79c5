//! App Actions
//!
//! Typed argument/output binding for voice-assistant capabilities:
//! - Structured parameter values and converters
//! - Immutable per-capability action specs
//! - Capability builders with slot properties and execution sessions
//! - A host registry dispatching JSON invocations by capability name

pub mod binding;
pub mod types;
pub mod capabilities;
pub mod host;
pub mod utils;

// Re-exports for convenience
pub use crate::binding::{
    ActionSpec, ActionSpecBuilder, BindingError, BindingResult, ParamValue, Struct,
};
pub use capabilities::DismissAlarm;
pub use host::{CapabilityRegistry, Invocation, InvocationResponse};
