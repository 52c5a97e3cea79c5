//! Binding Layer
//!
//! Structured values, converters, action specs and capabilities.

pub mod capability;
pub mod converters;
pub mod error;
pub mod spec;
pub mod value;

pub use capability::{
    Capability, CapabilityBuilder, CapabilityDescriptor, CapabilityHandle, ExecutionSession,
    FnSession, Property, Slot,
};
pub use converters::{
    BoolConverter, ConverterTable, EntityConverter, NumberConverter, ParamValueConverter,
    StringConverter,
};
pub use error::{BindingError, BindingResult};
pub use spec::{ActionSpec, ActionSpecBuilder, BuildArguments};
pub use value::{ParamValue, Struct, FIELD_NAME_TYPE};
