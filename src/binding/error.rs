//! Binding Errors
//!
//! Configuration errors surface when a spec or capability is built and are
//! fatal to registration. Decode and execution errors are per-invocation.

use thiserror::Error;

/// Errors produced by the capability binding layer
#[derive(Debug, Error)]
pub enum BindingError {
    /// The same slot path was bound twice on one spec builder
    #[error("slot '{0}' is already bound")]
    DuplicateSlot(String),

    /// The same output field was bound twice on one spec builder
    #[error("output field '{0}' is already bound")]
    DuplicateOutput(String),

    /// No converter is registered for the value type of a slot
    #[error("no converter registered for slot '{slot}' (value type {type_name})")]
    MissingConverter { slot: String, type_name: &'static str },

    /// A capability property refers to a slot the spec never bound
    #[error("slot '{0}' is not bound by the action spec")]
    UnboundSlot(String),

    /// A capability builder was finalized without a required piece
    #[error("capability '{capability}' is incomplete: {missing}")]
    IncompleteCapability { capability: String, missing: String },

    /// A converter was handed a value whose shape does not match its type
    #[error("invalid {type_name} value: {reason}")]
    InvalidValue { type_name: String, reason: String },

    /// An inbound value did not match the schema expected by its converter
    #[error("malformed value for '{slot}': {reason}")]
    MalformedValue { slot: String, reason: String },

    /// A slot declared as required was absent from the inbound parameters
    #[error("missing required slot '{0}'")]
    MissingRequiredSlot(String),

    /// No capability is registered under the invoked name
    #[error("unknown capability: {0}")]
    UnknownCapability(String),

    /// A capability with the same identifier is already registered
    #[error("capability '{0}' is already registered")]
    AlreadyRegistered(String),

    /// The user-supplied execution session failed
    #[error("execution failed: {0}")]
    Execution(String),
}

impl BindingError {
    pub fn invalid(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed(slot: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedValue {
            slot: slot.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error was caused by capability configuration rather than
    /// by a single invocation
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            BindingError::DuplicateSlot(_)
                | BindingError::DuplicateOutput(_)
                | BindingError::MissingConverter { .. }
                | BindingError::UnboundSlot(_)
                | BindingError::IncompleteCapability { .. }
                | BindingError::AlreadyRegistered(_)
        )
    }
}

pub type BindingResult<T> = std::result::Result<T, BindingError>;
