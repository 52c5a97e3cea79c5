//! Alarm entity and its slot value wrapper.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::binding::{BindingError, BindingResult, EntityConverter, ParamValue, ParamValueConverter};

pub const ALARM_TYPE: &str = "Alarm";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Alarm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disambiguating_description: Option<String>,
}

impl Alarm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.disambiguating_description = Some(description.into());
        self
    }

    pub fn converter() -> EntityConverter<Alarm> {
        EntityConverter::of(ALARM_TYPE)
    }
}

/// Value of an alarm slot: a full entity, or a reference to an alarm the
/// app already knows by identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AlarmValue {
    Alarm(Alarm),
    Reference(String),
}

impl AlarmValue {
    /// Identifier of the referenced alarm, whichever form it came in
    pub fn identifier(&self) -> Option<&str> {
        match self {
            AlarmValue::Alarm(alarm) => alarm.identifier.as_deref(),
            AlarmValue::Reference(id) => Some(id),
        }
    }
}

impl From<Alarm> for AlarmValue {
    fn from(alarm: Alarm) -> Self {
        AlarmValue::Alarm(alarm)
    }
}

/// Struct values decode as [`AlarmValue::Alarm`], string values as
/// [`AlarmValue::Reference`]
#[derive(Debug, Clone, Copy, Default)]
pub struct AlarmValueConverter;

impl ParamValueConverter<AlarmValue> for AlarmValueConverter {
    fn to_param_value(&self, value: &AlarmValue) -> ParamValue {
        match value {
            AlarmValue::Alarm(alarm) => Alarm::converter().to_param_value(alarm),
            AlarmValue::Reference(id) => ParamValue::string(id.as_str()),
        }
    }

    fn from_param_value(&self, value: &ParamValue) -> BindingResult<AlarmValue> {
        match value {
            ParamValue::Struct(_) => Alarm::converter()
                .from_param_value(value)
                .map(AlarmValue::Alarm),
            ParamValue::String(id) => Ok(AlarmValue::Reference(id.clone())),
            other => Err(BindingError::invalid(
                ALARM_TYPE,
                format!("expected struct or identifier string, got {}", other.kind()),
            )),
        }
    }
}
