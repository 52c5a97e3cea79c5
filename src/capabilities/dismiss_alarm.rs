//! actions.intent.DISMISS_ALARM

use lazy_static::lazy_static;
use std::fmt;
use std::sync::Arc;

use crate::binding::{
    ActionSpec, ActionSpecBuilder, BindingResult, BuildArguments, Capability, CapabilityBuilder,
    CapabilityDescriptor, ExecutionSession, ParamValue, Property, Slot, FIELD_NAME_TYPE,
};
use crate::types::{Alarm, AlarmValue, AlarmValueConverter, GenericErrorStatus, SuccessStatus};

pub const CAPABILITY_NAME: &str = "actions.intent.DISMISS_ALARM";

/// Response field carrying the execution status
pub const EXECUTION_STATUS_FIELD: &str = "executionStatus";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotMetadata {
    Alarm,
}

impl SlotMetadata {
    pub const ALL: [SlotMetadata; 1] = [SlotMetadata::Alarm];

    pub const fn path(&self) -> &'static str {
        match self {
            SlotMetadata::Alarm => "alarm",
        }
    }

    pub const fn slot(&self) -> Slot {
        match self {
            SlotMetadata::Alarm => Slot::new("ALARM", self.path()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Arguments {
    alarm: Option<AlarmValue>,
}

impl Arguments {
    pub fn builder() -> ArgumentsBuilder {
        ArgumentsBuilder::default()
    }

    pub fn alarm(&self) -> Option<&AlarmValue> {
        self.alarm.as_ref()
    }
}

#[derive(Debug, Default)]
pub struct ArgumentsBuilder {
    alarm: Option<AlarmValue>,
}

impl ArgumentsBuilder {
    pub fn set_alarm(mut self, alarm: AlarmValue) -> Self {
        self.alarm = Some(alarm);
        self
    }
}

impl BuildArguments for ArgumentsBuilder {
    type Arguments = Arguments;

    fn build(self) -> Arguments {
        Arguments { alarm: self.alarm }
    }
}

/// Outcome of a dismissal; exactly one variant is ever set
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExecutionStatus {
    Success(SuccessStatus),
    GenericError(GenericErrorStatus),
}

impl ExecutionStatus {
    /// Lossy wire form: `{"@type": "<textual form>"}`
    pub fn to_param_value(&self) -> ParamValue {
        ParamValue::structure([(FIELD_NAME_TYPE, ParamValue::String(self.to_string()))])
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStatus::Success(status) => fmt::Display::fmt(status, f),
            ExecutionStatus::GenericError(status) => fmt::Display::fmt(status, f),
        }
    }
}

impl From<SuccessStatus> for ExecutionStatus {
    fn from(status: SuccessStatus) -> Self {
        ExecutionStatus::Success(status)
    }
}

impl From<GenericErrorStatus> for ExecutionStatus {
    fn from(status: GenericErrorStatus) -> Self {
        ExecutionStatus::GenericError(status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Output {
    execution_status: Option<ExecutionStatus>,
}

impl Output {
    pub fn builder() -> OutputBuilder {
        OutputBuilder::default()
    }

    pub fn execution_status(&self) -> Option<&ExecutionStatus> {
        self.execution_status.as_ref()
    }
}

#[derive(Debug, Default)]
pub struct OutputBuilder {
    execution_status: Option<ExecutionStatus>,
}

impl OutputBuilder {
    /// Accepts an [`ExecutionStatus`] or either status payload directly
    pub fn set_execution_status(mut self, status: impl Into<ExecutionStatus>) -> Self {
        self.execution_status = Some(status.into());
        self
    }

    pub fn build(self) -> Output {
        Output {
            execution_status: self.execution_status,
        }
    }
}

pub type DismissAlarmSpec = ActionSpec<ArgumentsBuilder, Output>;

lazy_static! {
    /// Process-wide binding for DISMISS_ALARM, built on first use
    pub static ref ACTION_SPEC: Arc<DismissAlarmSpec> = Arc::new(
        ActionSpecBuilder::of_capability_named(CAPABILITY_NAME)
            .bind_parameter(
                SlotMetadata::Alarm.path(),
                ArgumentsBuilder::set_alarm,
                AlarmValueConverter,
            )
            .bind_output(
                EXECUTION_STATUS_FIELD,
                Output::execution_status,
                ExecutionStatus::to_param_value,
            )
            .build()
            .expect("DISMISS_ALARM action spec is statically valid")
    );
}

/// Entry point for the DISMISS_ALARM capability
pub struct DismissAlarm;

impl DismissAlarm {
    pub fn descriptor() -> BindingResult<CapabilityDescriptor<ArgumentsBuilder, Output>> {
        let slots: Vec<Slot> = SlotMetadata::ALL.iter().map(SlotMetadata::slot).collect();
        CapabilityDescriptor::new(&slots, ACTION_SPEC.clone())
    }

    pub fn builder() -> DismissAlarmBuilder {
        DismissAlarmBuilder {
            inner: CapabilityBuilder::new(ACTION_SPEC.clone()),
        }
    }
}

/// Typed capability builder exposing DISMISS_ALARM's slot properties
pub struct DismissAlarmBuilder {
    inner: CapabilityBuilder<ArgumentsBuilder, Output>,
}

impl DismissAlarmBuilder {
    pub fn set_id(self, id: impl Into<String>) -> Self {
        Self {
            inner: self.inner.set_id(id),
        }
    }

    pub fn set_alarm_property(self, property: Property<Alarm>) -> Self {
        Self {
            inner: self
                .inner
                .set_property(SlotMetadata::Alarm.path(), property, Alarm::converter()),
        }
    }

    pub fn set_execution_session<S>(self, session: S) -> Self
    where
        S: ExecutionSession<Arguments, Output> + 'static,
    {
        Self {
            inner: self.inner.set_execution_session(session),
        }
    }

    pub fn build(self) -> BindingResult<Capability<ArgumentsBuilder, Output>> {
        self.inner.build()
    }
}
