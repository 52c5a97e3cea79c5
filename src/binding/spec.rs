//! Action Spec
//!
//! The compiled, immutable binding between a capability's typed
//! Arguments/Output and the structured wire schema. Built once per
//! capability type through [`ActionSpecBuilder`] and shared read-only.

use std::fmt;
use tracing::trace;

use super::converters::{ConverterTable, ParamValueConverter};
use super::error::{BindingError, BindingResult};
use super::value::{ParamValue, Struct};

/// Accumulates per-slot setters and is finalized once into an Arguments value
pub trait BuildArguments: Default + Send + 'static {
    type Arguments: Send + 'static;

    fn build(self) -> Self::Arguments;
}

type SlotDecoder<B> = Box<dyn Fn(B, &ParamValue) -> BindingResult<B> + Send + Sync>;
type FieldEncoder<O> = Box<dyn Fn(&O) -> Option<ParamValue> + Send + Sync>;

struct ParamBinding<B> {
    path: String,
    decode: SlotDecoder<B>,
}

struct OutputBinding<O> {
    field: String,
    encode: FieldEncoder<O>,
}

/// Builder for an [`ActionSpec`]
///
/// Configuration errors (duplicate slot, duplicate output field, missing
/// converter) are recorded as bindings are added and returned from
/// [`ActionSpecBuilder::build`]; the first one wins.
pub struct ActionSpecBuilder<B, O> {
    capability_name: String,
    params: Vec<ParamBinding<B>>,
    outputs: Vec<OutputBinding<O>>,
    error: Option<BindingError>,
}

impl<B: BuildArguments, O: 'static> ActionSpecBuilder<B, O> {
    pub fn of_capability_named(name: impl Into<String>) -> Self {
        Self {
            capability_name: name.into(),
            params: Vec::new(),
            outputs: Vec::new(),
            error: None,
        }
    }

    fn record(&mut self, error: BindingError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Decode the inbound field at `slot_path` with `converter` and store it
    /// through `setter`
    pub fn bind_parameter<V, S, C>(
        mut self,
        slot_path: impl Into<String>,
        setter: S,
        converter: C,
    ) -> Self
    where
        V: 'static,
        S: Fn(B, V) -> B + Send + Sync + 'static,
        C: ParamValueConverter<V> + 'static,
    {
        let path = slot_path.into();
        if self.params.iter().any(|p| p.path == path) {
            self.record(BindingError::DuplicateSlot(path));
            return self;
        }

        let slot = path.clone();
        let decode: SlotDecoder<B> = Box::new(move |builder, value| {
            let decoded = converter.from_param_value(value).map_err(|e| match e {
                BindingError::InvalidValue { reason, .. }
                | BindingError::MalformedValue { reason, .. } => {
                    BindingError::malformed(slot.clone(), reason)
                }
                other => other,
            })?;
            Ok(setter(builder, decoded))
        });
        self.params.push(ParamBinding { path, decode });
        self
    }

    /// Like [`Self::bind_parameter`], with the converter looked up in `table`
    /// by value type
    pub fn bind_parameter_from_table<V, S>(
        self,
        slot_path: impl Into<String>,
        setter: S,
        table: &ConverterTable,
    ) -> Self
    where
        V: 'static,
        S: Fn(B, V) -> B + Send + Sync + 'static,
    {
        let path = slot_path.into();
        match table.get::<V>() {
            Some(converter) => self.bind_parameter(path, setter, converter),
            None => {
                let mut this = self;
                this.record(BindingError::MissingConverter {
                    slot: path,
                    type_name: std::any::type_name::<V>(),
                });
                this
            }
        }
    }

    /// Encode the output field read by `getter` with `encoder` into `field`.
    /// Absent fields are omitted from the response.
    pub fn bind_output<F, G, E>(mut self, field: impl Into<String>, getter: G, encoder: E) -> Self
    where
        F: 'static,
        G: for<'a> Fn(&'a O) -> Option<&'a F> + Send + Sync + 'static,
        E: Fn(&F) -> ParamValue + Send + Sync + 'static,
    {
        let field = field.into();
        if self.outputs.iter().any(|o| o.field == field) {
            self.record(BindingError::DuplicateOutput(field));
            return self;
        }

        let encode: FieldEncoder<O> = Box::new(move |output| getter(output).map(&encoder));
        self.outputs.push(OutputBinding { field, encode });
        self
    }

    pub fn build(self) -> BindingResult<ActionSpec<B, O>> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(ActionSpec {
            capability_name: self.capability_name,
            params: self.params,
            outputs: self.outputs,
        })
    }
}

/// Immutable, thread-safe argument/output binding for one capability type
pub struct ActionSpec<B, O> {
    capability_name: String,
    params: Vec<ParamBinding<B>>,
    outputs: Vec<OutputBinding<O>>,
}

impl<B: BuildArguments, O: 'static> ActionSpec<B, O> {
    pub fn capability_name(&self) -> &str {
        &self.capability_name
    }

    /// Bound slot paths, in binding order
    pub fn slot_paths(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.path.as_str())
    }

    /// Bound output field names, in binding order
    pub fn output_fields(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(|o| o.field.as_str())
    }

    pub fn is_bound(&self, slot_path: &str) -> bool {
        self.params.iter().any(|p| p.path == slot_path)
    }

    /// Decode inbound parameters into Arguments.
    ///
    /// Absent or null slots leave their field unset and unknown fields are
    /// ignored. A malformed value fails the whole decode.
    pub fn decode(&self, params: &Struct) -> BindingResult<B::Arguments> {
        let mut builder = B::default();
        for binding in &self.params {
            match params.get(&binding.path) {
                Some(value) if !value.is_null() => builder = (binding.decode)(builder, value)?,
                _ => {}
            }
        }

        for field in params.keys().filter(|k| !self.is_bound(k)) {
            trace!("{}: ignoring unbound field '{}'", self.capability_name, field);
        }

        Ok(builder.build())
    }

    /// Encode an Output into response fields, omitting absent fields
    pub fn encode(&self, output: &O) -> Struct {
        self.outputs
            .iter()
            .filter_map(|binding| (binding.encode)(output).map(|v| (binding.field.clone(), v)))
            .collect()
    }
}

impl<B, O> fmt::Debug for ActionSpec<B, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionSpec")
            .field("capability_name", &self.capability_name)
            .field("slots", &self.params.iter().map(|p| &p.path).collect::<Vec<_>>())
            .field("outputs", &self.outputs.iter().map(|o| &o.field).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::converters::{BoolConverter, StringConverter};

    #[derive(Debug, Default, PartialEq)]
    struct TimerArgs {
        label: Option<String>,
        vibrate: Option<bool>,
    }

    #[derive(Default)]
    struct TimerArgsBuilder(TimerArgs);

    impl TimerArgsBuilder {
        fn set_label(mut self, label: String) -> Self {
            self.0.label = Some(label);
            self
        }

        fn set_vibrate(mut self, vibrate: bool) -> Self {
            self.0.vibrate = Some(vibrate);
            self
        }
    }

    impl BuildArguments for TimerArgsBuilder {
        type Arguments = TimerArgs;

        fn build(self) -> TimerArgs {
            self.0
        }
    }

    struct TimerOutput {
        message: Option<String>,
    }

    impl TimerOutput {
        fn message(&self) -> Option<&String> {
            self.message.as_ref()
        }
    }

    type TimerSpecBuilder = ActionSpecBuilder<TimerArgsBuilder, TimerOutput>;

    fn timer_spec() -> ActionSpec<TimerArgsBuilder, TimerOutput> {
        ActionSpecBuilder::of_capability_named("actions.intent.START_TIMER")
            .bind_parameter("timer.label", TimerArgsBuilder::set_label, StringConverter)
            .bind_parameter("timer.vibrate", TimerArgsBuilder::set_vibrate, BoolConverter)
            .bind_output("message", TimerOutput::message, |m: &String| {
                ParamValue::string(m.as_str())
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_decode_present_absent_and_unknown() {
        let spec = timer_spec();
        let mut params = Struct::new();
        params.insert("timer.label".to_string(), ParamValue::string("tea"));
        params.insert("unrelated".to_string(), ParamValue::Number(1.0));

        let args = spec.decode(&params).unwrap();
        assert_eq!(
            args,
            TimerArgs {
                label: Some("tea".to_string()),
                vibrate: None
            }
        );
        assert_eq!(spec.decode(&Struct::new()).unwrap(), TimerArgs::default());
    }

    #[test]
    fn test_null_slot_is_absent() {
        let spec = timer_spec();
        let params = Struct::from([("timer.vibrate".to_string(), ParamValue::Null)]);
        assert_eq!(spec.decode(&params).unwrap().vibrate, None);
    }

    #[test]
    fn test_malformed_value_reports_slot() {
        let spec = timer_spec();
        let params = Struct::from([
            ("timer.label".to_string(), ParamValue::string("tea")),
            ("timer.vibrate".to_string(), ParamValue::string("yes")),
        ]);

        match spec.decode(&params) {
            Err(BindingError::MalformedValue { slot, reason }) => {
                assert_eq!(slot, "timer.vibrate");
                assert!(reason.contains("expected bool"));
            }
            other => panic!("expected malformed value, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_omits_absent_fields() {
        let spec = timer_spec();
        let encoded = spec.encode(&TimerOutput {
            message: Some("started".to_string()),
        });
        assert_eq!(encoded["message"], ParamValue::string("started"));
        assert!(spec.encode(&TimerOutput { message: None }).is_empty());
    }

    #[test]
    fn test_duplicate_slot_fails_build() {
        let result = TimerSpecBuilder::of_capability_named("dup")
            .bind_parameter("timer.label", TimerArgsBuilder::set_label, StringConverter)
            .bind_parameter("timer.label", TimerArgsBuilder::set_label, StringConverter)
            .build();
        assert!(matches!(result, Err(BindingError::DuplicateSlot(path)) if path == "timer.label"));
    }

    #[test]
    fn test_duplicate_output_fails_build() {
        let encode = |m: &String| ParamValue::string(m.as_str());
        let result = TimerSpecBuilder::of_capability_named("dup")
            .bind_output("message", TimerOutput::message, encode)
            .bind_output("message", TimerOutput::message, encode)
            .build();
        assert!(matches!(result, Err(BindingError::DuplicateOutput(_))));
    }

    #[test]
    fn test_missing_converter_in_table() {
        let table = ConverterTable::new();
        let result = TimerSpecBuilder::of_capability_named("timer")
            .bind_parameter_from_table("timer.label", TimerArgsBuilder::set_label, &table)
            .build();
        assert!(matches!(
            result,
            Err(BindingError::MissingConverter { slot, .. }) if slot == "timer.label"
        ));

        let table = ConverterTable::with_builtins();
        let spec = TimerSpecBuilder::of_capability_named("timer")
            .bind_parameter_from_table("timer.label", TimerArgsBuilder::set_label, &table)
            .build()
            .unwrap();
        assert_eq!(spec.slot_paths().collect::<Vec<_>>(), vec!["timer.label"]);
    }
}
