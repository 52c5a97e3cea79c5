//! Value Converters
//!
//! Pure, stateless, bidirectional mappings between a domain value type and
//! its structured wire form, plus a table for looking converters up by type.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::warn;

use super::error::{BindingError, BindingResult};
use super::value::{ParamValue, FIELD_NAME_TYPE};

/// Bidirectional converter between `T` and [`ParamValue`]
///
/// Implementations must be deterministic and side-effect free.
/// Decoding fails with [`BindingError::InvalidValue`] when the value's shape
/// does not match the schema of `T`; the action spec that owns the binding
/// reports it as [`BindingError::MalformedValue`] for the slot.
pub trait ParamValueConverter<T>: Send + Sync {
    fn to_param_value(&self, value: &T) -> ParamValue;

    fn from_param_value(&self, value: &ParamValue) -> BindingResult<T>;
}

impl<T, C> ParamValueConverter<T> for Arc<C>
where
    C: ParamValueConverter<T> + ?Sized,
{
    fn to_param_value(&self, value: &T) -> ParamValue {
        (**self).to_param_value(value)
    }

    fn from_param_value(&self, value: &ParamValue) -> BindingResult<T> {
        (**self).from_param_value(value)
    }
}

fn unexpected(expected: &str, got: &ParamValue) -> BindingError {
    BindingError::invalid(expected, format!("expected {}, got {}", expected, got.kind()))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringConverter;

impl ParamValueConverter<String> for StringConverter {
    fn to_param_value(&self, value: &String) -> ParamValue {
        ParamValue::String(value.clone())
    }

    fn from_param_value(&self, value: &ParamValue) -> BindingResult<String> {
        value.as_str().map(str::to_string).ok_or_else(|| unexpected("string", value))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoolConverter;

impl ParamValueConverter<bool> for BoolConverter {
    fn to_param_value(&self, value: &bool) -> ParamValue {
        ParamValue::Bool(*value)
    }

    fn from_param_value(&self, value: &ParamValue) -> BindingResult<bool> {
        value.as_bool().ok_or_else(|| unexpected("bool", value))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NumberConverter;

impl ParamValueConverter<f64> for NumberConverter {
    fn to_param_value(&self, value: &f64) -> ParamValue {
        ParamValue::Number(*value)
    }

    fn from_param_value(&self, value: &ParamValue) -> BindingResult<f64> {
        value.as_f64().ok_or_else(|| unexpected("number", value))
    }
}

/// Converter for serde-backed entity types tagged with an `@type` field
pub struct EntityConverter<T> {
    type_name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> EntityConverter<T> {
    pub const fn of(type_name: &'static str) -> Self {
        Self {
            type_name,
            _marker: PhantomData,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl<T> ParamValueConverter<T> for EntityConverter<T>
where
    T: Serialize + DeserializeOwned,
{
    fn to_param_value(&self, value: &T) -> ParamValue {
        let mut encoded = match serde_json::to_value(value) {
            Ok(json) => ParamValue::from(json),
            Err(e) => {
                warn!("Failed to encode {} entity: {}", self.type_name, e);
                return ParamValue::Null;
            }
        };
        if let ParamValue::Struct(fields) = &mut encoded {
            fields.retain(|_, v| !v.is_null());
            fields.insert(FIELD_NAME_TYPE.to_string(), ParamValue::string(self.type_name));
        }
        encoded
    }

    fn from_param_value(&self, value: &ParamValue) -> BindingResult<T> {
        let fields = value.as_struct().ok_or_else(|| unexpected("struct", value))?;

        match fields.get(FIELD_NAME_TYPE) {
            Some(tag) => match tag.as_str() {
                Some(name) if name == self.type_name => {}
                Some(name) => {
                    return Err(BindingError::invalid(
                        self.type_name,
                        format!("expected @type '{}', got '{}'", self.type_name, name),
                    ))
                }
                None => return Err(unexpected("string @type", tag)),
            },
            None => {
                return Err(BindingError::invalid(
                    self.type_name,
                    format!("missing {} field", FIELD_NAME_TYPE),
                ))
            }
        }

        let mut json = value.to_json();
        if let Some(object) = json.as_object_mut() {
            object.remove(FIELD_NAME_TYPE);
        }
        serde_json::from_value(json)
            .map_err(|e| BindingError::invalid(self.type_name, e.to_string()))
    }
}

/// Converters keyed by the Rust type they convert
#[derive(Default, Clone)]
pub struct ConverterTable {
    converters: HashMap<TypeId, (&'static str, Arc<dyn Any + Send + Sync>)>,
}

impl ConverterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table preloaded with the scalar converters
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table
            .register::<String, _>(StringConverter)
            .register::<bool, _>(BoolConverter)
            .register::<f64, _>(NumberConverter);
        table
    }

    /// Register (or replace) the converter for `T`
    pub fn register<T, C>(&mut self, converter: C) -> &mut Self
    where
        T: 'static,
        C: ParamValueConverter<T> + 'static,
    {
        let converter: Arc<dyn ParamValueConverter<T>> = Arc::new(converter);
        let entry: Arc<dyn Any + Send + Sync> = Arc::new(converter);
        self.converters.insert(TypeId::of::<T>(), (type_name::<T>(), entry));
        self
    }

    /// Look up the converter for `T`
    pub fn get<T: 'static>(&self) -> Option<Arc<dyn ParamValueConverter<T>>> {
        self.converters
            .get(&TypeId::of::<T>())
            .and_then(|(_, entry)| entry.downcast_ref::<Arc<dyn ParamValueConverter<T>>>())
            .cloned()
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.converters.contains_key(&TypeId::of::<T>())
    }

    /// Names of the registered value types
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.converters.values().map(|(name, _)| *name).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for ConverterTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterTable").field("types", &self.type_names()).finish()
    }
}
