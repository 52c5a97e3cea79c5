//! Capabilities
//!
//! A capability couples a shared [`ActionSpec`] with per-slot properties and
//! the user-supplied execution logic, and is what a host registers and
//! invokes by name.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use super::converters::ParamValueConverter;
use super::error::{BindingError, BindingResult};
use super::spec::{ActionSpec, BuildArguments};
use super::value::{ParamValue, Struct};

/// A named input position declared by a capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub name: &'static str,
    pub path: &'static str,
}

impl Slot {
    pub const fn new(name: &'static str, path: &'static str) -> Self {
        Self { name, path }
    }
}

/// Name, slot registry and action spec of one capability type
pub struct CapabilityDescriptor<B, O> {
    name: String,
    slots: Vec<Slot>,
    spec: Arc<ActionSpec<B, O>>,
}

impl<B: BuildArguments, O: 'static> CapabilityDescriptor<B, O> {
    /// Every slot must be unique and bound by `spec`
    pub fn new(slots: &[Slot], spec: Arc<ActionSpec<B, O>>) -> BindingResult<Self> {
        let mut seen: Vec<&str> = Vec::with_capacity(slots.len());
        for slot in slots {
            if seen.contains(&slot.path) {
                return Err(BindingError::DuplicateSlot(slot.path.to_string()));
            }
            if !spec.is_bound(slot.path) {
                return Err(BindingError::UnboundSlot(slot.path.to_string()));
            }
            seen.push(slot.path);
        }
        Ok(Self {
            name: spec.capability_name().to_string(),
            slots: slots.to_vec(),
            spec,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn spec(&self) -> &Arc<ActionSpec<B, O>> {
        &self.spec
    }
}

/// Declared constraints for one slot
#[derive(Debug, Clone, PartialEq)]
pub struct Property<T> {
    required: bool,
    possible_values: Vec<T>,
}

impl<T> Default for Property<T> {
    fn default() -> Self {
        Self {
            required: false,
            possible_values: Vec::new(),
        }
    }
}

impl<T> Property<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn possible_value(mut self, value: T) -> Self {
        self.possible_values.push(value);
        self
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn possible_values(&self) -> &[T] {
        &self.possible_values
    }
}

/// A property with its values already in wire form
#[derive(Debug, Clone)]
struct PropertyDescriptor {
    required: bool,
    possible_values: Vec<ParamValue>,
    schema: Value,
}

/// User-supplied execution logic of a capability
#[async_trait]
pub trait ExecutionSession<A, O>: Send + Sync
where
    A: Send + 'static,
    O: Send + 'static,
{
    async fn on_execute(&self, arguments: A) -> anyhow::Result<O>;
}

/// Adapts an async closure into an [`ExecutionSession`]
pub struct FnSession<F>(F);

impl<F> FnSession<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<A, O, F, Fut> ExecutionSession<A, O> for FnSession<F>
where
    A: Send + 'static,
    O: Send + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
{
    async fn on_execute(&self, arguments: A) -> anyhow::Result<O> {
        (self.0)(arguments).await
    }
}

/// Builder for a [`Capability`] over a shared action spec
pub struct CapabilityBuilder<B: BuildArguments, O: Send + 'static> {
    spec: Arc<ActionSpec<B, O>>,
    id: Option<String>,
    properties: BTreeMap<String, PropertyDescriptor>,
    session: Option<Arc<dyn ExecutionSession<B::Arguments, O>>>,
    error: Option<BindingError>,
}

impl<B, O> CapabilityBuilder<B, O>
where
    B: BuildArguments,
    O: Send + 'static,
{
    pub fn new(spec: Arc<ActionSpec<B, O>>) -> Self {
        Self {
            spec,
            id: None,
            properties: BTreeMap::new(),
            session: None,
            error: None,
        }
    }

    /// Identifier of this capability instance; defaults to the capability name
    pub fn set_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn set_property<V, C>(
        mut self,
        slot_path: &str,
        property: Property<V>,
        converter: C,
    ) -> Self
    where
        V: JsonSchema,
        C: ParamValueConverter<V>,
    {
        if !self.spec.is_bound(slot_path) {
            if self.error.is_none() {
                self.error = Some(BindingError::UnboundSlot(slot_path.to_string()));
            }
            return self;
        }

        let schema = serde_json::to_value(schemars::schema_for!(V)).unwrap_or(Value::Null);
        let descriptor = PropertyDescriptor {
            required: property.is_required(),
            possible_values: property
                .possible_values()
                .iter()
                .map(|v| converter.to_param_value(v))
                .collect(),
            schema,
        };
        self.properties.insert(slot_path.to_string(), descriptor);
        self
    }

    pub fn set_execution_session<S>(mut self, session: S) -> Self
    where
        S: ExecutionSession<B::Arguments, O> + 'static,
    {
        self.session = Some(Arc::new(session));
        self
    }

    pub fn build(self) -> BindingResult<Capability<B, O>> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let name = self.spec.capability_name().to_string();
        let session = self.session.ok_or_else(|| BindingError::IncompleteCapability {
            capability: name.clone(),
            missing: "execution session".to_string(),
        })?;

        Ok(Capability {
            id: self.id.unwrap_or_else(|| name.clone()),
            name,
            spec: self.spec,
            properties: self.properties,
            session,
        })
    }
}

/// A configured, invocable capability
pub struct Capability<B: BuildArguments, O: Send + 'static> {
    id: String,
    name: String,
    spec: Arc<ActionSpec<B, O>>,
    properties: BTreeMap<String, PropertyDescriptor>,
    session: Arc<dyn ExecutionSession<B::Arguments, O>>,
}

/// Object-safe view of a capability, used by hosts to store capabilities of
/// different Arguments/Output types side by side
#[async_trait]
pub trait CapabilityHandle: Send + Sync {
    /// Capability name, e.g. `actions.intent.DISMISS_ALARM`
    fn name(&self) -> &str;

    /// Identifier of this capability instance
    fn id(&self) -> &str;

    /// JSON description of the capability's parameters and outputs
    fn describe(&self) -> Value;

    /// Decode `params`, run the execution session and encode its output
    async fn execute(&self, params: &Struct) -> BindingResult<Struct>;
}

#[async_trait]
impl<B, O> CapabilityHandle for Capability<B, O>
where
    B: BuildArguments,
    O: Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn describe(&self) -> Value {
        let parameters: Vec<Value> = self
            .spec
            .slot_paths()
            .map(|path| match self.properties.get(path) {
                Some(p) => json!({
                    "name": path,
                    "required": p.required,
                    "possibleValues": p.possible_values,
                    "schema": p.schema,
                }),
                None => json!({ "name": path, "required": false }),
            })
            .collect();

        json!({
            "name": self.name,
            "id": self.id,
            "parameters": parameters,
            "outputs": self.spec.output_fields().collect::<Vec<_>>(),
        })
    }

    async fn execute(&self, params: &Struct) -> BindingResult<Struct> {
        for (path, property) in &self.properties {
            let present = params.get(path).map(|v| !v.is_null()).unwrap_or(false);
            if property.required && !present {
                return Err(BindingError::MissingRequiredSlot(path.clone()));
            }
        }

        let arguments = self.spec.decode(params)?;
        debug!("{}: executing {}", self.id, self.name);

        let output = self.session.on_execute(arguments).await.map_err(|e| {
            warn!("{}: execution failed: {:#}", self.id, e);
            BindingError::Execution(format!("{:#}", e))
        })?;

        Ok(self.spec.encode(&output))
    }
}
