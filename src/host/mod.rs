//! Capability Host
//!
//! Registry of invocable capabilities keyed by capability name, plus the
//! JSON invocation envelope a host exchanges with the assistant.

mod alarm_clock;
pub mod config;

pub use alarm_clock::AlarmClock;
pub use config::{ConfigManager, HostConfig};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::binding::{BindingError, BindingResult, CapabilityHandle, Struct};
use crate::utils::truncate_middle;

const MAX_LOGGED_LINE_BYTES: usize = 256;

/// A structured invocation of one capability
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invocation {
    /// Capability name, e.g. `actions.intent.DISMISS_ALARM`
    pub capability: String,
    /// Inbound parameters keyed by slot path
    #[serde(default)]
    pub params: Struct,
}

impl Invocation {
    pub fn new(capability: impl Into<String>, params: Struct) -> Self {
        Self {
            capability: capability.into(),
            params,
        }
    }
}

/// Encoded output of a successful invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvocationResponse {
    pub capability: String,
    pub fields: Struct,
}

/// Thread-safe registry of capabilities
#[derive(Default)]
pub struct CapabilityRegistry {
    capabilities: RwLock<HashMap<String, Arc<dyn CapabilityHandle>>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability instance. Names must be unique.
    pub async fn register_instance<C: CapabilityHandle + 'static>(
        &self,
        capability: C,
    ) -> BindingResult<()> {
        self.register_shared(Arc::new(capability)).await
    }

    pub async fn register_shared(
        &self,
        capability: Arc<dyn CapabilityHandle>,
    ) -> BindingResult<()> {
        let mut capabilities = self.capabilities.write().await;
        let name = capability.name().to_string();
        if capabilities.contains_key(&name) {
            return Err(BindingError::AlreadyRegistered(name));
        }
        info!("Registered capability {} (id: {})", name, capability.id());
        capabilities.insert(name, capability);
        Ok(())
    }

    /// Registered capability names, sorted
    pub async fn capability_names(&self) -> Vec<String> {
        let capabilities = self.capabilities.read().await;
        let mut names: Vec<String> = capabilities.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn get(&self, name: &str) -> Option<Arc<dyn CapabilityHandle>> {
        let capabilities = self.capabilities.read().await;
        capabilities.get(name).cloned()
    }

    /// Descriptions of every registered capability, sorted by name
    pub async fn describe_all(&self) -> Vec<Value> {
        let capabilities = self.capabilities.read().await;
        let mut entries: Vec<_> = capabilities.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter().map(|(_, c)| c.describe()).collect()
    }

    pub async fn execute(&self, invocation: &Invocation) -> BindingResult<InvocationResponse> {
        let capability = self
            .get(&invocation.capability)
            .await
            .ok_or_else(|| BindingError::UnknownCapability(invocation.capability.clone()))?;

        debug!("Invoking {} with {} field(s)", invocation.capability, invocation.params.len());
        let fields = capability.execute(&invocation.params).await?;

        Ok(InvocationResponse {
            capability: invocation.capability.clone(),
            fields,
        })
    }

    /// Execute several invocations concurrently, preserving order
    pub async fn execute_batch(
        &self,
        invocations: &[Invocation],
    ) -> Vec<BindingResult<InvocationResponse>> {
        let futures = invocations.iter().map(|invocation| self.execute(invocation));
        futures_util::future::join_all(futures).await
    }

    /// Handle one line of the host's JSON protocol and render the reply line
    pub async fn handle_line(&self, line: &str) -> String {
        let reply = match serde_json::from_str::<Invocation>(line) {
            Ok(invocation) => match self.execute(&invocation).await {
                Ok(response) => serde_json::to_value(&response)
                    .unwrap_or_else(|e| json!({ "error": e.to_string() })),
                Err(e) => {
                    warn!("Invocation of {} failed: {}", invocation.capability, e);
                    json!({ "capability": invocation.capability, "error": e.to_string() })
                }
            },
            Err(e) => {
                warn!(
                    "Rejected malformed invocation: {}",
                    truncate_middle(line, MAX_LOGGED_LINE_BYTES)
                );
                json!({ "error": format!("invalid invocation: {}", e) })
            }
        };
        reply.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::dismiss_alarm::{Arguments, Output};
    use crate::capabilities::DismissAlarm;
    use crate::binding::FnSession;
    use crate::types::SuccessStatus;

    fn dismiss_capability() -> impl CapabilityHandle {
        DismissAlarm::builder()
            .set_execution_session(FnSession::new(|_: Arguments| async {
                let output = Output::builder().set_execution_status(SuccessStatus::new()).build();
                Ok::<_, anyhow::Error>(output)
            }))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_register_and_execute() {
        let registry = CapabilityRegistry::new();
        registry.register_instance(dismiss_capability()).await.unwrap();
        assert_eq!(
            registry.capability_names().await,
            vec!["actions.intent.DISMISS_ALARM".to_string()]
        );

        let response = registry
            .execute(&Invocation::new("actions.intent.DISMISS_ALARM", Struct::new()))
            .await
            .unwrap();
        assert_eq!(response.fields["executionStatus"].type_name(), Some("SuccessStatus"));
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let registry = CapabilityRegistry::new();
        registry.register_instance(dismiss_capability()).await.unwrap();
        let err = registry.register_instance(dismiss_capability()).await.unwrap_err();
        assert!(matches!(err, BindingError::AlreadyRegistered(_)));
    }

    #[tokio::test]
    async fn test_unknown_capability() {
        let registry = CapabilityRegistry::new();
        let err = registry
            .execute(&Invocation::new("actions.intent.CREATE_ALARM", Struct::new()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BindingError::UnknownCapability(name) if name == "actions.intent.CREATE_ALARM"
        ));
    }

    #[tokio::test]
    async fn test_handle_line_replies() {
        let registry = CapabilityRegistry::new();
        registry.register_instance(dismiss_capability()).await.unwrap();

        let ok: Value = serde_json::from_str(
            &registry
                .handle_line(r#"{"capability": "actions.intent.DISMISS_ALARM", "params": {}}"#)
                .await,
        )
        .unwrap();
        assert_eq!(ok["fields"]["executionStatus"]["@type"], "SuccessStatus");

        let bad: Value = serde_json::from_str(&registry.handle_line("not json").await).unwrap();
        assert!(bad["error"].as_str().unwrap().starts_with("invalid invocation"));

        let malformed: Value = serde_json::from_str(
            &registry
                .handle_line(
                    r#"{"capability": "actions.intent.DISMISS_ALARM", "params": {"alarm": true}}"#,
                )
                .await,
        )
        .unwrap();
        assert!(malformed["error"].as_str().unwrap().contains("alarm"));
    }
}
