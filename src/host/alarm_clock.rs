//! Alarm Clock
//!
//! In-memory alarm store backing the bundled DISMISS_ALARM session.

use async_trait::async_trait;
use std::collections::BTreeSet;
use tokio::sync::Mutex;
use tracing::info;

use crate::capabilities::dismiss_alarm::{Arguments, ExecutionStatus, Output};
use crate::binding::ExecutionSession;
use crate::types::{GenericErrorStatus, SuccessStatus};

/// Set of active alarm identifiers
pub struct AlarmClock {
    active: Mutex<BTreeSet<String>>,
}

impl AlarmClock {
    pub fn new<I, S>(alarms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            active: Mutex::new(alarms.into_iter().map(Into::into).collect()),
        }
    }

    pub async fn active_alarms(&self) -> Vec<String> {
        self.active.lock().await.iter().cloned().collect()
    }

    /// Dismiss an alarm by identifier, returning whether it was active
    pub async fn dismiss(&self, identifier: &str) -> bool {
        self.active.lock().await.remove(identifier)
    }
}

#[async_trait]
impl ExecutionSession<Arguments, Output> for AlarmClock {
    async fn on_execute(&self, arguments: Arguments) -> anyhow::Result<Output> {
        let status: ExecutionStatus = match arguments.alarm().and_then(|a| a.identifier()) {
            Some(id) => {
                if self.dismiss(id).await {
                    info!("Dismissed alarm {}", id);
                    SuccessStatus::new().with_description(format!("dismissed {}", id)).into()
                } else {
                    GenericErrorStatus::new()
                        .with_description(format!("no active alarm {}", id))
                        .into()
                }
            }
            None => GenericErrorStatus::new()
                .with_description("no alarm specified")
                .into(),
        };
        Ok(Output::builder().set_execution_status(status).build())
    }
}
