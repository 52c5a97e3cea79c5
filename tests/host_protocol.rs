//! Host registry behavior over the JSON invocation envelope.

use app_actions::binding::{BindingError, CapabilityHandle, FnSession, Property};
use app_actions::capabilities::dismiss_alarm::{Arguments, Output};
use app_actions::host::AlarmClock;
use app_actions::types::{Alarm, SuccessStatus};
use app_actions::{CapabilityRegistry, DismissAlarm, Invocation};
use serde_json::{json, Value};

async fn registry_with_clock(alarms: &[&str]) -> CapabilityRegistry {
    let registry = CapabilityRegistry::new();
    let capability = DismissAlarm::builder()
        .set_id("alarm-clock")
        .set_alarm_property(
            Property::new()
                .required(true)
                .possible_value(Alarm::new().with_identifier("alarm-1").with_name("Morning")),
        )
        .set_execution_session(AlarmClock::new(alarms.iter().copied()))
        .build()
        .unwrap();
    registry.register_instance(capability).await.unwrap();
    registry
}

fn invocation(value: Value) -> Invocation {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn test_dismiss_through_registry() {
    let registry = registry_with_clock(&["alarm-1"]).await;

    let response = registry
        .execute(&invocation(json!({
            "capability": "actions.intent.DISMISS_ALARM",
            "params": {"alarm": {"@type": "Alarm", "identifier": "alarm-1"}}
        })))
        .await
        .unwrap();
    assert_eq!(
        serde_json::to_value(&response.fields).unwrap(),
        json!({"executionStatus": {"@type": "SuccessStatus(description=dismissed alarm-1)"}})
    );

    let again = registry
        .execute(&invocation(json!({
            "capability": "actions.intent.DISMISS_ALARM",
            "params": {"alarm": "alarm-1"}
        })))
        .await
        .unwrap();
    assert_eq!(
        again.fields["executionStatus"].type_name(),
        Some("GenericErrorStatus(description=no active alarm alarm-1)")
    );
}

#[tokio::test]
async fn test_registry_keys_by_capability_name() {
    let registry = registry_with_clock(&["alarm-1"]).await;
    let second = DismissAlarm::builder()
        .set_id("bedroom-clock")
        .set_execution_session(AlarmClock::new(["alarm-2"]))
        .build()
        .unwrap();

    let err = registry.register_instance(second).await.unwrap_err();
    assert!(matches!(
        err,
        BindingError::AlreadyRegistered(ref name) if name == "actions.intent.DISMISS_ALARM"
    ));
    assert_eq!(
        registry.capability_names().await,
        vec!["actions.intent.DISMISS_ALARM".to_string()]
    );

    let capability = registry.get("actions.intent.DISMISS_ALARM").await.unwrap();
    assert_eq!(capability.id(), "alarm-clock");
}

#[tokio::test]
async fn test_required_alarm_slot() {
    let registry = registry_with_clock(&["alarm-1"]).await;
    let err = registry
        .execute(&invocation(json!({"capability": "actions.intent.DISMISS_ALARM"})))
        .await
        .unwrap_err();
    assert!(matches!(err, BindingError::MissingRequiredSlot(ref slot) if slot == "alarm"));
}

#[tokio::test]
async fn test_batch_preserves_order() {
    let registry = registry_with_clock(&["a", "b"]).await;
    let batch = vec![
        invocation(json!({"capability": "actions.intent.DISMISS_ALARM", "params": {"alarm": "a"}})),
        invocation(json!({"capability": "actions.intent.SNOOZE_ALARM", "params": {}})),
        invocation(json!({"capability": "actions.intent.DISMISS_ALARM", "params": {"alarm": "b"}})),
    ];

    let results = registry.execute_batch(&batch).await;
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(BindingError::UnknownCapability(_))));
    assert!(results[2].is_ok());
}

#[tokio::test]
async fn test_describe_all() {
    let registry = registry_with_clock(&[]).await;
    let descriptions = registry.describe_all().await;
    assert_eq!(descriptions.len(), 1);

    let description = &descriptions[0];
    assert_eq!(description["name"], "actions.intent.DISMISS_ALARM");
    assert_eq!(description["id"], "alarm-clock");
    assert_eq!(description["parameters"][0]["name"], "alarm");
    assert_eq!(description["parameters"][0]["required"], true);
    assert_eq!(
        description["parameters"][0]["possibleValues"][0],
        json!({"@type": "Alarm", "identifier": "alarm-1", "name": "Morning"})
    );
    assert!(description["parameters"][0]["schema"].is_object());
    assert_eq!(description["outputs"], json!(["executionStatus"]));
}

#[tokio::test]
async fn test_closure_session_registration() {
    let registry = CapabilityRegistry::new();
    let capability = DismissAlarm::builder()
        .set_execution_session(FnSession::new(|_: Arguments| async {
            let output = Output::builder().set_execution_status(SuccessStatus::new()).build();
            Ok::<_, anyhow::Error>(output)
        }))
        .build()
        .unwrap();
    registry.register_instance(capability).await.unwrap();

    let reply: Value = serde_json::from_str(
        &registry
            .handle_line(r#"{"capability": "actions.intent.DISMISS_ALARM"}"#)
            .await,
    )
    .unwrap();
    assert_eq!(reply, json!({
        "capability": "actions.intent.DISMISS_ALARM",
        "fields": {"executionStatus": {"@type": "SuccessStatus"}}
    }));
}
