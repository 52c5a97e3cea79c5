//! Architecture Verification Suite
//!
//! Specs and capabilities are shared read-only across invocation threads,
//! so every shared piece must stay `Send + Sync`.

#[cfg(test)]
mod architecture_tests {
    use app_actions::binding::{Capability, CapabilityHandle, ConverterTable};
    use app_actions::capabilities::dismiss_alarm::{
        ArgumentsBuilder, DismissAlarmSpec, Output, ACTION_SPEC,
    };
    use app_actions::host::AlarmClock;
    use app_actions::CapabilityRegistry;
    use std::sync::Arc;

    #[test]
    fn test_shared_configuration_is_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}

        assert_send_sync::<DismissAlarmSpec>();
        assert_send_sync::<Capability<ArgumentsBuilder, Output>>();
        assert_send_sync::<Arc<dyn CapabilityHandle>>();
        assert_send_sync::<CapabilityRegistry>();
        assert_send_sync::<ConverterTable>();
        assert_send_sync::<AlarmClock>();
    }

    #[test]
    fn test_spec_decodes_concurrently() {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                std::thread::spawn(move || {
                    let params = app_actions::Struct::from([(
                        "alarm".to_string(),
                        app_actions::ParamValue::string(format!("alarm-{}", i)),
                    )]);
                    ACTION_SPEC.decode(&params).unwrap()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let args = handle.join().unwrap();
            let expected = format!("alarm-{}", i);
            assert_eq!(args.alarm().and_then(|a| a.identifier()), Some(expected.as_str()));
        }
    }
}
