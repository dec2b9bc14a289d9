//! End-to-end lifecycle scenarios, driven through the wire format.
//!
//! These feed raw JSON payloads through [`WidgetMessage::decode`] and the
//! [`LoaderMachine`], the same path the browser glue uses, so they cover the
//! handshake as the embed document actually speaks it.

use anyhow::Result;
use sweeps_protocol::{
    LoaderAction, LoaderEvent, LoaderMachine, LoaderPhase, WidgetMessage, MAX_RETRIES,
    RETRY_DELAY_MS,
};

/// Feed one raw postMessage payload to the machine, dropping unrecognized
/// traffic exactly like the loader's message listener does.
fn deliver(machine: &mut LoaderMachine, raw: &str) -> Vec<LoaderAction> {
    match WidgetMessage::decode(raw) {
        Some(message) => machine.handle(LoaderEvent::Message(message)),
        None => Vec::new(),
    }
}

#[test]
fn successful_embed_handshake() -> Result<()> {
    let mut machine = LoaderMachine::new("abc-123");

    // Loader created the iframe; its document finished loading.
    machine.handle(LoaderEvent::FrameCreated);
    let actions = machine.handle(LoaderEvent::FrameLoaded);

    // The loader must now post INITIALIZE_WIDGET with the campaign id.
    let [LoaderAction::PostInitialize { sweepstakes_id }] = actions.as_slice() else {
        panic!("expected a single PostInitialize, got {actions:?}");
    };
    assert_eq!(sweepstakes_id, "abc-123");
    let wire = WidgetMessage::Initialize {
        sweepstakes_id: sweepstakes_id.clone(),
    }
    .encode()?;
    assert!(wire.contains(r#""type":"INITIALIZE_WIDGET""#));
    assert!(wire.contains(r#""sweepstakesId":"abc-123""#));

    // The embed side confirms its first render.
    deliver(&mut machine, r#"{ "type": "WIDGET_READY" }"#);
    assert_eq!(machine.phase(), LoaderPhase::Ready);
    assert_eq!(machine.retry_attempts(), 0);

    // Resize traffic flows after readiness without touching the lifecycle.
    let actions = deliver(&mut machine, r#"{ "type": "setHeight", "height": 847 }"#);
    assert_eq!(actions, vec![LoaderAction::ApplyHeight { height: 847.0 }]);
    assert_eq!(machine.phase(), LoaderPhase::Ready);
    Ok(())
}

#[test]
fn render_errors_exhaust_the_budget_and_fail_terminally() {
    let error_wire = r#"{
        "type": "WIDGET_ERROR",
        "error": { "code": "RENDER_ERROR", "message": "mount threw" }
    }"#;

    let mut machine = LoaderMachine::new("abc-123");
    machine.handle(LoaderEvent::FrameCreated);
    machine.handle(LoaderEvent::FrameLoaded);

    // Three errors, three recreations.
    for attempt in 1..=MAX_RETRIES {
        let actions = deliver(&mut machine, error_wire);
        assert_eq!(
            actions,
            vec![LoaderAction::ScheduleRetry {
                delay_ms: RETRY_DELAY_MS
            }],
            "error {attempt} should schedule a retry"
        );
        assert_eq!(
            machine.handle(LoaderEvent::RetryElapsed),
            vec![LoaderAction::RecreateFrame]
        );
        machine.handle(LoaderEvent::FrameCreated);
        machine.handle(LoaderEvent::FrameLoaded);
    }

    // The fourth error recreates nothing and is terminal.
    let actions = deliver(&mut machine, error_wire);
    assert!(
        matches!(
            actions.as_slice(),
            [LoaderAction::RemoveFrame, LoaderAction::Abandon { .. }]
        ),
        "expected terminal abandonment, got {actions:?}"
    );
    assert_eq!(machine.phase(), LoaderPhase::Failed);

    // Nothing further ever happens, including late height requests being
    // the only allowed no-op side channel.
    assert!(deliver(&mut machine, error_wire).is_empty());
}

#[test]
fn unrelated_channel_traffic_never_mutates_state() {
    let mut machine = LoaderMachine::new("abc-123");
    machine.handle(LoaderEvent::FrameCreated);
    machine.handle(LoaderEvent::FrameLoaded);

    for noise in [
        r#"{ "type": "WEBPACK_HMR", "payload": {} }"#,
        r#"{ "source": "react-devtools-bridge" }"#,
        "plain text",
        "42",
    ] {
        assert!(deliver(&mut machine, noise).is_empty());
    }

    assert_eq!(machine.phase(), LoaderPhase::AwaitingReady);
    assert_eq!(machine.retry_attempts(), 0);
}
