//! Browser-side behavior that only exists with a real DOM: iframe creation,
//! the structured-clone message bridge, and height observation.

#![cfg(all(target_arch = "wasm32", target_os = "unknown"))]

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen_test::wasm_bindgen_test;
use web_sys::HtmlIFrameElement;

use sweeps_protocol::{Environment, LoaderPhase, WidgetConfig, WidgetMessage};
use sweeps_widget::loader::WidgetLoader;
use sweeps_widget::resize::ResizeBridge;

wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

fn test_container(id: &str) -> web_sys::Element {
    let document = web_sys::window().unwrap().document().unwrap();
    let container = document.create_element("div").unwrap();
    container.set_id(id);
    document.body().unwrap().append_child(&container).unwrap();
    container
}

#[wasm_bindgen_test]
fn mounting_creates_a_tagged_iframe_and_cleanup_removes_it() {
    let container = test_container("loader-test-container");
    let config = WidgetConfig {
        container_id: "loader-test-container".into(),
        sweepstakes_id: "abc-123".into(),
        version: Some("1.2.3".into()),
        environment: Environment::Development,
    };

    let loader = WidgetLoader::mount(config).unwrap();
    assert_eq!(loader.phase(), LoaderPhase::Loading);
    assert_eq!(loader.retry_attempts(), 0);

    let iframe: HtmlIFrameElement = container
        .query_selector("iframe")
        .unwrap()
        .expect("mount should create an iframe")
        .dyn_into()
        .unwrap();
    assert_eq!(
        iframe.get_attribute("data-sweepstakes-id").as_deref(),
        Some("abc-123")
    );
    let src = iframe.src();
    assert!(src.starts_with(Environment::Development.embed_base()), "{src}");
    assert!(src.contains("v=1.2.3"), "{src}");
    assert!(src.contains("t="), "cache-busting timestamp missing: {src}");
    assert!(src.contains("o="), "parent origin missing: {src}");

    loader.cleanup();
    assert!(container.query_selector("iframe").unwrap().is_none());
    assert_eq!(loader.phase(), LoaderPhase::Uninitialized);

    container.remove();
}

#[wasm_bindgen_test]
fn only_messages_from_the_own_iframe_reach_the_machine() {
    let container = test_container("source-filter-container");
    let config = WidgetConfig {
        container_id: "source-filter-container".into(),
        sweepstakes_id: "abc-123".into(),
        version: None,
        environment: Environment::Development,
    };
    let loader = WidgetLoader::mount(config).unwrap();
    assert_eq!(loader.retry_attempts(), 0);

    let window = web_sys::window().unwrap();
    let error_payload = js_sys::JSON::parse(
        r#"{ "type": "WIDGET_ERROR", "error": { "code": "RENDER_ERROR", "message": "boom" } }"#,
    )
    .unwrap();

    // Right origin, but no source window: this is what another loader's
    // embed (or injected traffic) looks like to this instance.
    let init = web_sys::MessageEventInit::new();
    init.set_data(&error_payload);
    init.set_origin(&Environment::Development.embed_origin());
    let foreign = web_sys::MessageEvent::new_with_event_init_dict("message", &init).unwrap();
    window.dispatch_event(&foreign).unwrap();
    assert_eq!(
        loader.retry_attempts(),
        0,
        "a message from a different source must not spend this retry budget"
    );
    assert_eq!(loader.phase(), LoaderPhase::Loading);

    // The same payload attributed to this instance's iframe is handled.
    let iframe: HtmlIFrameElement = container
        .query_selector("iframe")
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap();
    let own_window = iframe.content_window().unwrap();
    let init = web_sys::MessageEventInit::new();
    init.set_data(&error_payload);
    init.set_origin(&Environment::Development.embed_origin());
    init.set_source(Some(own_window.unchecked_ref()));
    let own = web_sys::MessageEvent::new_with_event_init_dict("message", &init).unwrap();
    window.dispatch_event(&own).unwrap();
    assert_eq!(loader.retry_attempts(), 1);

    loader.cleanup();
    container.remove();
}

#[wasm_bindgen_test]
fn messages_survive_the_structured_clone_bridge() {
    // postMessage carries objects, not strings; the crate bridges through
    // JSON.parse on send and JSON.stringify on receive.
    for message in [
        WidgetMessage::Initialize {
            sweepstakes_id: "abc-123".into(),
        },
        WidgetMessage::Ready {},
        WidgetMessage::SetHeight { height: 812.5 },
    ] {
        let raw = message.encode().unwrap();
        let object = js_sys::JSON::parse(&raw).unwrap();
        let round_tripped = String::from(js_sys::JSON::stringify(&object).unwrap());
        assert_eq!(WidgetMessage::decode(&round_tripped), Some(message));
    }
}

#[wasm_bindgen_test]
fn resize_bridge_reports_an_initial_height() {
    let reported = Rc::new(Cell::new(-1.0_f64));
    let sink = Rc::clone(&reported);
    let bridge = ResizeBridge::start(move |height| sink.set(height)).unwrap();

    // The first report happens synchronously on start.
    assert!(reported.get() >= 0.0);

    bridge.dispose();
}
