//! Bootstrapper for the embed document inside the iframe.
//!
//! The hosted embed document loads this bundle and calls [`start`]. From
//! there:
//!
//! 1. A `message` listener waits for `INITIALIZE_WIDGET` from the parent
//!    loader (only the first one is acted on).
//! 2. The local mount point is resolved; if it is missing, `WIDGET_ERROR`
//!    goes out immediately and nothing renders.
//! 3. The Leptos entry form is mounted. Render failures — including panics,
//!    via the panic reporter installed here — are converted into
//!    `WIDGET_ERROR` messages. Nothing inside the iframe is ever allowed to
//!    surface as an uncaught exception in the embedding page.
//! 4. On first successful render `WIDGET_READY` goes out and the
//!    [`ResizeBridge`] starts reporting heights.
//!
//! Outbound messages are pinned to the host page's origin, which the loader
//! passes in the `o` query parameter of the iframe `src`; inbound messages
//! are checked against the same origin.

use std::cell::{Cell, RefCell};

use leptos::prelude::*;
use url::Url;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;
use web_sys::{HtmlElement, MessageEvent};

use sweeps_protocol::{Environment, WidgetError, WidgetMessage, codes};

use crate::components::EntryApp;
use crate::error::js_value_to_string;
use crate::logger::Logger;
use crate::resize::ResizeBridge;

const LOG: Logger = Logger::new("sweeps:embed");

/// Id of the element the embed document provides for the form to mount on.
const MOUNT_ID: &str = "sweeps-embed-root";

thread_local! {
    static INITIALIZED: Cell<bool> = const { Cell::new(false) };
    static RESIZE_BRIDGE: RefCell<Option<ResizeBridge>> = const { RefCell::new(None) };
}

/// Entry point for the embed bundle. Called from the `embed` binary's
/// `main` when the embed document loads.
pub fn start() {
    install_panic_reporter();

    let Some(window) = web_sys::window() else {
        LOG.error("no window object; not running in a document?");
        return;
    };

    let expected_origin = parent_origin();
    let listener = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
        // The parent pins its target origin to ours; we mirror the check
        // for the inbound leg. "*" only remains when no origin was handed
        // over, e.g. when the embed document is opened directly.
        if expected_origin != "*" && event.origin() != expected_origin {
            return;
        }
        let Ok(raw) = js_sys::JSON::stringify(&event.data()) else {
            return;
        };
        if let Some(WidgetMessage::Initialize { sweepstakes_id }) =
            WidgetMessage::decode(&String::from(raw))
        {
            on_initialize(sweepstakes_id);
        }
    });
    if let Err(error) =
        window.add_event_listener_with_callback("message", listener.as_ref().unchecked_ref())
    {
        LOG.error(&format!(
            "could not attach message listener: {}",
            js_value_to_string(error)
        ));
        return;
    }
    // The listener lives for the document lifetime.
    listener.forget();

    LOG.debug("embed bootstrapper waiting for INITIALIZE_WIDGET");
}

/// Handle the first `INITIALIZE_WIDGET`; later ones are ignored so a
/// parent-side retry against a half-alive document cannot double-mount.
fn on_initialize(sweepstakes_id: String) {
    if INITIALIZED.with(|flag| flag.replace(true)) {
        LOG.debug("already initialized; ignoring repeat INITIALIZE_WIDGET");
        return;
    }

    match render(sweepstakes_id) {
        Ok(()) => {
            post_to_parent(&WidgetMessage::Ready {});
            start_resize_bridge();
        }
        Err(error) => {
            LOG.error(&format!("render failed: {}", error.message));
            post_to_parent(&WidgetMessage::Error { error });
            // Let the parent decide whether to recreate us.
            INITIALIZED.with(|flag| flag.set(false));
        }
    }
}

fn render(sweepstakes_id: String) -> Result<(), WidgetError> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| WidgetError::new(codes::RENDER_ERROR, "document is unavailable"))?;
    let mount: HtmlElement = document
        .get_element_by_id(MOUNT_ID)
        .ok_or_else(|| {
            WidgetError::new(
                codes::MOUNT_NOT_FOUND,
                format!("mount point #{MOUNT_ID} not found in embed document"),
            )
        })?
        .dyn_into()
        .map_err(|_| {
            WidgetError::new(codes::MOUNT_NOT_FOUND, "mount point is not an HTML element")
        })?;

    let environment = own_environment();
    let handle = leptos::mount::mount_to(mount, move || {
        view! { <EntryApp sweepstakes_id=sweepstakes_id.clone() environment=environment /> }
    });
    // The form stays mounted for the document lifetime.
    handle.forget();
    Ok(())
}

fn start_resize_bridge() {
    match ResizeBridge::start(|height| {
        post_to_parent(&WidgetMessage::SetHeight { height });
    }) {
        Ok(bridge) => RESIZE_BRIDGE.with(|slot| *slot.borrow_mut() = Some(bridge)),
        // Height stays at the parent's minimum; degraded but usable.
        Err(error) => {
            LOG.warn(&format!("resize bridge unavailable: {error}"));
            post_to_parent(&WidgetMessage::Warning {
                message: "resize observation unavailable".into(),
            });
        }
    }
}

/// Post a protocol message to the parent window, pinned to its origin.
fn post_to_parent(message: &WidgetMessage) {
    let Some(parent) = web_sys::window().and_then(|window| window.parent().ok().flatten()) else {
        return;
    };
    let raw = match message.encode() {
        Ok(raw) => raw,
        Err(error) => {
            LOG.error(&format!("could not encode message: {error}"));
            return;
        }
    };
    let Ok(payload) = js_sys::JSON::parse(&raw) else {
        return;
    };
    if let Err(error) = parent.post_message(&payload, &parent_origin()) {
        LOG.warn(&format!(
            "postMessage to parent failed: {}",
            js_value_to_string(error)
        ));
    }
}

/// The host page origin handed over by the loader in the `o` query
/// parameter. Falls back to `*` when absent.
fn parent_origin() -> String {
    web_sys::window()
        .and_then(|window| window.location().href().ok())
        .and_then(|href| Url::parse(&href).ok())
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "o")
                .map(|(_, value)| value.into_owned())
        })
        .filter(|origin| !origin.is_empty())
        .unwrap_or_else(|| "*".into())
}

/// Which backend this embed document belongs to, inferred from the origin
/// it is served from.
fn own_environment() -> Environment {
    let origin = web_sys::window()
        .and_then(|window| window.location().origin().ok())
        .unwrap_or_default();
    if origin == Environment::Development.embed_origin() {
        Environment::Development
    } else {
        Environment::Production
    }
}

/// Convert panics during rendering into `WIDGET_ERROR` messages before the
/// usual console report. The embedding page must never see an uncaught
/// exception from the widget.
fn install_panic_reporter() {
    std::panic::set_hook(Box::new(|info| {
        post_to_parent(&WidgetMessage::Error {
            error: WidgetError::new(codes::RENDER_ERROR, info.to_string()),
        });
        console_error_panic_hook::hook(info);
    }));
}
