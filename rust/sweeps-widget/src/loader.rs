//! Host-side iframe lifecycle.
//!
//! [`WidgetLoader`] owns the iframe element, the window-level `message` and
//! `error` listeners, and the retry timer. It makes no lifecycle decisions
//! itself: every event is fed to the pure [`LoaderMachine`] and the returned
//! [`LoaderAction`]s are performed here. The iframe is a disposable
//! resource — recovery is always teardown-and-recreate, never in-place
//! repair of a partially initialized frame.
//!
//! Incoming messages are filtered twice before they can touch state: the
//! `event.origin` must match the embed document's origin, and the payload
//! must decode as a recognized [`WidgetMessage`] tag. Everything else on the
//! channel is dropped silently.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;
use web_sys::{Document, ErrorEvent, HtmlElement, HtmlIFrameElement, MessageEvent};
use web_time::{SystemTime, UNIX_EPOCH};

use sweeps_protocol::{
    DiagnosticLevel, LoaderAction, LoaderEvent, LoaderMachine, LoaderPhase, WidgetConfig,
    WidgetError, WidgetMessage, codes,
};

use crate::error::{SweepsWidgetError, js_value_to_string};
use crate::logger::Logger;

const LOG: Logger = Logger::new("sweeps:loader");

/// Height applied to the iframe until the first `setHeight` arrives.
const MIN_HEIGHT_PX: &str = "600px";

/// The parent-side widget instance.
///
/// One per mounted container. Dropping the handle does not tear the widget
/// down (the embed keeps running for the page lifetime); call
/// [`WidgetLoader::cleanup`] to remove the iframe and detach listeners.
pub struct WidgetLoader {
    inner: Rc<RefCell<Inner>>,
}

struct Inner {
    config: WidgetConfig,
    machine: LoaderMachine,
    container: HtmlElement,
    iframe: Option<HtmlIFrameElement>,
    load_listener: Option<Closure<dyn FnMut(web_sys::Event)>>,
    message_listener: Option<Closure<dyn FnMut(MessageEvent)>>,
    error_listener: Option<Closure<dyn FnMut(ErrorEvent)>>,
}

impl WidgetLoader {
    /// Create the iframe for `config` and begin the handshake.
    ///
    /// Fails only on configuration errors (no window, unknown container);
    /// those cannot self-heal and are never retried.
    pub fn mount(config: WidgetConfig) -> Result<Self, SweepsWidgetError> {
        let window = web_sys::window()
            .ok_or_else(|| SweepsWidgetError::Configuration("no window object".into()))?;
        let document = window
            .document()
            .ok_or_else(|| SweepsWidgetError::Configuration("no document object".into()))?;
        let container = document
            .get_element_by_id(&config.container_id)
            .ok_or_else(|| {
                SweepsWidgetError::Configuration(format!(
                    "container #{} not found",
                    config.container_id
                ))
            })?
            .dyn_into::<HtmlElement>()
            .map_err(|_| {
                SweepsWidgetError::Configuration(format!(
                    "container #{} is not an HTML element",
                    config.container_id
                ))
            })?;

        let machine = LoaderMachine::new(&config.sweepstakes_id);
        let inner = Rc::new(RefCell::new(Inner {
            config,
            machine,
            container,
            iframe: None,
            load_listener: None,
            message_listener: None,
            error_listener: None,
        }));

        let rc = Rc::clone(&inner);
        let message_listener = Closure::<dyn FnMut(MessageEvent)>::new(move |event| {
            on_message(&rc, event);
        });
        window.add_event_listener_with_callback(
            "message",
            message_listener.as_ref().unchecked_ref(),
        )?;

        let rc = Rc::clone(&inner);
        let error_listener = Closure::<dyn FnMut(ErrorEvent)>::new(move |event: ErrorEvent| {
            let error = WidgetError::new(codes::GLOBAL_ERROR, event.message());
            dispatch(&rc, LoaderEvent::HostError(error));
        });
        window.add_event_listener_with_callback("error", error_listener.as_ref().unchecked_ref())?;

        {
            let mut guard = inner.borrow_mut();
            guard.message_listener = Some(message_listener);
            guard.error_listener = Some(error_listener);
        }

        create_iframe(&inner)?;
        dispatch(&inner, LoaderEvent::FrameCreated);

        Ok(Self { inner })
    }

    /// Current lifecycle phase, for diagnostics.
    pub fn phase(&self) -> LoaderPhase {
        self.inner.borrow().machine.phase()
    }

    /// Recreation attempts spent so far.
    pub fn retry_attempts(&self) -> u32 {
        self.inner.borrow().machine.retry_attempts()
    }

    /// Remove the iframe, detach all listeners and reset the retry budget.
    ///
    /// Any `load` or `message` event already in flight is still delivered
    /// afterwards, but finds no live iframe reference to act on.
    pub fn cleanup(&self) {
        dispatch(&self.inner, LoaderEvent::Cleanup);

        let mut inner = self.inner.borrow_mut();
        if let Some(window) = web_sys::window() {
            if let Some(listener) = inner.message_listener.take() {
                let _ = window
                    .remove_event_listener_with_callback("message", listener.as_ref().unchecked_ref());
            }
            if let Some(listener) = inner.error_listener.take() {
                let _ = window
                    .remove_event_listener_with_callback("error", listener.as_ref().unchecked_ref());
            }
        }
    }
}

/// Feed one event through the machine and perform its actions.
fn dispatch(inner: &Rc<RefCell<Inner>>, event: LoaderEvent) {
    let actions = inner.borrow_mut().machine.handle(event);
    perform(inner, actions);
}

fn perform(inner: &Rc<RefCell<Inner>>, actions: Vec<LoaderAction>) {
    for action in actions {
        match action {
            LoaderAction::PostInitialize { sweepstakes_id } => {
                post_initialize(inner, sweepstakes_id);
            }
            LoaderAction::ApplyHeight { height } => apply_height(inner, height),
            LoaderAction::ScheduleRetry { delay_ms } => schedule_retry(inner, delay_ms),
            LoaderAction::RecreateFrame => match create_iframe(inner) {
                Ok(()) => dispatch(inner, LoaderEvent::FrameCreated),
                Err(error) => LOG.error(&format!("iframe recreation failed: {error}")),
            },
            LoaderAction::RemoveFrame => remove_iframe(inner),
            LoaderAction::Diagnostic { level, message } => match level {
                DiagnosticLevel::Warning => LOG.warn(&format!("embed: {message}")),
                DiagnosticLevel::Info => LOG.info(&format!("embed: {message}")),
            },
            LoaderAction::Abandon { error } => {
                // Terminal. The container is left empty and the host page is
                // never thrown an exception.
                LOG.error(&format!("widget abandoned after retries: {error}"));
            }
        }
    }
}

/// Create a fresh iframe for the configured campaign, replacing any live
/// one first so that at most one iframe exists per container.
fn create_iframe(inner_rc: &Rc<RefCell<Inner>>) -> Result<(), SweepsWidgetError> {
    let document = current_document()?;
    let iframe: HtmlIFrameElement = document
        .create_element("iframe")?
        .dyn_into()
        .map_err(|_| SweepsWidgetError::Dom("iframe element has unexpected type".into()))?;

    let mut inner = inner_rc.borrow_mut();
    if let Some(previous) = inner.iframe.take() {
        previous.remove();
    }
    inner.load_listener = None;

    let src = inner
        .config
        .embed_src(unix_timestamp_secs(), &parent_origin());
    iframe.set_src(&src);
    iframe.set_scrolling("no");
    iframe.set_attribute("data-sweepstakes-id", &inner.config.sweepstakes_id)?;

    let style = iframe.style();
    style.set_property("width", "100%")?;
    style.set_property("border", "none")?;
    style.set_property("min-height", MIN_HEIGHT_PX)?;

    let rc = Rc::clone(inner_rc);
    let load_listener = Closure::<dyn FnMut(web_sys::Event)>::new(move |_| {
        dispatch(&rc, LoaderEvent::FrameLoaded);
    });
    iframe.add_event_listener_with_callback("load", load_listener.as_ref().unchecked_ref())?;

    inner.container.append_child(&iframe)?;
    LOG.debug(&format!("iframe created with src {src}"));
    inner.iframe = Some(iframe);
    inner.load_listener = Some(load_listener);
    Ok(())
}

fn remove_iframe(inner_rc: &Rc<RefCell<Inner>>) {
    let mut inner = inner_rc.borrow_mut();
    if let Some(iframe) = inner.iframe.take() {
        iframe.remove();
    }
    inner.load_listener = None;
}

/// Post `INITIALIZE_WIDGET` into the iframe, pinned to the embed origin.
fn post_initialize(inner_rc: &Rc<RefCell<Inner>>, sweepstakes_id: String) {
    let inner = inner_rc.borrow();
    // Cleanup can race an in-flight load event; without a live iframe there
    // is nobody to initialize.
    let Some(iframe) = &inner.iframe else {
        return;
    };
    let Some(target) = iframe.content_window() else {
        LOG.warn("iframe has no content window yet; skipping initialize");
        return;
    };

    let message = WidgetMessage::Initialize { sweepstakes_id };
    let payload = match message.encode().map_err(SweepsWidgetError::from) {
        Ok(raw) => match js_sys::JSON::parse(&raw) {
            Ok(value) => value,
            Err(error) => {
                LOG.error(&format!(
                    "initialize payload rejected by JSON.parse: {}",
                    js_value_to_string(error)
                ));
                return;
            }
        },
        Err(error) => {
            LOG.error(&format!("could not encode initialize message: {error}"));
            return;
        }
    };

    let embed_origin = inner.config.environment.embed_origin();
    if let Err(error) = target.post_message(&payload, &embed_origin) {
        LOG.error(&format!(
            "postMessage to embed failed: {}",
            js_value_to_string(error)
        ));
    }
}

/// Apply a requested height as an inline style. Idempotent; the last value
/// wins, and lifecycle state is untouched.
fn apply_height(inner_rc: &Rc<RefCell<Inner>>, height: f64) {
    let inner = inner_rc.borrow();
    if let Some(iframe) = &inner.iframe {
        if let Err(error) = iframe.style().set_property("height", &format!("{height}px")) {
            LOG.warn(&format!(
                "could not apply height: {}",
                js_value_to_string(error)
            ));
        }
    }
}

fn schedule_retry(inner_rc: &Rc<RefCell<Inner>>, delay_ms: u32) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let rc = Rc::clone(inner_rc);
    let callback = Closure::once(move || dispatch(&rc, LoaderEvent::RetryElapsed));
    match window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.as_ref().unchecked_ref(),
        delay_ms as i32,
    ) {
        // One-shot timer; at most the retry budget of these exist per
        // widget instance, so leaking the closure is bounded.
        Ok(_) => callback.forget(),
        Err(error) => LOG.error(&format!(
            "could not schedule retry: {}",
            js_value_to_string(error)
        )),
    }
}

/// Window `message` handler: filter by origin and source, decode, and
/// dispatch.
fn on_message(inner_rc: &Rc<RefCell<Inner>>, event: MessageEvent) {
    {
        let inner = inner_rc.borrow();
        if event.origin() != inner.config.environment.embed_origin() {
            return;
        }
        // Several loaders can share this window, and every embed document in
        // the same environment carries the same origin. Only the event whose
        // source window is this instance's iframe belongs to this machine.
        let Some(own_window) = inner.iframe.as_ref().and_then(|frame| frame.content_window())
        else {
            return;
        };
        let from_own_iframe = event
            .source()
            .is_some_and(|source| js_sys::Object::is(source.as_ref(), own_window.as_ref()));
        if !from_own_iframe {
            return;
        }
    }

    let Ok(raw) = js_sys::JSON::stringify(&event.data()) else {
        return;
    };
    let raw = String::from(raw);
    if let Some(message) = WidgetMessage::decode(&raw) {
        dispatch(inner_rc, LoaderEvent::Message(message));
    }
}

fn current_document() -> Result<Document, SweepsWidgetError> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| SweepsWidgetError::Dom("document is unavailable".into()))
}

fn parent_origin() -> String {
    web_sys::window()
        .and_then(|window| window.location().origin().ok())
        .unwrap_or_else(|| "null".into())
}

fn unix_timestamp_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}
