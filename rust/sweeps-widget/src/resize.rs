//! Height reporting from the embed document to the host page.
//!
//! The iframe has `scrolling="no"`; native scrollbars never appear. Instead
//! a `ResizeObserver` watches the embed document's body and posts the full
//! scroll height outward as a `setHeight` message on every layout change.
//! No debouncing beyond the observer's own batching: rapid layout changes
//! may produce several messages, which is fine because the parent's height
//! application is idempotent and the last value wins.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;
use web_sys::{Document, ResizeObserver};

use crate::error::SweepsWidgetError;

/// A running observer. Runs for the lifetime of the embed document; call
/// [`ResizeBridge::dispose`] when the bootstrapper unmounts.
pub struct ResizeBridge {
    observer: ResizeObserver,
    // Kept alive for as long as the observer may fire.
    _callback: Closure<dyn FnMut(js_sys::Array)>,
}

impl ResizeBridge {
    /// Observe the document body and report heights through `on_height`.
    pub fn start(on_height: impl Fn(f64) + 'static) -> Result<Self, SweepsWidgetError> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| SweepsWidgetError::Embed("document is unavailable".into()))?;
        let body = document
            .body()
            .ok_or_else(|| SweepsWidgetError::Embed("document has no body".into()))?;

        let measured = document.clone();
        let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |_entries: js_sys::Array| {
            on_height(full_height(&measured));
        });
        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())?;
        observer.observe(&body);

        // Report once immediately: the first layout already happened by the
        // time the observer is attached.
        on_height(full_height(&document));

        Ok(Self {
            observer,
            _callback: callback,
        })
    }

    /// Stop observing.
    pub fn dispose(self) {
        self.observer.disconnect();
    }
}

/// Full scroll height of the document in CSS pixels. The root element and
/// the body can disagree depending on margins; take the larger.
fn full_height(document: &Document) -> f64 {
    let root = document
        .document_element()
        .map(|element| element.scroll_height())
        .unwrap_or(0);
    let body = document
        .body()
        .map(|element| element.scroll_height())
        .unwrap_or(0);
    root.max(body) as f64
}
