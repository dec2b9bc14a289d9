//! Host-page entry script.
//!
//! This is the only artifact a third-party page references. The page
//! provides a placeholder declaring which campaign to render, plus the
//! script tag itself:
//!
//! ```html
//! <div id="sweepstakes-widget" data-sweepstakes-id="<uuid>"></div>
//! <script src=".../widget.js"></script>
//! ```
//!
//! On execution the script finds its own `<script>` element, synthesizes a
//! container immediately before it (a deterministic mount point that needs
//! no pre-authored markup), injects the stylesheet, loads the UI runtime
//! scripts strictly in sequence (later scripts assume the globals installed
//! by earlier ones; parallel loading would race), and finally mounts the
//! [`WidgetLoader`].
//!
//! Every failure on this path is a configuration error: logged once, no
//! retry, and no exception thrown into the host page.

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::Closure;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, HtmlLinkElement, HtmlScriptElement};

use sweeps_protocol::{Environment, WidgetConfig};

use crate::error::{SweepsWidgetError, js_value_to_string};
use crate::loader::WidgetLoader;
use crate::logger::Logger;

const LOG: Logger = Logger::new("sweeps:host");

/// Id of the placeholder div the embedding page authors.
const PLACEHOLDER_ID: &str = "sweepstakes-widget";

/// Id of the container this script synthesizes for the iframe.
const CONTAINER_ID: &str = "sweeps-widget-container";

thread_local! {
    /// The mounted loader for this page. Held so the instance stays
    /// reachable (and could be cleaned up) for the page lifetime.
    static ACTIVE_LOADER: RefCell<Option<WidgetLoader>> = const { RefCell::new(None) };
}

/// Run the bootstrap chain. Called from the `host` binary's `main`.
pub fn bootstrap() {
    wasm_bindgen_futures::spawn_local(async {
        match run().await {
            Ok(loader) => {
                ACTIVE_LOADER.with(|slot| *slot.borrow_mut() = Some(loader));
                LOG.info("widget loader mounted");
            }
            // Configuration errors cannot self-heal: log once and stop.
            Err(error) => LOG.error(&format!("initialization aborted: {error}")),
        }
    });
}

async fn run() -> Result<WidgetLoader, SweepsWidgetError> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| SweepsWidgetError::Configuration("no document object".into()))?;

    let script = own_script_element(&document)?;
    synthesize_container(&document, &script)?;

    // The placeholder declares which sweepstakes to render; read it before
    // spending network round trips on a page that never configured one.
    let placeholder = document.get_element_by_id(PLACEHOLDER_ID).ok_or_else(|| {
        SweepsWidgetError::Configuration(format!("placeholder #{PLACEHOLDER_ID} not found"))
    })?;
    let sweepstakes_id = placeholder
        .get_attribute("data-sweepstakes-id")
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| {
            SweepsWidgetError::Configuration("placeholder has no data-sweepstakes-id".into())
        })?;
    let environment = environment_of(&placeholder);
    let version = placeholder.get_attribute("data-version");

    inject_stylesheet(&document, &environment.stylesheet_url())?;
    for url in environment.runtime_urls() {
        load_script(&document, &url).await?;
    }

    let config = WidgetConfig {
        container_id: CONTAINER_ID.into(),
        sweepstakes_id,
        version,
        environment,
    };
    WidgetLoader::mount(config)
}

/// Locate the currently executing script tag, falling back to a selector
/// match on the script `src` when `document.currentScript` is unavailable
/// (it is `null` in module and async contexts).
fn own_script_element(document: &Document) -> Result<HtmlScriptElement, SweepsWidgetError> {
    if let Some(script) = document.current_script() {
        return Ok(script);
    }
    document
        .query_selector("script[src*=\"widget.js\"]")?
        .and_then(|element| element.dyn_into::<HtmlScriptElement>().ok())
        .ok_or_else(|| SweepsWidgetError::Configuration("could not locate own script tag".into()))
}

/// Insert the iframe container immediately before our own script tag.
fn synthesize_container(
    document: &Document,
    script: &HtmlScriptElement,
) -> Result<(), SweepsWidgetError> {
    // Re-running the entry script must not stack containers.
    if document.get_element_by_id(CONTAINER_ID).is_some() {
        return Ok(());
    }
    let container = document.create_element("div")?;
    container.set_id(CONTAINER_ID);
    let parent = script.parent_node().ok_or_else(|| {
        SweepsWidgetError::Configuration("script tag has no parent node".into())
    })?;
    parent.insert_before(&container, Some(script))?;
    Ok(())
}

fn environment_of(placeholder: &Element) -> Environment {
    match placeholder.get_attribute("data-environment").as_deref() {
        Some("development") => Environment::Development,
        _ => Environment::Production,
    }
}

fn inject_stylesheet(document: &Document, href: &str) -> Result<(), SweepsWidgetError> {
    let link: HtmlLinkElement = document
        .create_element("link")?
        .dyn_into()
        .map_err(|_| SweepsWidgetError::Dom("link element has unexpected type".into()))?;
    link.set_rel("stylesheet");
    link.set_href(href);
    document
        .head()
        .ok_or_else(|| SweepsWidgetError::Dom("document has no head".into()))?
        .append_child(&link)?;
    Ok(())
}

/// Load one script and resolve when it finishes executing.
///
/// Callers await each script before appending the next; that sequencing is
/// the whole point, so this function never appends more than one tag.
async fn load_script(document: &Document, src: &str) -> Result<(), SweepsWidgetError> {
    let script: HtmlScriptElement = document
        .create_element("script")?
        .dyn_into()
        .map_err(|_| SweepsWidgetError::Dom("script element has unexpected type".into()))?;
    script.set_src(src);

    let element = script.clone();
    let src_for_error = src.to_string();
    let promise = js_sys::Promise::new(&mut move |resolve, reject| {
        let onload = Closure::once(move || {
            let _ = resolve.call0(&JsValue::UNDEFINED);
        });
        element.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();

        let src_for_error = src_for_error.clone();
        let onerror = Closure::once(move || {
            let _ = reject.call1(
                &JsValue::UNDEFINED,
                &JsValue::from_str(&format!("failed to load {src_for_error}")),
            );
        });
        element.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();
    });

    document
        .head()
        .ok_or_else(|| SweepsWidgetError::Dom("document has no head".into()))?
        .append_child(&script)?;

    JsFuture::from(promise).await.map_err(|error| {
        SweepsWidgetError::Configuration(js_value_to_string(error))
    })?;
    LOG.debug(&format!("loaded {src}"));
    Ok(())
}
