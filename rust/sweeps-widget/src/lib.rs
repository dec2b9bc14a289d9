//! Embeddable sweepstakes entry widget.
//!
//! A third-party page adds a placeholder and one script tag:
//!
//! ```html
//! <div id="sweepstakes-widget" data-sweepstakes-id="<uuid>"></div>
//! <script src=".../widget.js"></script>
//! ```
//!
//! Everything else happens here. Two WASM entry points are built from this
//! crate, one per side of the iframe boundary:
//!
//! ```text
//! ┌──────────────────────────────────┐   ┌──────────────────────────────────┐
//! │ Host page (third-party origin)    │   │ Embed document (widget origin)    │
//! │                                   │   │                                   │
//! │  bin/host — widget.js             │   │  bin/embed — embed bundle         │
//! │   ├─ host: script/style chain,    │   │   ├─ embed: mount + handshake     │
//! │   │        container synthesis    │   │   ├─ components: Leptos form      │
//! │   └─ loader: iframe lifecycle ────┼──▸│   ├─ resize: height reporting     │
//! │        │            ▲             │   │   └─ submit: entry POST           │
//! │        ▼            └──postMessage┼───┤                                   │
//! │   LoaderMachine (sweeps-protocol) │   │                                   │
//! └──────────────────────────────────┘   └──────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - **[`host`]**: the entry script's bootstrap chain — finds its own script
//!   tag, synthesizes the container, injects the stylesheet and runtime
//!   scripts sequentially, then mounts the loader.
//! - **[`loader`]**: owns the iframe element and the `message`/`error`
//!   listeners; every decision is delegated to the pure
//!   [`sweeps_protocol::LoaderMachine`].
//! - **[`embed`]**: runs inside the iframe — resolves the mount point,
//!   renders the form, emits readiness and errors back through the protocol.
//! - **[`resize`]**: `ResizeObserver` bridge posting `setHeight` outward.
//! - **[`submit`]**: validates and POSTs entries to the backing store.
//! - **[`components`]**: Leptos CSR entry form, confirmation view included.
//! - **[`logger`]**: namespaced console/tracing diagnostics.
//!
//! Errors inside the iframe never propagate as uncaught exceptions to the
//! host page; they are translated into `WIDGET_ERROR` messages and handled
//! by the loader's retry machinery.

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
pub mod components;

mod error;
pub use error::*;

pub mod logger;

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
pub mod embed;

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
pub mod host;

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
pub mod loader;

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
pub mod resize;

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
pub mod submit;
