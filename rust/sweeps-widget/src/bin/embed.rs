//! Embed-document entry point.
//!
//! This binary is compiled to WASM and loaded by the hosted embed document
//! the loader points its iframe at. It runs on the widget's own origin,
//! waits for `INITIALIZE_WIDGET` from the parent, and renders the entry
//! form.

fn main() {
    // The bootstrapper installs its own panic reporter, so no
    // console_error_panic_hook::set_once() here.
    #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
    sweeps_widget::embed::start();
}
