//! Host-page entry point, shipped as `widget.js`.
//!
//! This binary is compiled to WASM and referenced by a third-party page as
//! a plain script tag next to the `#sweepstakes-widget` placeholder. It
//! runs on the embedding page's origin and drives the whole bootstrap
//! chain: container synthesis, stylesheet and runtime script loading, and
//! finally the iframe loader.

fn main() {
    // On wasm32 the bootstrap chain starts as soon as the script executes;
    // on other targets this binary is a no-op.
    #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
    {
        console_error_panic_hook::set_once();
        sweeps_widget::host::bootstrap();
    }
}
