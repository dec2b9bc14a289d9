//! Namespaced diagnostic output.
//!
//! On `wasm32-unknown-unknown` lines go to the browser console; on every
//! other target they become `tracing` events. Namespaces keep widget noise
//! distinguishable from the host page's own logging
//! (`[sweeps:loader] ...`, `[sweeps:embed] ...`).

/// A namespaced logger. Cheap to construct and copy; each module keeps one
/// in a `const`.
#[derive(Debug, Clone, Copy)]
pub struct Logger {
    namespace: &'static str,
}

impl Logger {
    /// A logger tagging every line with `namespace`.
    pub const fn new(namespace: &'static str) -> Self {
        Self { namespace }
    }

    fn line(&self, message: &str) -> String {
        format!("[{}] {}", self.namespace, message)
    }

    /// Verbose diagnostics.
    pub fn debug(&self, message: &str) {
        #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
        web_sys::console::debug_1(&self.line(message).into());
        #[cfg(not(all(target_arch = "wasm32", target_os = "unknown")))]
        tracing::debug!("{}", self.line(message));
    }

    /// Informational diagnostics.
    pub fn info(&self, message: &str) {
        #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
        web_sys::console::info_1(&self.line(message).into());
        #[cfg(not(all(target_arch = "wasm32", target_os = "unknown")))]
        tracing::info!("{}", self.line(message));
    }

    /// Something is off but the widget can continue.
    pub fn warn(&self, message: &str) {
        #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
        web_sys::console::warn_1(&self.line(message).into());
        #[cfg(not(all(target_arch = "wasm32", target_os = "unknown")))]
        tracing::warn!("{}", self.line(message));
    }

    /// The widget cannot continue (or gave up retrying).
    pub fn error(&self, message: &str) {
        #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
        web_sys::console::error_1(&self.line(message).into());
        #[cfg(not(all(target_arch = "wasm32", target_os = "unknown")))]
        tracing::error!("{}", self.line(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_carry_the_namespace_prefix() {
        let logger = Logger::new("sweeps:test");
        assert_eq!(logger.line("hello"), "[sweeps:test] hello");
    }
}
