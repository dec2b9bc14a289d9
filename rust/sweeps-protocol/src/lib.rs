#![warn(missing_docs)]

//! Message protocol and loader state machine for the sweepstakes embed widget.
//!
//! A third-party page embeds a single `<script>` tag. That script creates a
//! sandboxed iframe pointing at a hosted embed document, and the two frames
//! negotiate readiness, errors and sizing over `postMessage`:
//!
//! ```text
//! ┌────────────────────────────┐          ┌───────────────────────────┐
//! │ Host page (third party)     │          │ Embed document (iframe)    │
//! │                             │          │                            │
//! │  WidgetLoader               │──INIT──▸ │  Bootstrapper              │
//! │   ├─ LoaderMachine          │ ◂─READY──│   ├─ entry form UI         │
//! │   ├─ retry / backoff        │ ◂─ERROR──│   ├─ resize bridge         │
//! │   └─ height application     │◂─HEIGHT──│   └─ submission client     │
//! └────────────────────────────┘          └───────────────────────────┘
//! ```
//!
//! This crate holds everything about that exchange which does not touch the
//! DOM, so it compiles and tests on any target:
//!
//! - **[`message`]**: the closed [`WidgetMessage`] tagged union and its JSON
//!   wire form. Decoding is the single point of dispatch; unknown tags are
//!   ignored, never errors.
//! - **[`machine`]**: the [`LoaderMachine`] driving the iframe lifecycle
//!   (create, handshake, retry-by-recreation, terminal failure). The machine
//!   is purely reactive: callers feed it [`LoaderEvent`]s and perform the
//!   [`LoaderAction`]s it returns.
//! - **[`config`]**: the immutable per-instance [`WidgetConfig`] and the
//!   environment-derived embed / storage URLs.
//! - **[`entry`]**: the visitor-supplied [`EntryRecord`] and its validation
//!   rules.
//! - **[`version`]**: the [`DeployedVersion`] row shape published by the
//!   external deploy operation.
//!
//! The browser glue (iframe creation, listeners, fetch) lives in the
//! `sweeps-widget` crate.

mod config;
pub use config::*;

mod entry;
pub use entry::*;

mod error;
pub use error::*;

mod machine;
pub use machine::*;

mod message;
pub use message::*;

mod version;
pub use version::*;
