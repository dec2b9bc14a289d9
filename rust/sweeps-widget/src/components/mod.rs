//! Leptos UI rendered inside the embed document.
//!
//! The component tree is:
//!
//! ```text
//! EntryApp
//! ├── EntryForm           (fields, validation, submission)
//! └── Confirmation        (shown after an accepted entry)
//! ```
//!
//! `EntryApp` is the only component the bootstrapper mounts; the switch
//! between form and confirmation is its single piece of state.

mod confirmation;
mod entry_form;

pub use confirmation::*;
pub use entry_form::*;

use leptos::prelude::*;

use sweeps_protocol::Environment;

use crate::submit::SubmitReceipt;

/// Root component for the embedded widget.
#[component]
pub fn EntryApp(
    /// The campaign this widget collects entries for.
    sweepstakes_id: String,
    /// Which backend the submission client talks to.
    environment: Environment,
) -> impl IntoView {
    let receipt = RwSignal::new(Option::<SubmitReceipt>::None);

    view! {
        <div class="sweeps-widget">
            {move || {
                let sweepstakes_id = sweepstakes_id.clone();
                match receipt.get() {
                    Some(accepted) => view! { <Confirmation receipt=accepted /> }.into_any(),
                    None => view! {
                        <EntryForm
                            sweepstakes_id=sweepstakes_id
                            environment=environment
                            on_complete=Callback::new(move |accepted| receipt.set(Some(accepted)))
                        />
                    }
                    .into_any(),
                }
            }}
        </div>
    }
}
