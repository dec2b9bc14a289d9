//! The entry form.
//!
//! Validation runs client-side before anything leaves the iframe, and the
//! first violation is shown next to its field. Store and network failures
//! are shown as a retryable banner; resubmission is always the visitor's
//! action, never automatic.

use leptos::prelude::*;

use sweeps_protocol::{EntryRecord, EntryValidationError, Environment};

use crate::submit::{SubmissionClient, SubmitError, SubmitReceipt};

const AGE_RANGES: [&str; 5] = ["18-24", "25-34", "35-44", "45-54", "55+"];
const REFERRAL_SOURCES: [&str; 4] = ["Search", "Social media", "Friend or family", "Other"];

/// Collects and submits one sweepstakes entry.
#[component]
pub fn EntryForm(
    /// The campaign being entered.
    sweepstakes_id: String,
    /// Which backend to submit against.
    environment: Environment,
    /// Invoked once the store accepts the entry.
    on_complete: Callback<SubmitReceipt>,
) -> impl IntoView {
    let name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let age_range = RwSignal::new(String::new());
    let postal_code = RwSignal::new(String::new());
    let referral_source = RwSignal::new(String::new());
    let consent = RwSignal::new(false);

    let submitting = RwSignal::new(false);
    let field_error = RwSignal::new(Option::<EntryValidationError>::None);
    let submit_error = RwSignal::new(Option::<String>::None);

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if submitting.get() {
            return;
        }
        field_error.set(None);
        submit_error.set(None);

        let optional = |signal: RwSignal<String>| {
            let value = signal.get();
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        let entry = EntryRecord {
            sweepstakes_id: sweepstakes_id.clone(),
            name: name.get().trim().to_string(),
            email: email.get().trim().to_string(),
            age_range: optional(age_range),
            postal_code: optional(postal_code),
            referral_source: optional(referral_source),
            consent: consent.get(),
        };
        if let Err(violation) = entry.validate() {
            field_error.set(Some(violation));
            return;
        }

        submitting.set(true);
        wasm_bindgen_futures::spawn_local(async move {
            let client = SubmissionClient::new(environment);
            match client.submit(&entry).await {
                Ok(receipt) => {
                    if receipt.list_sync {
                        client.sync_mailing_list(&entry).await;
                    }
                    if let Some(url) = &receipt.tracking_url {
                        client.redirect_to(url);
                    }
                    // The parent swaps to the confirmation view; this form's
                    // signals must not be touched after that.
                    on_complete.run(receipt);
                }
                Err(SubmitError::Invalid(violation)) => {
                    field_error.set(Some(violation));
                    submitting.set(false);
                }
                Err(error) => {
                    submit_error.set(Some(format!("{error}. Please try again.")));
                    submitting.set(false);
                }
            }
        });
    };

    // One message per field, shown only under the offending field.
    let error_for = move |field: &'static str| {
        field_error
            .get()
            .filter(|violation| violation.field() == field)
            .map(|violation| view! { <p class="field-error">{violation.to_string()}</p> })
    };

    view! {
        <form class="entry-form" on:submit=submit>
            <div class="form-field">
                <label for="entry-name">"Name"</label>
                <input
                    id="entry-name"
                    type="text"
                    autocomplete="name"
                    prop:value=move || name.get()
                    on:input=move |ev| name.set(event_target_value(&ev))
                />
                {move || error_for("name")}
            </div>

            <div class="form-field">
                <label for="entry-email">"Email"</label>
                <input
                    id="entry-email"
                    type="email"
                    autocomplete="email"
                    prop:value=move || email.get()
                    on:input=move |ev| email.set(event_target_value(&ev))
                />
                {move || error_for("email")}
            </div>

            <div class="form-field">
                <label for="entry-age">"Age range (optional)"</label>
                <select
                    id="entry-age"
                    prop:value=move || age_range.get()
                    on:change=move |ev| age_range.set(event_target_value(&ev))
                >
                    <option value="">"Prefer not to say"</option>
                    {AGE_RANGES
                        .into_iter()
                        .map(|range| view! { <option value=range>{range}</option> })
                        .collect::<Vec<_>>()}
                </select>
            </div>

            <div class="form-field">
                <label for="entry-postal">"Postal code (optional)"</label>
                <input
                    id="entry-postal"
                    type="text"
                    autocomplete="postal-code"
                    prop:value=move || postal_code.get()
                    on:input=move |ev| postal_code.set(event_target_value(&ev))
                />
            </div>

            <div class="form-field">
                <label for="entry-referral">"How did you hear about us? (optional)"</label>
                <select
                    id="entry-referral"
                    prop:value=move || referral_source.get()
                    on:change=move |ev| referral_source.set(event_target_value(&ev))
                >
                    <option value="">"Select one"</option>
                    {REFERRAL_SOURCES
                        .into_iter()
                        .map(|source| view! { <option value=source>{source}</option> })
                        .collect::<Vec<_>>()}
                </select>
            </div>

            <div class="form-field consent">
                <label>
                    <input
                        type="checkbox"
                        prop:checked=move || consent.get()
                        on:change=move |ev| consent.set(event_target_checked(&ev))
                    />
                    "I agree to the official rules"
                </label>
                {move || error_for("consent")}
            </div>

            {move || {
                submit_error
                    .get()
                    .map(|message| view! { <p class="submit-error">{message}</p> })
            }}

            <button type="submit" disabled=move || submitting.get()>
                {move || if submitting.get() { "Entering..." } else { "Enter sweepstakes" }}
            </button>
        </form>
    }
}
