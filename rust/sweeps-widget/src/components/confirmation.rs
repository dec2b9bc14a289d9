//! Post-entry confirmation view.

use leptos::prelude::*;

use crate::submit::SubmitReceipt;

/// Shown in place of the form once the store has accepted the entry.
///
/// If the campaign configured a tracking URL the bootstrapper has already
/// started a redirect; the link here is the fallback for browsers that
/// blocked it.
#[component]
pub fn Confirmation(
    /// The store's answer for the accepted entry.
    receipt: SubmitReceipt,
) -> impl IntoView {
    view! {
        <div class="entry-confirmation">
            <h2>"You're in!"</h2>
            <p>"Your entry has been received. Good luck!"</p>
            {receipt
                .tracking_url
                .map(|url| view! { <p><a href=url.clone()>"Continue"</a></p> })}
        </div>
    }
}
