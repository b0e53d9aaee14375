// Generation controller: one request/stream per submission

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, Instrument};

use crate::api::{GenerateContentRequest, GenerationService};
use crate::app::App;
use crate::clipboard::ClipboardWriter;
use crate::events::AppEvent;
use crate::prompt;

/// Start a generation for the current form values.
///
/// Returns `None` without touching the service while a previous submission is
/// still generating.
pub fn submit(
    app: &mut App,
    service: &Arc<dyn GenerationService>,
    event_tx: &UnboundedSender<AppEvent>,
) -> Option<JoinHandle<()>> {
    if !app.session.begin() {
        return None;
    }
    app.scroll_to_top();

    let composed = prompt::compose(&app.form);
    let request = GenerateContentRequest::single_turn(
        &app.model,
        composed.instruction,
        composed.system_instruction,
    );

    let span = info_span!(
        "generation",
        session = %app.session.id().map(|id| id.to_string()).unwrap_or_default(),
        model = %app.model
    );

    Some(tokio::spawn(
        stream_generation(Arc::clone(service), request, event_tx.clone()).instrument(span),
    ))
}

/// Drive one stream to its end, forwarding fragments to the UI.
///
/// Always finishes with exactly one `Completed` or `Failed` event.
pub async fn stream_generation(
    service: Arc<dyn GenerationService>,
    request: GenerateContentRequest,
    tx: UnboundedSender<AppEvent>,
) {
    let outcome = match service.generate_stream(request).await {
        Ok(mut stream) => {
            let _ = tx.send(AppEvent::StreamOpened);

            let mut fragments = 0usize;
            let mut outcome = AppEvent::Completed;
            while let Some(item) = stream.next().await {
                match item {
                    Ok(response) => {
                        if let Some(text) = response.text() {
                            fragments += 1;
                            let _ = tx.send(AppEvent::Fragment(text));
                        }
                    }
                    Err(e) => {
                        outcome = AppEvent::Failed(e.to_string());
                        break;
                    }
                }
            }

            debug!(fragments, "stream finished");
            outcome
        }
        Err(e) => AppEvent::Failed(e.to_string()),
    };

    let _ = tx.send(outcome);
}

/// Copy the displayed output. Returns whether the clipboard was written.
pub fn copy_output(app: &mut App, clipboard: &mut dyn ClipboardWriter, now: Instant) -> bool {
    if !app.session.has_copyable_output() {
        return false;
    }

    match clipboard.write_text(app.session.output()) {
        Ok(()) => {
            app.session.mark_copied(now);
            info!(chars = app.session.output().chars().count(), "output copied to clipboard");
            true
        }
        Err(e) => {
            error!(error = %e, "Failed to copy text");
            false
        }
    }
}
