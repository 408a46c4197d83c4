use crate::models::detect_types::SelectedFile;
use crate::models::display_types::{FileLabel, PanelContent, TriggerState};
use crate::services::preview_service;
use crate::session::DetectorSession;
use tokio::task::JoinHandle;

/// Handles a change of the file-selection input.
///
/// Only the first file counts; an empty selection is ignored and returns `None`.
/// Otherwise the label, placeholder panel and trigger update immediately and a
/// preview read is spawned. The returned task resolves to `true` if its preview
/// was shown, `false` if a newer selection superseded it. Must be called from
/// within a Tokio runtime.
pub fn select_files<I>(session: &DetectorSession, files: I) -> Option<JoinHandle<bool>>
where
    I: IntoIterator<Item = SelectedFile>,
{
    let Some(file) = files.into_iter().next() else {
        tracing::debug!("File selection changed with no files; ignoring");
        return None;
    };

    tracing::debug!("Selected {} ({} bytes)", file.name(), file.len());
    let generation = session.replace_selection(file.clone());

    let surface = session.surface();
    surface.set_file_label(&FileLabel::chosen(file.name()));
    surface.set_result_panel(Some(&PanelContent::ready()));
    // A pending request keeps the trigger busy until it settles. Its outcome
    // still replaces this placeholder, under the newly selected file's label.
    if !session.is_in_flight() {
        surface.set_trigger(&TriggerState::idle());
    }

    Some(spawn_preview(session.clone(), file, generation))
}

fn spawn_preview(session: DetectorSession, file: SelectedFile, generation: u64) -> JoinHandle<bool> {
    tokio::spawn(async move {
        let name = file.name().to_string();
        let data_url = match preview_service::read_as_data_url(file).await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Preview for {} failed: {}", name, e);
                return false;
            }
        };

        let shown = session.with_current_selection(generation, || {
            session.surface().set_preview(&data_url);
        });
        if shown {
            tracing::debug!("Preview ready for {}", name);
        } else {
            tracing::debug!("Discarding stale preview for {}", name);
        }
        shown
    })
}
