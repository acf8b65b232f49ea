use crate::{
    error::SessionError,
    settings::{millis, SessionSettings},
    workspace::Workspace,
};
use localwrite_autoformat::{AutoFormat, InsertOutcome};
use localwrite_document::{Document, Mark, Selection};
use localwrite_history::{HistoryStore, Version, VersionType};
use localwrite_markdown::{deserialize, serialize};
use tracing::{debug, info};

const AUTO_SAVE_NOTE: &str = "Auto-save";

/// One open file: its document, the cursor, and the pending saves.
///
/// Time is read from the history store's clock. Nothing happens in the
/// background; the owner calls [`EditorSession::poll`] to run due work.
#[derive(Debug)]
pub struct EditorSession {
    workspace: Workspace,
    history: HistoryStore,
    file_name: String,
    document: Document,
    selection: Selection,
    autoformat: AutoFormat,
    settings: SessionSettings,
    /// When the debounced file write is due.
    write_deadline: Option<i64>,
    /// Content of the last history snapshot, or of the file when opened.
    baseline: String,
    last_auto_save: i64,
}

impl EditorSession {
    /// Open `file_name` from the workspace. A missing file is an error.
    pub async fn open(
        workspace: Workspace,
        history: HistoryStore,
        file_name: &str,
        settings: SessionSettings,
    ) -> Result<Self, SessionError> {
        let text = workspace.read_text(file_name).await?;
        let document = deserialize(&text);
        let selection = Selection::collapsed(document.start());
        let now = history.now_ms();
        info!(file = file_name, "opened file");

        Ok(Self {
            workspace,
            history,
            file_name: file_name.to_string(),
            baseline: serialize(&document),
            document,
            selection,
            autoformat: AutoFormat::new(settings.autoformat),
            settings,
            write_deadline: None,
            last_auto_save: now,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    /// The document as markdown.
    pub fn content(&self) -> String {
        serialize(&self.document)
    }

    /// Whether a debounced write is still pending.
    pub fn has_pending_write(&self) -> bool {
        self.write_deadline.is_some()
    }

    /// Type `text` at the selection and schedule a save.
    pub fn insert_text(&mut self, text: &str) -> Result<InsertOutcome, SessionError> {
        let outcome = self
            .autoformat
            .insert_text(&mut self.document, &mut self.selection, text)?;
        self.schedule_write();
        Ok(outcome)
    }

    /// Toggle `mark` over the selection. Returns whether the mark is now set.
    pub fn toggle_mark(&mut self, mark: Mark) -> Result<bool, SessionError> {
        let on = self.document.toggle_mark(&mut self.selection, mark)?;
        self.schedule_write();
        Ok(on)
    }

    fn schedule_write(&mut self) {
        let deadline = self
            .history
            .now_ms()
            .saturating_add(millis(self.settings.save_debounce));
        self.write_deadline = Some(deadline);
    }

    /// Run the work that is due: the debounced file write, then an
    /// automatic history snapshot when the interval has passed and the
    /// content changed since the last snapshot.
    pub async fn poll(&mut self) -> Result<(), SessionError> {
        let now = self.history.now_ms();

        if self.write_deadline.is_some_and(|deadline| now >= deadline) {
            self.flush().await?;
        }

        let interval = millis(self.settings.auto_save_interval);
        if now.saturating_sub(self.last_auto_save) >= interval {
            self.last_auto_save = now;
            let content = self.content();
            if content != self.baseline {
                let saved = self
                    .history
                    .save_version(
                        &self.file_name,
                        &content,
                        Some(AUTO_SAVE_NOTE),
                        VersionType::Auto,
                    )
                    .await;
                if saved.is_some() {
                    self.baseline = content;
                }
            } else {
                debug!(file = %self.file_name, "content unchanged, skipping auto-save");
            }
        }
        Ok(())
    }

    /// Write the file now, settling any pending debounced write. A failed
    /// write stays pending and is retried by the next due poll.
    pub async fn flush(&mut self) -> Result<(), SessionError> {
        self.workspace
            .write_text(&self.file_name, &self.content())
            .await?;
        self.write_deadline = None;
        Ok(())
    }

    /// Store the current content as a manual version.
    ///
    /// Resets the auto-save baseline, so an unchanged document is not
    /// snapshotted again by the next interval.
    pub async fn commit(&mut self, note: Option<&str>) -> Option<Version> {
        let content = self.content();
        let version = self
            .history
            .save_version(&self.file_name, &content, note, VersionType::Manual)
            .await?;
        self.baseline = content;
        self.last_auto_save = self.history.now_ms();
        Some(version)
    }

    /// Versions of this file, newest first.
    pub async fn versions(&self) -> Vec<Version> {
        self.history.get_versions(&self.file_name).await
    }

    /// Replace the document with `version` and write it to the file.
    ///
    /// When the version's content can not be loaded the document is left
    /// untouched.
    pub async fn restore(&mut self, version: &Version) -> Result<(), SessionError> {
        let content = self
            .history
            .get_version_content(version)
            .await
            .ok_or_else(|| SessionError::VersionUnavailable {
                file: self.file_name.clone(),
                id: version.id,
            })?;

        self.document = deserialize(&content);
        self.selection = Selection::collapsed(self.document.start());
        self.flush().await?;
        info!(file = %self.file_name, id = %version.id, "restored version");
        Ok(())
    }
}
