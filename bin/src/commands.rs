pub mod files;
pub mod history;

use crate::cli::Command;
use anyhow::Result;
use localwrite_config::Config;
use localwrite_history::{Directory, HistoryStore, LocalDirectory};
use localwrite_session::{retention_policy, SessionSettings, Workspace};
use std::{io::Write, path::Path, sync::Arc};

/// Everything a command needs: the content directory and its history.
#[derive(Debug, Clone)]
pub struct Context {
    pub workspace: Workspace,
    pub history: HistoryStore,
    pub settings: SessionSettings,
}

impl Context {
    /// Open `dir` with the configuration found for it.
    pub fn open(dir: &Path, config_override: Option<&Path>) -> Result<Self> {
        if !dir.is_dir() {
            anyhow::bail!("content directory {} does not exist", dir.display());
        }
        let config = Config::for_content_dir(dir, config_override)?;
        Ok(Self::with_config(dir, &config))
    }

    pub fn with_config(dir: &Path, config: &Config) -> Self {
        let root: Arc<dyn Directory> = Arc::new(LocalDirectory::new(dir));
        Self {
            workspace: Workspace::new(root.clone()),
            history: HistoryStore::new(root).with_policy(retention_policy(&config.history)),
            settings: SessionSettings::from(config),
        }
    }
}

/// Run `command`, writing its output to `out`.
pub async fn handle(command: Command, ctx: &Context, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Files => files::list(ctx, out).await,
        Command::New { name } => files::create(ctx, &name, out).await,
        Command::Fmt { file } => files::format(ctx, &file, out).await,
        Command::Commit { file, message } => {
            history::commit(ctx, &file, message.as_deref(), out).await
        },
        Command::Autosave { file } => history::autosave(ctx, &file, out).await,
        Command::Log { file } => history::log(ctx, &file, out).await,
        Command::Show { file, id } => history::show(ctx, &file, &id, out).await,
        Command::Restore { file, id } => history::restore(ctx, &file, &id, out).await,
    }
}
