use super::Context;
use anyhow::{bail, Context as _, Result};
use chrono::{DateTime, Utc};
use localwrite_history::{Version, VersionType};
use localwrite_session::EditorSession;
use std::io::Write;

const AUTO_SAVE_NOTE: &str = "Auto-save";

pub async fn commit(
    ctx: &Context,
    file: &str,
    message: Option<&str>,
    out: &mut dyn Write,
) -> Result<()> {
    let mut session = open(ctx, file).await?;
    let version = session
        .commit(message)
        .await
        .with_context(|| format!("Failed to save a version of {file}"))?;
    writeln!(out, "{}", version.id)?;
    Ok(())
}

pub async fn autosave(ctx: &Context, file: &str, out: &mut dyn Write) -> Result<()> {
    let content = ctx
        .workspace
        .read_text(file)
        .await
        .with_context(|| format!("Failed to read {file}"))?;
    let version = ctx
        .history
        .save_version(file, &content, Some(AUTO_SAVE_NOTE), VersionType::Auto)
        .await
        .with_context(|| format!("Failed to save a version of {file}"))?;
    writeln!(out, "{}", version.id)?;
    Ok(())
}

pub async fn log(ctx: &Context, file: &str, out: &mut dyn Write) -> Result<()> {
    let versions = ctx.history.get_versions(file).await;
    if versions.is_empty() {
        writeln!(out, "no versions of {file}")?;
        return Ok(());
    }
    for version in versions {
        writeln!(
            out,
            "{}  {}  {:<6}  {}",
            version.id,
            format_timestamp(version.timestamp),
            version.kind.to_string(),
            version.note.as_deref().unwrap_or("")
        )?;
    }
    Ok(())
}

pub async fn show(ctx: &Context, file: &str, id: &str, out: &mut dyn Write) -> Result<()> {
    let version = find_version(ctx, file, id).await?;
    let content = ctx
        .history
        .get_version_content(&version)
        .await
        .with_context(|| format!("Version {} of {file} is not available", version.id))?;
    writeln!(out, "{content}")?;
    Ok(())
}

pub async fn restore(ctx: &Context, file: &str, id: &str, out: &mut dyn Write) -> Result<()> {
    let version = find_version(ctx, file, id).await?;
    let mut session = open(ctx, file).await?;
    session.restore(&version).await?;
    writeln!(out, "restored {file} to {}", version.id)?;
    Ok(())
}

async fn open(ctx: &Context, file: &str) -> Result<EditorSession> {
    EditorSession::open(
        ctx.workspace.clone(),
        ctx.history.clone(),
        file,
        ctx.settings.clone(),
    )
    .await
    .with_context(|| format!("Failed to open {file}"))
}

/// The version of `file` whose id starts with `id`.
async fn find_version(ctx: &Context, file: &str, id: &str) -> Result<Version> {
    let id = id.to_ascii_lowercase();
    let mut matches: Vec<Version> = ctx
        .history
        .get_versions(file)
        .await
        .into_iter()
        .filter(|version| version.id.to_string().starts_with(&id))
        .collect();

    match matches.len() {
        0 => bail!("no version {id} of {file}"),
        1 => Ok(matches.remove(0)),
        n => bail!("{n} versions of {file} match {id}"),
    }
}

fn format_timestamp(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp)
        .map(|time| time.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}
