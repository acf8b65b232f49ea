use super::Context;
use anyhow::{Context as _, Result};
use localwrite_markdown::serialize;
use std::io::Write;
use tracing::info;

pub async fn list(ctx: &Context, out: &mut dyn Write) -> Result<()> {
    let files = ctx
        .workspace
        .list_markdown_files()
        .await
        .context("Failed to list files")?;
    for file in files {
        writeln!(out, "{file}")?;
    }
    Ok(())
}

pub async fn create(ctx: &Context, name: &str, out: &mut dyn Write) -> Result<()> {
    let created = ctx
        .workspace
        .create_file(name)
        .await
        .with_context(|| format!("Failed to create {name}"))?;
    writeln!(out, "created {created}")?;
    Ok(())
}

/// Rewrite `file` as the markdown its document serializes to.
pub async fn format(ctx: &Context, file: &str, out: &mut dyn Write) -> Result<()> {
    let original = ctx
        .workspace
        .read_text(file)
        .await
        .with_context(|| format!("Failed to read {file}"))?;
    let document = localwrite_markdown::deserialize(&original);

    if serialize(&document) == original {
        writeln!(out, "{file} unchanged")?;
        return Ok(());
    }

    ctx.workspace
        .write_document(file, &document)
        .await
        .with_context(|| format!("Failed to write {file}"))?;
    info!(file, "formatted file");
    writeln!(out, "formatted {file}")?;
    Ok(())
}
