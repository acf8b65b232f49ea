use anyhow::Result;
use clap::Parser;
use localwrite_bin::{
    cli::Cli,
    commands::{self, Context},
};
use localwrite_log::LogConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let _log_guard = match localwrite_log::init(LogConfig {
        log_file_path: cli.log_file.clone(),
    }) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {e}");
            None
        },
    };

    if let Err(e) = run(cli).await {
        tracing::error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let dir = match cli.dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let ctx = Context::open(&dir, cli.config.as_deref())?;
    let mut stdout = std::io::stdout().lock();
    commands::handle(cli.command, &ctx, &mut stdout).await
}
