use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use crate::{app, resumes::repo_types::Resume, sections::ensure_sections, state::AppState};

#[derive(Parser, Debug)]
#[command(
    name = "resumeforge",
    about = "Resume builder API and maintenance commands",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Bring every resume's sections back to one per fixed type
    ReconcileSections,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override APP_HOST
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override APP_PORT
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    let state = AppState::init().await?;
    if let Err(e) = sqlx::migrate!("./migrations").run(&state.db).await {
        tracing::warn!(error = %e, "migration failed; continuing");
    }

    match command {
        Command::Serve(args) => app::serve(app::build_app(state), args).await,
        Command::ReconcileSections => reconcile_all(&state).await,
    }
}

/// Failures on one resume are logged and do not stop the run.
async fn reconcile_all(state: &AppState) -> anyhow::Result<()> {
    let ids = Resume::list_ids(&state.db).await?;
    let mut changed = 0usize;
    let mut failed = 0usize;
    for id in &ids {
        match ensure_sections(state.sections.as_ref(), *id).await {
            Ok((sections, report)) => {
                if report.changed() {
                    changed += 1;
                }
                info!(
                    resume_id = %id,
                    sections = sections.len(),
                    removed_foreign = report.removed_foreign,
                    removed_duplicates = report.removed_duplicates,
                    created = report.created,
                    "resume checked"
                );
            }
            Err(e) => {
                failed += 1;
                error!(resume_id = %id, error = %e, "reconcile failed");
            }
        }
    }
    info!(total = ids.len(), changed, failed, "section reconciliation finished");
    if failed > 0 {
        anyhow::bail!("{failed} resume(s) could not be reconciled");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve_and_parses_reconcile() {
        let cli = Cli::try_parse_from(["resumeforge"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["resumeforge", "reconcile-sections"]).unwrap();
        assert!(matches!(cli.command, Some(Command::ReconcileSections)));

        let cli = Cli::try_parse_from(["resumeforge", "serve", "--port", "9090"]).unwrap();
        match cli.command {
            Some(Command::Serve(args)) => assert_eq!(args.port, Some(9090)),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
