use miette::Result;
use tracing::Level;
use versionista_config::Config;
use versionista_versioning::TicketExtractor;

use crate::{
    cli::{Action, Cli, Target},
    editor::ExternalEditor,
    integrations::github::GitHub,
    prompt::Terminal,
    releases::{Mode, Releaser, Summary},
    repository::Selection,
    state::RunType,
};

mod cli;
mod config;
mod editor;
#[cfg(test)]
mod fakes;
mod integrations;
mod prompt;
mod releases;
mod repository;
mod state;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .without_time()
        .with_target(false)
        .with_level(cli.verbose)
        .init();

    let config = config::load(cli.config.as_deref())?;
    let github = GitHub::new(
        GitHub::client()?,
        config.token().unwrap_or_default(),
        config.github_api_url(),
    );
    let summary = match cli.action {
        Action::Review { target } => releases::review(&github, select(&config, &target)?).await,
        Action::Release {
            target,
            bump,
            dry_run,
        } => {
            let selection = select(&config, &target)?;
            let label = selection.label.clone();
            let tickets = TicketExtractor::new(&config.jira_boards)?;
            let editor = ExternalEditor::new(config.editor.as_deref());
            let prompt = Terminal;
            let releaser = Releaser::new(
                &github,
                &prompt,
                &editor,
                &tickets,
                config.jira_org_id(),
                Mode::from(bump),
                RunType::new(dry_run),
            );
            Summary::new(&label, releaser.run(selection).await?)
        }
    };
    println!("{summary}");
    summary.into_result()?;
    Ok(())
}

fn select(config: &Config, target: &Target) -> Result<Selection> {
    let target = config.resolve_target(target.project.as_deref(), target.name.as_deref())?;
    Ok(Selection::new(target, config)?)
}
