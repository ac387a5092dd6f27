//! Command dispatch

use std::io::{self, Write};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::outline::Outline;
use crate::application::sample;
use crate::application::services::Walkthrough;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::global_config_path;
use crate::domain::TextDialog;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::TerminalKeys;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    match &cli.command {
        Commands::Play { file } => cmd_play(container, file),
        Commands::Tree { file } => cmd_tree(container, file),
        Commands::Check { file } => cmd_check(container, file),
        Commands::Demo { file, force } => cmd_demo(container, file, *force),
        Commands::Config { command } => match command {
            ConfigCommands::Show => cmd_config_show(container),
            ConfigCommands::Path => cmd_config_path(),
        },
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

fn load(container: &ServiceContainer, file: &Path) -> CliResult<TextDialog> {
    Ok(container.store().load(file)?)
}

#[instrument(level = "debug", skip(container))]
fn cmd_play(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let dialog = load(container, file)?;
    let mut keys = TerminalKeys;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let report = Walkthrough::new(&mut keys, &mut out, container.pacing()).run(&dialog)?;
    out.flush().map_err(|e| InfraError::io("flush stdout", e))?;
    debug!("choices: {:?}", report.choices);
    if !report.finished {
        output::warning("walkthrough cancelled");
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_tree(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let dialog = load(container, file)?;
    output::info(&dialog.to_outline());
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_check(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let dialog = load(container, file)?;
    dialog.validate()?;

    let tree = dialog.tree();
    output::success(&format!("{} is valid", file.display()));
    output::detail(&format!("branches: {}", tree.branch_count()));
    output::detail(&format!("depth:    {}", tree.depth()));
    output::detail(&format!("endings:  {}", tree.leaves().len()));
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_demo(container: &ServiceContainer, file: &Path, force: bool) -> CliResult<()> {
    if container.fs.exists(file) && !force {
        return Err(CliError::Usage(format!(
            "{} already exists (use --force to overwrite)",
            file.display()
        )));
    }
    let dialog = sample::riddle()?;
    container.store().save(&dialog, file)?;
    output::success(&format!("wrote sample dialog to {}", file.display()));
    Ok(())
}

fn cmd_config_show(container: &ServiceContainer) -> CliResult<()> {
    output::info(&container.settings.to_toml()?);
    Ok(())
}

fn cmd_config_path() -> CliResult<()> {
    match global_config_path() {
        Some(path) => output::action("global", &path.display()),
        None => output::warning("no config directory available on this platform"),
    }
    Ok(())
}
