//! Command dispatch: one handler per subcommand

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{AnyTree, NestedNode, NodeId};
use crate::infrastructure::{InfraError, ServiceContainer};

/// Load settings for the working directory, build the services and run the
/// requested command.
pub fn run(cli: &Cli) -> CliResult<()> {
    let cwd = std::env::current_dir().map_err(|e| InfraError::io("resolve working directory", e))?;
    let mut settings = Settings::load(Some(cwd.as_path()))?;
    if let Some(format) = cli.format {
        settings.format = format;
    }
    debug!("effective settings: {:?}", settings);

    let container = ServiceContainer::new(settings);
    execute_command(cli, &container)
}

/// Dispatch a parsed command line against the given services.
pub fn execute_command(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Convert { file, output }) => {
            let tree = container.tree_service().convert(file)?;
            emit(container, &tree, output.as_deref())
        }
        Some(Commands::Tighten { file, output }) => {
            let tree = container.tree_service().tighten(file)?;
            emit(container, &tree, output.as_deref())
        }
        Some(Commands::Levels { file, output }) => {
            let tree = container.tree_service().levels(file)?;
            emit(container, &tree, output.as_deref())
        }
        Some(Commands::Ancestors {
            file,
            id,
            include_self,
        }) => cmd_ancestors(container, file, *id, *include_self),
        Some(Commands::Descendants {
            file,
            id,
            include_self,
        }) => cmd_descendants(container, file, *id, *include_self),
        Some(Commands::Show { file }) => cmd_show(container, file),
        Some(Commands::Validate { file }) => cmd_validate(container, file),
        Some(Commands::Config { command }) => cmd_config(container, command),
        Some(Commands::Completion { shell }) => cmd_completion(*shell),
        None => Err(CliError::Usage(
            "no command given, see `nestree --help`".to_string(),
        )),
    }
}

/// Write to `target` when given, else print in the configured format.
fn emit(container: &ServiceContainer, tree: &AnyTree, target: Option<&Path>) -> CliResult<()> {
    let service = container.tree_service();
    match target {
        Some(path) => {
            service.save(tree, path)?;
            output::action("Wrote", &path.display());
        }
        None => {
            let rendered = service.render(tree, container.settings.format)?;
            output::info(rendered.trim_end());
        }
    }
    Ok(())
}

fn print_ids(nodes: &[NestedNode]) {
    for node in nodes {
        output::info(&node.id);
    }
}

#[instrument(level = "debug", skip(container))]
fn cmd_ancestors(
    container: &ServiceContainer,
    file: &Path,
    id: NodeId,
    include_self: bool,
) -> CliResult<()> {
    let nodes = container.tree_service().ancestors(file, id, include_self)?;
    print_ids(&nodes);
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_descendants(
    container: &ServiceContainer,
    file: &Path,
    id: NodeId,
    include_self: bool,
) -> CliResult<()> {
    let nodes = container.tree_service().descendants(file, id, include_self)?;
    print_ids(&nodes);
    Ok(())
}

fn cmd_show(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    for tree in container.tree_service().show(file)? {
        print!("{tree}");
    }
    Ok(())
}

fn cmd_validate(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let summary = container.tree_service().validate(file)?;
    output::success(&format!("valid {}", summary.kind));
    output::detail(&format!("nodes:  {}", summary.nodes));
    output::detail(&format!("roots:  {}", summary.roots));
    output::detail(&format!("depth:  {}", summary.depth));
    output::detail(&format!("leaves: {}", summary.leaves.iter().join(", ")));
    Ok(())
}

fn cmd_config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(container.settings.to_toml()?.trim_end());
        }
        ConfigCommands::Path => {
            let cwd = std::env::current_dir()
                .map_err(|e| InfraError::io("resolve working directory", e))?;
            output::header("Config files (lowest to highest precedence)");
            match global_config_path() {
                Some(path) => output::detail(&format!(
                    "global: {} {}",
                    path.display(),
                    exists_marker(&path)
                )),
                None => output::detail("global: <no config directory>"),
            }
            let local = local_config_path(&cwd);
            output::detail(&format!(
                "local:  {} {}",
                local.display(),
                exists_marker(&local)
            ));
            output::detail("env:    NESTREE_*");
        }
        ConfigCommands::Template => {
            output::info(Settings::template().trim_end());
        }
    }
    Ok(())
}

fn exists_marker(path: &Path) -> &'static str {
    if path.exists() {
        "(exists)"
    } else {
        "(not found)"
    }
}

fn cmd_completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
