//! ci-stack CLI entrypoint.
//!
//! This is the main entrypoint for the ci-stack command-line tool.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ci_stack::cli::{Cli, Commands, OutputFormatter};
use ci_stack::config::{
    AgentCatalog, ConfigHasher, DeploymentResolver, ENV_TEMPLATE, PARAMS_TEMPLATE, ParamsParser,
    RawParameters, Resolution, find_params_file, resolve_deployment_type, select_agent_nodes,
};
use ci_stack::error::Result;
use ci_stack::planner::StackPlan;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    // .env has to be in place before clap reads CI_STACK_* variables
    if let Err(e) = ParamsParser::new().load_dotenv() {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    let formatter = OutputFormatter::new(cli.output);
    match run(cli, &formatter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", formatter.format_error(&e.to_string()));
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Dispatches the selected command.
fn run(cli: Cli, formatter: &OutputFormatter) -> Result<()> {
    match cli.command {
        Commands::Init { ref path, force } => cmd_init(path, force),
        Commands::Validate { warnings } => {
            let resolution = resolve(&cli)?;
            eprintln!("{}", formatter.format_resolution(&resolution, warnings));
            Ok(())
        }
        Commands::Plan { detailed } => {
            let resolution = resolve(&cli)?;
            let config_hash = ConfigHasher::new().hash_config(&resolution.config);
            let plan = StackPlan::from_config(&resolution.config, &config_hash)
                .with_warnings(resolution.warnings);
            eprintln!("{}", formatter.format_plan(&plan, detailed));
            Ok(())
        }
        Commands::Catalog {
            ref deployment_type,
        } => cmd_catalog(&cli, deployment_type.as_deref(), formatter),
    }
}

/// Write template files for a new deployment.
fn cmd_init(path: &Path, force: bool) -> Result<()> {
    info!("Initializing ci-stack parameters in: {}", path.display());

    let params_path = path.join("ci-stack.params.yaml");
    let env_path = path.join(".env.example");
    let gitignore_path = path.join(".gitignore");

    if !force && params_path.exists() {
        eprintln!("Parameters file already exists: {}", params_path.display());
        eprintln!("Use --force to overwrite.");
        return Ok(());
    }

    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }

    std::fs::write(&params_path, PARAMS_TEMPLATE)?;
    eprintln!("Created: {}", params_path.display());

    std::fs::write(&env_path, ENV_TEMPLATE)?;
    eprintln!("Created: {}", env_path.display());

    if gitignore_path.exists() {
        let existing = std::fs::read_to_string(&gitignore_path)?;
        if !existing.lines().any(|l| l.trim() == ".env") {
            let mut file = std::fs::OpenOptions::new()
                .append(true)
                .open(&gitignore_path)?;
            writeln!(file, "\n# ci-stack\n.env")?;
            eprintln!("Updated: {}", gitignore_path.display());
        }
    } else {
        std::fs::write(&gitignore_path, ".env\n")?;
        eprintln!("Created: {}", gitignore_path.display());
    }

    eprintln!("\nNext steps:");
    eprintln!("  1. Edit ci-stack.params.yaml for your deployment");
    eprintln!("  2. Run 'ci-stack validate --warnings' to check it");
    eprintln!("  3. Run 'ci-stack plan --detailed' to see what will be provisioned");

    Ok(())
}

/// List catalog entries, optionally filtered by deployment type.
fn cmd_catalog(
    cli: &Cli,
    deployment_type: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let catalog = load_catalog(cli.catalog.as_deref())?;

    let output = match deployment_type {
        Some(raw) => {
            let deployment_type = resolve_deployment_type(Some(raw), false)?;
            let agents = select_agent_nodes(deployment_type, &catalog);
            let selected: Vec<_> = agents.iter().collect();
            formatter.format_agents(&format!("Agents for {deployment_type}"), &selected)
        }
        None => {
            let all: Vec<_> = catalog.iter().collect();
            formatter.format_agents("Agent catalog", &all)
        }
    };

    eprintln!("{output}");
    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Loads parameters and resolves them against the catalog.
fn resolve(cli: &Cli) -> Result<Resolution> {
    let params = load_params(cli)?;
    let resolver = DeploymentResolver::new(load_catalog(cli.catalog.as_deref())?);
    resolver.resolve(&params)
}

/// Gathers typed properties and context strings.
fn load_params(cli: &Cli) -> Result<RawParameters> {
    let params_file: Option<PathBuf> = cli.params.clone().or_else(|| find_params_file("."));

    let parser = match params_file.as_deref().and_then(Path::parent) {
        Some(dir) if !dir.as_os_str().is_empty() => ParamsParser::new().with_base_path(dir),
        _ => ParamsParser::new(),
    };
    if cli.params.is_some() {
        parser.load_dotenv()?;
    }

    debug!(
        "Parameters file: {}",
        params_file
            .as_deref()
            .map_or_else(|| String::from("none"), |p| p.display().to_string())
    );

    parser.load(params_file.as_deref(), cli.context.as_slice())
}

/// Loads the custom catalog if one is given, otherwise the built-in one.
fn load_catalog(path: Option<&Path>) -> Result<AgentCatalog> {
    path.map_or_else(AgentCatalog::builtin, |p| AgentCatalog::load_file(p))
}
