mod config;
mod document;
mod generate_cmd;
mod modules_cmd;
mod policy_cmd;

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use recovery_core::ModuleType;

use config::{ConfigFile, DefaultsSection};
use generate_cmd::PlanInputs;

#[derive(Parser)]
#[command(
    name = "recovery-plan",
    version,
    about = "Deterministic post-surgical recovery plan generator"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a recovery-plan config file
    Init {
        /// Default stored template
        #[arg(long)]
        template: Option<PathBuf>,
        /// Default plan category
        #[arg(long)]
        category: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Generate a 21-day plan and print it as JSON
    Generate {
        #[command(flatten)]
        inputs: PlanInputs,
        /// Output file path (defaults to stdout)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Emit compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Regenerate a plan and compare it with an existing one
    Regenerate {
        /// Previously generated plan
        #[arg(long)]
        plan: PathBuf,
        #[command(flatten)]
        inputs: PlanInputs,
        /// Replace the existing plan when it changed
        #[arg(long)]
        write: bool,
    },
    /// Clinic override policy tools
    Policy {
        #[command(subcommand)]
        command: PolicyCommands,
    },
    /// List the built-in module library
    Modules {
        /// Only list modules of this type (education, task, tracking, milestone, red_flag)
        #[arg(long)]
        kind: Option<ModuleType>,
    },
    /// Print shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum PolicyCommands {
    /// Validate a clinic override policy file
    Check {
        /// Path to the policy (JSON or TOML)
        file: PathBuf,
    },
}

/// Execute the `recovery-plan init` command: write config file.
fn cmd_init(template: Option<PathBuf>, category: Option<String>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = ConfigFile {
        defaults: DefaultsSection { template, category },
    };
    config::save_config(&cfg, &path)?;

    println!("Config written to {}", path.display());
    match &cfg.defaults.template {
        Some(t) => println!("  defaults.template = {}", t.display()),
        None => println!("  defaults.template = (built-in)"),
    }
    match &cfg.defaults.category {
        Some(c) => println!("  defaults.category = {c}"),
        None => println!(
            "  defaults.category = (unset, uses {})",
            recovery_core::library::DEFAULT_CATEGORY
        ),
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            template,
            category,
            force,
        } => cmd_init(template, category, force)?,
        Commands::Generate {
            inputs,
            output,
            compact,
        } => generate_cmd::run_generate(&inputs, output.as_deref(), compact)?,
        Commands::Regenerate {
            plan,
            inputs,
            write,
        } => generate_cmd::run_regenerate(&plan, &inputs, write)?,
        Commands::Policy { command } => policy_cmd::run_policy_command(command)?,
        Commands::Modules { kind } => modules_cmd::run_modules(kind)?,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "recovery-plan", &mut io::stdout());
        }
    }

    Ok(())
}
