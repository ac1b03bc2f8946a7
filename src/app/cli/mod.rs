//! CLI Adapter.

mod output;
mod params;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::adapters::dialoguer_prompter::{DialoguerPrompter, NonInteractive};
use crate::app::api::{self, AddPanelOptions, InstallOutcome, UninstallOptions};
use crate::domain::{AppError, InstallState, MasqueradeDomain};
use crate::ports::Prompter;

use params::ParameterCollector;

#[derive(Parser)]
#[command(name = "mtdeploy")]
#[command(version)]
#[command(
    about = "Install and maintain a Fake-TLS MTProxy deployment (Traefik + telemt + optional panel)",
    long_about = None
)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Install the proxy, or update the installation already there
    #[clap(visible_alias = "i")]
    Install {
        /// Installation directory (default: $MTPROXY_DIR or /opt/mtproxy)
        dir: Option<PathBuf>,
        /// Take over a directory that is not an mtdeploy installation
        #[arg(long)]
        force: bool,
    },
    /// Re-render configuration, pull or rebuild images, restart
    #[clap(visible_alias = "u")]
    Update { dir: Option<PathBuf> },
    /// Change the masquerade domain
    Config {
        /// New TLS SNI domain
        #[arg(long)]
        sni: String,
        dir: Option<PathBuf>,
    },
    /// Stop containers and delete the installation directory
    Uninstall {
        dir: Option<PathBuf>,
        /// Do not ask for confirmation
        #[arg(short = 'y', long)]
        yes: bool,
        /// Remove a directory that does not look like an installation
        #[arg(long)]
        force: bool,
    },
    /// Add the web admin panel to a proxy-only installation
    AddPanel { dir: Option<PathBuf> },
    /// Rotate the proxy secret (proxy-only) or reset the panel admin
    ResetPassword { dir: Option<PathBuf> },
    /// Print the client connection links
    Link {
        dir: Option<PathBuf>,
        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },
}

/// Entry point for the CLI.
pub fn run() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let interactive =
        params::is_interactive(|key| std::env::var(key).ok(), std::io::stdin().is_terminal());
    let prompter: Box<dyn Prompter> =
        if interactive { Box::new(DialoguerPrompter::new()) } else { Box::new(NonInteractive) };

    let result = match cli.command {
        Some(command) => dispatch(command, prompter.as_ref()),
        None if interactive => menu(prompter.as_ref()),
        None => Err(AppError::config_error(
            "No command given. Run 'mtdeploy --help' for the list of commands.",
        )),
    };

    if let Err(e) = result {
        debug!(class = e.class(), "command failed");
        eprintln!("Error: {}", e);
        if let Some(hint) = e.hint() {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn collector(prompter: &dyn Prompter) -> ParameterCollector<'_, impl Fn(&str) -> Option<String>> {
    ParameterCollector::new(|key: &str| std::env::var(key).ok(), prompter)
}

fn dispatch(command: Commands, prompter: &dyn Prompter) -> Result<(), AppError> {
    let interactive = prompter.is_interactive();
    let inputs = collector(prompter);
    match command {
        Commands::Install { dir, force } => {
            let params = inputs.install(dir)?;
            match api::install(&params, force, interactive)? {
                InstallOutcome::Installed(report) => output::print_deployment("Installed", &report),
                InstallOutcome::Updated(report) => output::print_deployment("Updated", &report),
                InstallOutcome::Cancelled => println!("ℹ️ Install cancelled"),
            }
        }
        Commands::Update { dir } => {
            let report = api::update(&inputs.directory(dir)?, interactive)?;
            output::print_deployment("Updated", &report);
        }
        Commands::Config { sni, dir } => {
            let domain = MasqueradeDomain::new(&sni)?;
            let outcome = api::reconfigure(&inputs.directory(dir)?, domain, interactive)?;
            output::print_reconfigure(&outcome);
        }
        Commands::Uninstall { dir, yes, force } => {
            let options = UninstallOptions { yes, force };
            let outcome = api::uninstall(&inputs.directory(dir)?, options, interactive)?;
            output::print_uninstall(&outcome);
        }
        Commands::AddPanel { dir } => {
            let dir = inputs.directory(dir)?;
            let options = AddPanelOptions {
                panel_port: Some(inputs.panel_port()?),
                panel_image: inputs.panel_image(),
                admin: inputs.admin()?,
            };
            let report = api::add_panel(&dir, options, interactive)?;
            output::print_deployment("Upgraded", &report);
        }
        Commands::ResetPassword { dir } => {
            let dir = inputs.directory(dir)?;
            let admin = match api::detect(&dir)? {
                InstallState::ValidProxyPanel => inputs.admin()?,
                _ => None,
            };
            let outcome = api::reset_password(&dir, admin, interactive)?;
            output::print_reset(&outcome);
        }
        Commands::Link { dir, json } => {
            let report = api::link(&inputs.directory(dir)?)?;
            if json {
                let body = output::links_json(&report)
                    .map_err(|e| AppError::config_error(format!("Cannot encode links: {}", e)))?;
                println!("{}", body);
            } else {
                output::print_links(&report);
            }
        }
    }
    Ok(())
}

/// No verb on a terminal: pick an action for the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    Update,
    ChangeDomain,
    AddPanel,
    Reset,
    Links,
    Uninstall,
    Exit,
}

impl MenuAction {
    fn label(self) -> &'static str {
        match self {
            MenuAction::Update => "Update",
            MenuAction::ChangeDomain => "Change masquerade domain",
            MenuAction::AddPanel => "Add admin panel",
            MenuAction::Reset => "Reset password / rotate secret",
            MenuAction::Links => "Show links",
            MenuAction::Uninstall => "Uninstall",
            MenuAction::Exit => "Exit",
        }
    }
}

/// Actions offered for a valid installation in `state`.
fn menu_actions(state: InstallState) -> Vec<MenuAction> {
    let mut actions = vec![MenuAction::Update, MenuAction::ChangeDomain];
    if state == InstallState::ValidProxyOnly {
        actions.push(MenuAction::AddPanel);
    }
    actions.extend([MenuAction::Reset, MenuAction::Links, MenuAction::Uninstall, MenuAction::Exit]);
    actions
}

fn menu(prompter: &dyn Prompter) -> Result<(), AppError> {
    let dir = collector(prompter).directory(None)?;
    let state = api::detect(&dir)?;
    println!("ℹ️ {} is {}", dir.display(), state);

    let dir = Some(dir);
    let command = if state.is_valid() {
        let actions = menu_actions(state);
        let labels: Vec<&str> = actions.iter().map(|action| action.label()).collect();
        let choice = prompter.select("What do you want to do?", &labels, 0)?;
        match actions.get(choice).copied().unwrap_or(MenuAction::Exit) {
            MenuAction::Update => Commands::Update { dir },
            MenuAction::ChangeDomain => {
                let sni = prompter.input("New masquerade domain", "")?;
                Commands::Config { sni, dir }
            }
            MenuAction::AddPanel => Commands::AddPanel { dir },
            MenuAction::Reset => Commands::ResetPassword { dir },
            MenuAction::Links => Commands::Link { dir, json: false },
            MenuAction::Uninstall => Commands::Uninstall { dir, yes: false, force: false },
            MenuAction::Exit => return Ok(()),
        }
    } else if state == InstallState::Foreign {
        if !prompter.confirm("The directory holds other files. Install over them anyway?", false)? {
            return Ok(());
        }
        Commands::Install { dir, force: true }
    } else {
        if !prompter.confirm("Install MTProxy here?", true)? {
            return Ok(());
        }
        Commands::Install { dir, force: false }
    };
    dispatch(command, prompter)
}
