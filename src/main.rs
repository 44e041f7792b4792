//! Akita CLI entry point.
//!
//! Wires the pieces together: parses the command line, initializes logging,
//! loads credentials, resolves the backend domain exactly once, and runs
//! the requested subcommand through the CI execution gate where required.

use akita_cli::cfg::Config;
use akita_cli::commands::{apispec, kube, login};
use akita_cli::guard::{BackendCheck, CommandContext, guard};
use akita_cli::{domain, printer};
use clap::{Parser, Subcommand};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::collections::BTreeMap;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "akita")]
#[command(about = "Akita CLI - client for the Akita/Postman Insights backend")]
#[command(version)]
struct Cli {
    /// Backend domain override (advanced)
    #[arg(long, global = true, env = "AKITA_DOMAIN", default_value = "")]
    domain: String,

    /// Enable debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert traces into an OpenAPI3 specification
    Apispec(apispec::ApispecArgs),

    /// Kubernetes integration
    Kube {
        #[command(subcommand)]
        command: KubeCommands,
    },

    /// Store API credentials locally
    Login(login::LoginArgs),
}

#[derive(Subcommand)]
enum KubeCommands {
    /// Generate a Kubernetes Secret manifest containing your API credentials
    Secret(kube::SecretArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let env: BTreeMap<String, String> = std::env::vars().collect();
    let config = Config::load(&env);

    // Resolved once per process; read-only afterwards.
    let resolved_domain = domain::resolve(&cli.domain, &config.credentials);
    printer::debug(&format!("Using backend domain {resolved_domain}"));

    let ctx = CommandContext {
        client_id: akita_cli::cfg::client_id(),
        config,
        domain: resolved_domain,
        env,
    };

    let result = match &cli.command {
        Commands::Apispec(args) => {
            let gated = guard(BackendCheck, |ctx, _argv| apispec::run(ctx, args));
            gated(&ctx, &[])
        }
        Commands::Kube { command } => match command {
            KubeCommands::Secret(args) => {
                let gated = guard(BackendCheck, |ctx, _argv| kube::run(ctx, args));
                gated(&ctx, &[])
            }
        },
        Commands::Login(args) => login::run(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Chain formatting keeps the operation context and root cause.
            printer::error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}
