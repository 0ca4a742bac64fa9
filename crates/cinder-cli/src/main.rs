mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{EXIT_FAILURE, EXIT_INSTALL_ERROR, EXIT_PROFILE_ERROR};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "cinder",
    version,
    about = "Boot and shutdown animation install engine for themed devices"
)]
struct Cli {
    /// Path to the device profile TOML.
    #[arg(long, default_value = "cinder.toml", global = true)]
    profile: PathBuf,

    /// Root of the device filesystem tree the install targets.
    #[arg(long, default_value = "/", global = true)]
    root: PathBuf,

    /// Cache directory for scratch staging and the install lock.
    #[arg(long, default_value = "~/.cache/cinder", global = true)]
    cache: String,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Install an animation package onto the device.
    Install {
        /// Package identifier, looked up in the profile's packages directory.
        package: String,
        /// Source stream is encrypted and must be decrypted by the provider.
        #[arg(long, default_value_t = false)]
        encrypted: bool,
        /// Install the shutdown animation variant instead of boot.
        #[arg(long, default_value_t = false)]
        shutdown: bool,
    },
    /// Show the descriptor and entry table of an animation archive.
    Inspect {
        /// Path to an animation zip archive.
        archive: PathBuf,
    },
    /// Show the resolved install slot and planned resolution for this device.
    Plan {
        /// Plan for the shutdown animation variant instead of boot.
        #[arg(long, default_value_t = false)]
        shutdown: bool,
        /// Optional source archive to include the planned resolution for.
        #[arg(long)]
        source: Option<PathBuf>,
    },
    /// Restore the backed-up animation into its slot.
    Restore {
        /// Restore the shutdown animation variant instead of boot.
        #[arg(long, default_value_t = false)]
        shutdown: bool,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("CINDER_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();

    let cache = expand_tilde(&cli.cache);
    let json_output = cli.json;

    let result = match cli.command {
        Commands::Install {
            package,
            encrypted,
            shutdown,
        } => commands::install::run(
            &cli.profile,
            &cli.root,
            &cache,
            &package,
            encrypted,
            shutdown,
            json_output,
        ),
        Commands::Inspect { archive } => commands::inspect::run(&archive, json_output),
        Commands::Plan { shutdown, source } => commands::plan::run(
            &cli.profile,
            &cli.root,
            shutdown,
            source.as_deref(),
            json_output,
        ),
        Commands::Restore { shutdown } => {
            commands::restore::run(&cli.profile, &cli.root, shutdown, json_output)
        }
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("profile error:") {
                EXIT_PROFILE_ERROR
            } else if msg.starts_with("install failed:") || msg.starts_with("install lock:") {
                EXIT_INSTALL_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(stripped);
        }
    }
    PathBuf::from(path)
}
