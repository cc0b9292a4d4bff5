use anyhow::Context;
use clap::Parser;
use llauncher_core::{
    build_args, format_args_for_display, LauncherError, LAUNCHER_FAILURE_EXIT_CODE,
};
use llauncher_parser::{load_config, resolve_config_path};
use llauncher_runner::{resolve_executable, ProcessSupervisor, SignalExitPolicy};
use std::path::PathBuf;
use std::process;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "llauncher")]
#[command(version)]
#[command(about = "A launcher for llama-server", long_about = None)]
#[command(after_help = "Environment variables:\n  \
    LLAMA_CONFIG_PATH  Configuration file used when --config is not given\n  \
    RUST_LOG           Log filter (default: info)\n\n\
    Without either, config.yaml, config.yml or config.toml in the current\n\
    directory is used. Keys are the long option names of llama-server, e.g.\n\n  \
    model: path/to/model.gguf\n  \
    port: 8080\n  \
    lora:\n    \
    - adapter1.bin\n    \
    - adapter2.bin")]
struct Cli {
    /// Configuration file (YAML, or TOML with a .toml extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the generated command line and enable debug logging
    #[arg(long)]
    debug: bool,

    /// Server executable, looked up on PATH
    #[arg(long, default_value = "llama-server")]
    server_bin: String,

    /// Exit code to report when the server is killed by a signal
    /// (default: 128 + signal number)
    #[arg(long)]
    signal_exit_code: Option<i32>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            exit_code_for(&e)
        }
    };

    process::exit(code);
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let resolved = resolve_config_path(cli.config.as_deref());
    info!(
        path = %resolved.path.display(),
        source = %resolved.source,
        "Loading configuration"
    );

    let config = load_config(&resolved.path).with_context(|| {
        format!(
            "Failed to load configuration (see `llauncher --help`) from {}",
            resolved.path.display()
        )
    })?;
    let args = build_args(&config).context("Failed to build arguments")?;
    let program = resolve_executable(&cli.server_bin);

    // Printed before the executable check so a missing server still shows
    // what would have run.
    if cli.debug {
        let shown = match &program {
            Ok(path) => path.display().to_string(),
            Err(_) => cli.server_bin.clone(),
        };
        println!("DEBUG: configuration: {}", resolved.path.display());
        println!("DEBUG: command line:\n{}", render_command_line(&shown, &args));
    }

    let program = program?;

    info!(program = %program.display(), args = ?args, "Starting server");

    let policy = cli
        .signal_exit_code
        .map(SignalExitPolicy::Fixed)
        .unwrap_or_default();
    let mut supervisor = ProcessSupervisor::new().with_signal_policy(policy);
    let outcome = supervisor.run(&program, &args).await?;
    let code = outcome.exit_code(policy);

    if code == 0 {
        info!("Server exited successfully");
    } else {
        info!(code, state = %supervisor.state(), "Server exited with failure");
    }

    Ok(code)
}

fn render_command_line(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} \\\n    {}", program, format_args_for_display(args))
    }
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<LauncherError>()
        .map(LauncherError::exit_code)
        .unwrap_or(LAUNCHER_FAILURE_EXIT_CODE)
}
