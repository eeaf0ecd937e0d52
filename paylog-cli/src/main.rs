mod lifecycle;
mod retrieve;
mod supervisor;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use paylog_core::{ConfigOverrides, RecorderConfig, RecorderError};
use std::process::ExitCode;
use supervisor::{PidfileSupervisor, SERVICE_NAME};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "paylog", version, about = "Paylog — loopback HTTP request recorder")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// TCP port for the HTTP listener
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Maximum number of retained entries
    #[arg(long, global = true)]
    window: Option<usize>,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the recorder as a managed background service
    Start,
    /// Stop and remove the managed service
    Stop,
    /// Print captured entries, newest first, one JSON line each
    Log,
    /// Run the listener in the foreground (what `start` launches)
    Serve,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // clap's default usage-error exit code is 2, which the exit
            // table reserves for operational failures. Help and version
            // remain success.
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), RecorderError> {
    let overrides = ConfigOverrides {
        port: cli.port,
        window: cli.window,
    };
    let config = RecorderConfig::resolve(overrides)?;

    match cli.command {
        Command::Start => {
            let mut supervisor = PidfileSupervisor::from_env();
            let descriptor = lifecycle::descriptor(SERVICE_NAME, &config)?;
            lifecycle::start_service(&mut supervisor, &config, &descriptor)?;
            println!("Started {SERVICE_NAME} on port {}.", config.port);
            Ok(())
        }
        Command::Stop => {
            let mut supervisor = PidfileSupervisor::from_env();
            lifecycle::stop_service(&mut supervisor, SERVICE_NAME)?;
            println!("Stopped {SERVICE_NAME}.");
            Ok(())
        }
        Command::Log => retrieve::print_logs(config.port).await,
        Command::Serve => {
            info!(
                version = env!("CARGO_PKG_VERSION"),
                port = config.port,
                window = config.window,
                "Paylog recorder starting"
            );
            paylog_server::serve(config).await
        }
    }
}
