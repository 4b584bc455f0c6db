use std::{net::SocketAddr, path::PathBuf, process::ExitCode, time::Duration};

use clap::{CommandFactory, Parser, Subcommand};
use ringlight_app::{
    core::StdDelay, Client, CommandServer, Config, LogWriter, RenderLoop, SmartLedsSurface,
};
use serde_json::Value;

/// Ring light controller
///
/// Renders LED ring animations requested over the network.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = false)]
struct Cli {
    /// Actual command
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the controller daemon
    Serve {
        /// Configuration file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Command server socket address
        #[arg(short, long)]
        listen: Option<SocketAddr>,
        /// Number of LEDs in the inner ring
        #[arg(long)]
        inner: Option<u16>,
        /// Number of LEDs in the outer ring
        #[arg(long)]
        outer: Option<u16>,
        /// Global strip brightness
        #[arg(long)]
        brightness: Option<u8>,
    },
    /// Send a JSON command to the controller
    Send {
        /// Receiver of the message
        #[arg(short, long, default_value = "127.0.0.1:5555")]
        target: SocketAddr,
        /// The JSON message
        #[arg(short, long)]
        message: String,
        /// Reply waiting timeout
        #[arg(long = "timeout-ms", default_value = "10000", value_name = "MS")]
        timeout_ms: u64,
    },
    /// Generate shell completions
    Completions {
        /// The shell to generate the completions for
        #[arg(value_enum)]
        shell: clap_complete_command::Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve {
            config,
            listen,
            inner,
            outer,
            brightness,
        } => {
            let mut config = match config {
                Some(path) => Config::from_file(path)?,
                None => Config::default(),
            };
            if let Some(listen) = listen {
                config.listen = listen;
            }
            if let Some(inner) = inner {
                config.strip.inner = inner;
            }
            if let Some(outer) = outer {
                config.strip.outer = outer;
            }
            if let Some(brightness) = brightness {
                config.strip.brightness = brightness;
            }

            serve(config).await?;
        }
        Command::Send {
            target,
            message,
            timeout_ms,
        } => return send(target, &message, Duration::from_millis(timeout_ms)).await,
        Command::Completions { shell } => {
            shell.generate(&mut Cli::command(), &mut std::io::stdout());
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let geometry = config.geometry()?;
    log::info!("Starting with {:#?}", config.strip);

    let surface = SmartLedsSurface::new(
        LogWriter::default(),
        geometry.led_count(),
        config.strip.brightness,
    );
    let render = RenderLoop::spawn(surface, StdDelay, geometry, config.render_options())?;

    let server = CommandServer::bind(config.listen, render.sender()).await?;
    println!("Press Ctrl-C to quit.");
    server
        .run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                log::error!("Unable to listen for the interrupt signal: {err}");
            }
        })
        .await?;

    // The rendering thread finishes the current animation and turns the strip off.
    let surface = tokio::task::spawn_blocking(move || render.stop()).await??;
    log::info!("Strip released after {} frames", surface.writer().frames());
    Ok(())
}

async fn send(target: SocketAddr, message: &str, timeout: Duration) -> anyhow::Result<ExitCode> {
    let Ok(message) = serde_json::from_str::<Value>(message) else {
        println!("Message is no valid JSON");
        return Ok(ExitCode::FAILURE);
    };

    println!("Sending message: {message}");
    let reply = match Client::request(target, &message, timeout).await {
        Ok(reply) => reply,
        Err(err) => {
            log::warn!("{err:#}");
            println!("Message receival not confirmed");
            return Ok(ExitCode::FAILURE);
        }
    };

    println!("{reply}");
    if Client::is_success(&reply) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
