// src/main.rs
//! TK-Star Gateway - bridges GPS tracker TCP frames to HTTP endpoints

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tk_star_gateway::{config::GatewayConfig, display, tracker, Gateway};

#[derive(Parser, Debug)]
#[command(name = "tk-star-gateway", version, about)]
struct Cli {
    /// Config file (defaults to ~/.config/tk-star-gateway/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Listening port, overrides the config file
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Maximum number of concurrent tracker sessions
    #[arg(long, global = true)]
    max_sessions: Option<usize>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Accept tracker connections and publish fixes (default)
    Serve,
    /// Decode one frame given as hex, e.g. "24 41 09 ..."
    Decode { frame: String },
    /// Print the resolved sink table
    Sinks,
    /// Save the resolved configuration to the config file
    WriteConfig,
}

fn load_config(cli: &Cli) -> anyhow::Result<GatewayConfig> {
    let mut config = match &cli.config {
        Some(path) => GatewayConfig::load_from(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => GatewayConfig::load().context("loading default config")?,
    };

    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(max_sessions) = cli.max_sessions {
        config.max_sessions = max_sessions;
    }

    config.validate()?;
    Ok(config)
}

fn decode_hex(text: &str) -> anyhow::Result<()> {
    let digits: String = text.chars().filter(|c| c.is_ascii_hexdigit()).collect();
    let raw = hex::decode(&digits).context("frame must be an even number of hex digits")?;

    println!("{}", display::render_frame(&raw, &tracker::decode(&raw)));
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match &cli.command {
        Some(Command::Decode { frame }) => decode_hex(frame),
        Some(Command::Sinks) => {
            let config = load_config(&cli)?;
            for sink in &config.sinks {
                println!("{}://{}{}", sink.scheme(), sink.host, sink.path_template);
            }
            Ok(())
        }
        Some(Command::WriteConfig) => {
            let config = load_config(&cli)?;
            match &cli.config {
                Some(path) => config.save_to(path)?,
                None => {
                    let path = config.save()?;
                    println!("Saved {}", path.display());
                }
            }
            Ok(())
        }
        Some(Command::Serve) | None => {
            let config = load_config(&cli)?;
            println!("Starting TK-Star gateway on port {}...", config.port);
            println!("Publishing to {} sink(s)", config.sinks.len());

            let gateway = Gateway::new(config)?;
            gateway.run().await?;
            Ok(())
        }
    }
}
