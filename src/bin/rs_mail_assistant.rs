use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use log::warn;

use rs_mail_assistant::auth::key_store;
use rs_mail_assistant::config::load_config;
use rs_mail_assistant::gateway::http::HttpGateway;
use rs_mail_assistant::terminal::run_tui;

#[derive(Parser)]
#[command(name = "rs_mail_assistant")]
#[command(about = "Terminal client for the mail assistant backend", long_about = None)]
struct Cli {
    /// Config file (defaults to <config dir>/rs_mail_assistant/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overrides `server_url`
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the interactive client (default)
    Tui,

    /// Store the summarization API key in the keyring
    SetApiKey,

    /// Remove the stored API key
    ForgetApiKey,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.cmd.unwrap_or(Command::Tui) {
        Command::SetApiKey => {
            eprintln!("Paste API key (end with Ctrl-D):");
            let mut key = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut key)?;
            let key = key.trim();
            if key.is_empty() {
                return Err(anyhow!("API key is required"));
            }
            key_store::save_api_key(key)?;
            println!("Saved API key to keyring");
            Ok(())
        }

        Command::ForgetApiKey => {
            if key_store::forget_api_key()? {
                println!("Removed stored API key");
            } else {
                println!("No API key stored");
            }
            Ok(())
        }

        Command::Tui => {
            let cfg = load_config(cli.config.as_deref())
                .map_err(|e| anyhow!("Configuration error: {e}"))?;
            let server = cfg.server_url(cli.server.as_deref());
            let gateway = HttpGateway::new(&server, cfg.max_upload_bytes())?;

            // keyring may be unavailable (headless sessions); the prompt still works
            let stored = key_store::load_api_key().unwrap_or_else(|e| {
                warn!("keyring unavailable: {e}");
                None
            });

            run_tui(Arc::new(gateway), cfg.settings(), stored)
        }
    }
}
