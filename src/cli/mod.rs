use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod chat;
pub mod serve;

#[derive(Subcommand)]
enum Command {
    /// Run the relay server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
    /// Start an interactive chat against a running relay
    Chat {
        /// Base URL of the relay server
        #[arg(long, default_value = "http://127.0.0.1:2222")]
        url: String,

        /// Wait for full replies instead of streaming them
        #[arg(long, action, default_value = "false")]
        buffered: bool,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // Handle each sub command
    match args.command {
        Some(Command::Serve { host, port }) => {
            serve::run(host, port).await?;
        }
        Some(Command::Chat { url, buffered }) => {
            chat::run(url, buffered).await?;
        }
        None => {}
    }

    Ok(())
}
