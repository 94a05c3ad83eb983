use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod migrate;
pub mod serve;

#[derive(Subcommand)]
enum Command {
    /// Create the database schema
    Migrate {},
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "8080")]
        port: String,
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
        Some(Command::Migrate {}) => {
            migrate::run().await?;
        }
        Some(Command::Serve { host, port }) => {
            serve::run(host, port).await?;
        }
        None => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_defaults_the_listen_address() {
        let cli = Cli::try_parse_from(["agenda", "serve"]).unwrap();
        match cli.command {
            Some(Command::Serve { host, port }) => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, "8080");
            }
            _ => panic!("expected the serve command"),
        }
    }

    #[test]
    fn it_parses_migrate() {
        let cli = Cli::try_parse_from(["agenda", "migrate"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Migrate {})));
    }
}
