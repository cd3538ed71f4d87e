pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER: &str = "http://localhost:3000";

#[derive(Parser)]
#[command(name = "schools")]
#[command(about = "Schools CLI - Command-line client for the school directory")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, env = "SCHOOLS_SERVER", default_value = DEFAULT_SERVER, help = "Base URL of a running server")]
    pub server: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "List every school, newest first")]
    List,

    #[command(about = "Add a school, optionally with an image")]
    Add(commands::add::AddArgs),

    #[command(about = "Create the database and schools table if missing")]
    Migrate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let server = cli.server.trim_end_matches('/').to_string();

    match cli.command {
        Commands::List => commands::list::handle(&server, output_format).await,
        Commands::Add(args) => commands::add::handle(&server, args, output_format).await,
        Commands::Migrate => commands::migrate::handle(output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_with_image() {
        let cli = Cli::try_parse_from([
            "schools",
            "--json",
            "--server",
            "http://schools.test:8080/",
            "add",
            "--name",
            "Test High",
            "--address",
            "123 Main Street, Area",
            "--city",
            "Springfield",
            "--state",
            "State",
            "--contact",
            "9876543210",
            "--email",
            "a@b.com",
            "--image",
            "campus.jpg",
        ])
        .unwrap();

        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        assert_eq!(cli.server, "http://schools.test:8080/");
        match cli.command {
            Commands::Add(args) => {
                assert_eq!(args.name, "Test High");
                assert_eq!(args.email_id, "a@b.com");
                assert_eq!(args.image.as_deref(), Some(std::path::Path::new("campus.jpg")));
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn add_requires_every_text_field() {
        assert!(Cli::try_parse_from(["schools", "add", "--name", "Test High"]).is_err());
    }

    #[test]
    fn list_defaults_to_text_output() {
        let cli = Cli::try_parse_from(["schools", "list"]).unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Text));
        assert!(matches!(cli.command, Commands::List));
    }
}
