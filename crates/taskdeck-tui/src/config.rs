use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/graphql/";

#[derive(Debug, Parser)]
#[command(name = "taskdeck", about = "Terminal client for organization projects and tasks")]
pub struct Cli {
    /// GraphQL endpoint
    #[arg(long, env = "TASKDECK_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Write logs to this file. The TUI logs nowhere without it.
    #[arg(long, env = "TASKDECK_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Organization slug to open at startup
    #[arg(long)]
    pub org: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Check that the endpoint answers GraphQL requests
    Ping,

    /// Create an organization and print it
    CreateOrg {
        #[arg(long)]
        name: String,

        #[arg(long)]
        slug: String,

        #[arg(long)]
        contact_email: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_tui_on_local_endpoint() {
        let cli = Cli::try_parse_from(["taskdeck"]).unwrap();
        assert_eq!(cli.endpoint, DEFAULT_ENDPOINT);
        assert!(cli.command.is_none());
        assert!(cli.org.is_none());
    }

    #[test]
    fn org_preselect() {
        let cli = Cli::try_parse_from(["taskdeck", "--org", "acme"]).unwrap();
        assert_eq!(cli.org.as_deref(), Some("acme"));
    }

    #[test]
    fn create_org_requires_all_fields() {
        assert!(Cli::try_parse_from(["taskdeck", "create-org", "--name", "Acme"]).is_err());

        let cli = Cli::try_parse_from([
            "taskdeck",
            "--endpoint",
            "http://api.test/graphql/",
            "create-org",
            "--name",
            "Acme",
            "--slug",
            "acme",
            "--contact-email",
            "ops@acme.io",
        ])
        .unwrap();
        assert_eq!(cli.endpoint, "http://api.test/graphql/");
        assert_eq!(
            cli.command,
            Some(Command::CreateOrg {
                name: "Acme".into(),
                slug: "acme".into(),
                contact_email: "ops@acme.io".into(),
            })
        );
    }
}
