//! OpsHub CLI - command-line interface for opshub.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use opshub_core::{Config, Error, Services};
use opshub_devops::DevOpsClient;
use opshub_insights::InsightsClient;
use opshub_mcp::McpServer;

#[derive(Parser)]
#[command(name = "opshub")]
#[command(author, version, about = "OpsHub - Azure DevOps and Application Insights bridge", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server on stdio
    Mcp,

    /// Start the HTTP API server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,

        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set a configuration value, e.g. `opshub config set devops.organization contoso`
    Set {
        /// Key in section.field form
        key: String,

        /// Value to store
        value: String,
    },

    /// Read a single configuration value
    Get {
        /// Key in section.field form
        key: String,
    },

    /// Show the stored configuration with credentials masked
    Show,

    /// Print the configuration file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // In MCP mode stdout carries the protocol, so logs go to stderr.
    match cli.command {
        Some(Commands::Mcp) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        _ => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    match cli.command {
        Some(Commands::Mcp) => {
            let services = build_services(&Config::load()?)?;
            McpServer::new(services).run().await?;
        }
        Some(Commands::Serve { bind, port }) => {
            let services = build_services(&Config::load()?)?;
            opshub_http::serve(&format!("{}:{}", bind, port), services).await?;
        }
        Some(Commands::Config { command }) => run_config(command)?,
        None => {
            println!("OpsHub - Azure DevOps and Application Insights bridge");
            println!("Run with --help for usage information");
        }
    }

    Ok(())
}

/// Builds the provider set both servers run on. One DevOps client backs
/// work items, repositories, and test plans; the Insights client backs
/// telemetry.
fn build_services(config: &Config) -> anyhow::Result<Services> {
    let devops = config.devops.as_ref().ok_or_else(|| {
        Error::Config(
            "devops is not configured; run 'opshub config set devops.organization <org>'".into(),
        )
    })?;
    let insights = config.insights.as_ref().ok_or_else(|| {
        Error::Config(
            "insights is not configured; run 'opshub config set insights.application_id <id>'"
                .into(),
        )
    })?;

    let devops = Arc::new(DevOpsClient::from_config(devops)?);
    let insights = Arc::new(InsightsClient::from_config(insights)?);

    Ok(Services {
        work_items: devops.clone(),
        repositories: devops.clone(),
        test_plans: devops,
        telemetry: insights,
    })
}

fn run_config(command: ConfigCommands) -> anyhow::Result<()> {
    match command {
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("{} updated", key);
        }
        ConfigCommands::Get { key } => match Config::load()?.get(&key)? {
            Some(value) => println!("{}", value),
            None => println!("{} is not set", key),
        },
        ConfigCommands::Show => {
            print!("{}", toml::to_string_pretty(&masked(Config::load()?))?);
        }
        ConfigCommands::Path => {
            println!("{}", Config::config_path()?.display());
        }
    }
    Ok(())
}

/// Credentials never get echoed back to the terminal.
fn masked(mut config: Config) -> Config {
    if let Some(devops) = config.devops.as_mut() {
        if devops.pat.is_some() {
            devops.pat = Some("***".to_string());
        }
    }
    if let Some(insights) = config.insights.as_mut() {
        if insights.api_key.is_some() {
            insights.api_key = Some("***".to_string());
        }
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use opshub_core::config::{DevOpsConfig, InsightsConfig};

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::parse_from(["opshub", "serve"]);
        match cli.command {
            Some(Commands::Serve { bind, port }) => {
                assert_eq!(bind, "127.0.0.1");
                assert_eq!(port, 8080);
            }
            _ => panic!("expected serve command"),
        }
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::parse_from(["opshub", "config", "show", "--verbose"]);
        assert!(cli.verbose);
    }

    #[test]
    fn test_build_services_requires_both_sections() {
        let err = build_services(&Config::default()).unwrap_err();
        assert!(err.to_string().contains("devops is not configured"));

        let config = Config {
            devops: Some(DevOpsConfig {
                organization: "contoso".to_string(),
                project: None,
                pat: Some("secret".to_string()),
            }),
            insights: None,
        };
        let err = build_services(&config).unwrap_err();
        assert!(err.to_string().contains("insights is not configured"));
    }

    #[test]
    fn test_masked_hides_credentials() {
        let config = Config {
            devops: Some(DevOpsConfig {
                organization: "contoso".to_string(),
                project: Some("widgets".to_string()),
                pat: Some("secret".to_string()),
            }),
            insights: Some(InsightsConfig {
                application_id: "app-1".to_string(),
                api_key: Some("key".to_string()),
            }),
        };

        let shown = masked(config);
        assert_eq!(shown.devops.unwrap().pat.as_deref(), Some("***"));
        assert_eq!(shown.insights.unwrap().api_key.as_deref(), Some("***"));
    }

    #[test]
    fn test_masked_leaves_missing_credentials_alone() {
        let config = Config {
            devops: Some(DevOpsConfig {
                organization: "contoso".to_string(),
                project: None,
                pat: None,
            }),
            insights: None,
        };

        let shown = masked(config);
        assert_eq!(shown.devops.unwrap().pat, None);
        assert!(shown.insights.is_none());
    }
}
