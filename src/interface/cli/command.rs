//! CLI 명령 파싱 모듈.

use clap::{Parser, Subcommand};

use crate::application::usecases::sign::SignOptions;
use crate::infrastructure::config::SettingsUpdate;

#[derive(Debug, Parser)]
#[command(name = "eb-devtools")]
#[command(about = "Signed deployment URIs for AWS Elastic Beanstalk git repositories")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print a signed deployment URI for a commit
    Sign {
        /// Target environment (defaults to the branch mapping, then EnvironmentName)
        #[arg(long)]
        environment: Option<String>,

        /// Commit reference to sign (defaults to HEAD)
        #[arg(long)]
        commit: Option<String>,
    },
    /// Show the resolved configuration, or update it when flags are given
    Config {
        /// AWS region, e.g. us-east-1
        #[arg(long)]
        region: Option<String>,

        /// Elastic Beanstalk application name
        #[arg(long)]
        application: Option<String>,

        /// Default environment name
        #[arg(long)]
        environment_name: Option<String>,

        /// Explicit dev tools endpoint (host or host:port)
        #[arg(long)]
        endpoint: Option<String>,

        /// AWS access key id
        #[arg(long)]
        access_key: Option<String>,

        /// AWS secret access key
        #[arg(long)]
        secret_key: Option<String>,
    },
}

pub enum CliAction {
    Sign(SignOptions),
    InspectConfig,
    WriteConfig(SettingsUpdate),
}

impl Cli {
    pub fn parse_action() -> CliAction {
        let cli = Cli::parse();

        match cli.command {
            Commands::Sign {
                environment,
                commit,
            } => CliAction::Sign(SignOptions {
                environment,
                commit,
            }),
            Commands::Config {
                region,
                application,
                environment_name,
                endpoint,
                access_key,
                secret_key,
            } => {
                let update = SettingsUpdate {
                    region,
                    application_name: application,
                    environment_name,
                    dev_tools_endpoint: endpoint,
                    access_key_id: access_key,
                    secret_access_key: secret_key,
                };
                if update.is_empty() {
                    CliAction::InspectConfig
                } else {
                    CliAction::WriteConfig(update)
                }
            }
        }
    }
}
