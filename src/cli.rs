use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::output;
use crate::prompt::TerminalPicker;
use crate::providers::JenkinsProvider;

/// 128 + SIGINT, what a shell reports for an interrupted process
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Parser)]
#[command(name = "kickoff")]
#[command(author, version, about = "Start Jenkins pipelines and follow their builds", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./kickoff.{toml,json,yaml,yml})
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Jenkins base URL
    #[arg(short, long, global = true, env = "JENKINS_URL")]
    url: Option<String>,

    /// Jenkins user the API token belongs to
    #[arg(long, global = true, env = "JENKINS_USER")]
    user: Option<String>,

    /// Jenkins API token
    #[arg(long, global = true, env = "JENKINS_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Starts one or more pipelines
    #[command(visible_alias = "pipeline")]
    Start {
        /// Pipelines to start; prompts for one when omitted
        names: Vec<String>,

        /// Tails the build log to the current terminal
        #[arg(short, long, default_value_t = false)]
        tail: bool,

        /// Filters all the available pipelines by those that contain the given text
        #[arg(short, long)]
        filter: Option<String>,

        /// Stop waiting for the new build after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Lists the pipelines that can be started
    List {
        /// Filters all the available pipelines by those that contain the given text
        #[arg(short, long)]
        filter: Option<String>,
    },
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref()).context("Failed to load configuration")?;

        if let Some(url) = &self.url {
            config.jenkins.url = Some(url.clone());
        }
        if let Some(user) = &self.user {
            config.jenkins.user = Some(user.clone());
        }
        if let Some(token) = &self.token {
            config.jenkins.token = Some(token.clone());
        }

        Ok(config)
    }

    async fn execute_start(
        &self,
        config: &mut Config,
        names: &[String],
        tail: bool,
        filter: Option<String>,
        timeout: Option<u64>,
    ) -> Result<()> {
        if timeout.is_some() {
            config.tracking.timeout_secs = timeout;
        }

        let cancel = CancellationToken::new();
        let provider = JenkinsProvider::new(config, filter, cancel.clone())?;

        // Until something is triggered Ctrl-C keeps its default meaning.
        let jobs = provider.resolve(names, &TerminalPicker).await?;
        spawn_ctrl_c_handler(cancel);

        let mut stdout = tokio::io::stdout();
        let handles = provider.start(&jobs, tail, &mut stdout).await?;

        info!("Started {} pipeline(s)", handles.len());
        Ok(())
    }

    async fn execute_list(&self, config: &Config, filter: Option<String>) -> Result<()> {
        let provider = JenkinsProvider::new(config, filter, CancellationToken::new())?;
        let catalog = provider.discover().await?;

        if catalog.is_empty() {
            println!("No pipelines found");
        } else {
            println!("{}", output::catalog_table(&catalog));
        }

        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        let mut config = self.load_config()?;

        match &self.command {
            Commands::Start {
                names,
                tail,
                filter,
                timeout,
            } => {
                self.execute_start(&mut config, names, *tail, filter.clone(), *timeout)
                    .await
            }
            Commands::List { filter } => self.execute_list(&config, filter.clone()).await,
        }
    }
}

/// The first Ctrl-C stops tracking or tailing and skips the remaining
/// pipelines. A second one exits at once.
fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("Interrupted, stopping (press Ctrl-C again to quit now)");
        cancel.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });
}
