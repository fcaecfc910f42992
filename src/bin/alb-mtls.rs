// Copyright (c) 2025 - Cowboy AI, Inc.
//! ALB mTLS synthesizer
//!
//! Declares the mTLS load balancer stack and renders it.
//!
//! ```text
//! alb-mtls synth --out cdk.out     # write templates and manifest
//! alb-mtls print                   # template to stdout
//! alb-mtls validate                # check references, print creation order
//! ```
//!
//! Configuration: defaults, then `--config <file.json>`, then `ALB_MTLS_*`
//! environment variables, then command line flags.

use std::path::PathBuf;

use alb_mtls::template::dependency_order;
use alb_mtls::{AlbMtlsStack, App, StackConfig};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "alb-mtls")]
#[command(version, about = "Synthesize the ALB mTLS CloudFormation stack", long_about = None)]
struct Cli {
    /// Stack configuration file (JSON)
    #[arg(short, long, env = "ALB_MTLS_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "ALB_MTLS_LOG_LEVEL", global = true)]
    log_level: String,

    /// Override the stack name
    #[arg(long, global = true)]
    stack_name: Option<String>,

    /// Override the subdomain under the hosted zone
    #[arg(long, global = true)]
    subdomain: Option<String>,

    /// Override the CA bundle file
    #[arg(long, global = true)]
    ca_bundle: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the cloud assembly to a directory
    Synth {
        /// Output directory
        #[arg(short, long, default_value = "cdk.out")]
        out: PathBuf,
    },

    /// Print the rendered template to stdout
    Print,

    /// Validate the stack and print the resource creation order
    Validate,
}

impl Cli {
    fn stack_config(&self) -> Result<StackConfig> {
        let config = match &self.config {
            Some(path) => StackConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => StackConfig::default(),
        };

        let mut config = config
            .with_overrides(|key| std::env::var(key).ok())
            .context("Invalid ALB_MTLS_* environment variable")?;

        if let Some(name) = &self.stack_name {
            config.stack_name = name.clone();
        }
        if let Some(subdomain) = &self.subdomain {
            config.subdomain = subdomain.clone();
        }
        if let Some(path) = &self.ca_bundle {
            config.ca_bundle_path = path.clone();
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.stack_config()?;
    info!("Stack {} for {}.{}", config.stack_name, config.subdomain, config.zone_name);

    let mut app = App::new();
    let declared = AlbMtlsStack::new(&mut app, &config.stack_name, &config)
        .context("Failed to declare stack")?;
    let stack = app.stack(&declared.stack_name)?;

    match &cli.command {
        Command::Synth { out } => {
            let assembly = app
                .synth(out)
                .with_context(|| format!("Failed to synthesize into {}", out.display()))?;
            info!("Cloud assembly written to {}", assembly.directory.display());
        }
        Command::Print => {
            let template = stack.template().to_json_pretty().context("Failed to render template")?;
            println!("{}", template);
        }
        Command::Validate => {
            let order = dependency_order(stack.template()).context("Invalid dependency graph")?;
            stack.synth().context("Template validation failed")?;
            for (position, logical_id) in order.iter().enumerate() {
                println!("{:>3}. {}", position + 1, logical_id);
            }
            info!("{} resources, all references resolve", order.len());
        }
    }

    Ok(())
}
