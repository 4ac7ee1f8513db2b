//! Command-line interface: generate a wallpaper, list past predictions, or serve the HTTP API

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{value_parser, Args, Parser, Subcommand};
use engine_logging::engine_info;
use wallpaper_core::DEFAULT_GENERATION_EDGE;
use wallpaper_engine::ensure_output_dir;

use crate::config::AppConfig;
use crate::effects::EffectRunner;
use crate::progress::TerminalReporter;
use crate::server::{self, ServerState};
use crate::session::{run_generate, GenerateRequest, Reporter, SilentReporter};

#[derive(Parser, Debug)]
#[command(name = "wallpaper_app")]
#[command(author, version, about = "Generate tileable textures and export them as wallpapers")]
pub struct Cli {
    /// RON configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Also write logs to ./wallpaper.log
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a texture from a prompt and optionally export a wallpaper
    Generate(GenerateArgs),
    /// List recent predictions made with the configured model
    List,
    /// Serve the local HTTP API
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Text description of the texture
    #[arg(value_name = "PROMPT")]
    pub prompt: String,

    /// Generation width in pixels
    #[arg(
        long,
        default_value_t = DEFAULT_GENERATION_EDGE,
        value_parser = value_parser!(u32).range(1..)
    )]
    pub width: u32,

    /// Generation height in pixels
    #[arg(
        long,
        default_value_t = DEFAULT_GENERATION_EDGE,
        value_parser = value_parser!(u32).range(1..)
    )]
    pub height: u32,

    /// Wallpaper width (implies square if height not specified)
    #[arg(long, value_parser = value_parser!(u32).range(1..))]
    pub export_width: Option<u32>,

    /// Wallpaper height (implies square if width not specified)
    #[arg(long, value_parser = value_parser!(u32).range(1..))]
    pub export_height: Option<u32>,

    /// Directory for exported wallpapers
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Cancel the prediction after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl GenerateArgs {
    pub fn export_size(&self) -> Option<(u32, u32)> {
        match (self.export_width, self.export_height) {
            (Some(w), Some(h)) => Some((w, h)),
            (Some(edge), None) | (None, Some(edge)) => Some((edge, edge)),
            (None, None) => None,
        }
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,
}

impl Cli {
    /// Resolve configuration with this invocation's flags applied last.
    pub fn resolve_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        match &self.command {
            Command::Generate(args) => {
                if let Some(out) = &args.out {
                    config.output_dir = out.clone();
                }
            }
            Command::Serve(args) => {
                if let Some(host) = &args.host {
                    config.host = host.clone();
                }
                if let Some(port) = args.port {
                    config.port = port;
                }
            }
            Command::List => {}
        }
        Ok(config)
    }
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.resolve_config()?;
    match cli.command {
        Command::Generate(args) => generate(&config, &args),
        Command::List => list(&config),
        Command::Serve(_) => serve(&config),
    }
}

fn generate(config: &AppConfig, args: &GenerateArgs) -> anyhow::Result<()> {
    let services = config.build_services()?;
    let export = args.export_size();
    if export.is_some() {
        ensure_output_dir(&config.output_dir)?;
    }
    let runner = EffectRunner::new(services.poller, services.stitcher, config.output_dir.clone())
        .context("could not start engine")?;

    let request = GenerateRequest {
        prompt: args.prompt.clone(),
        width: args.width,
        height: args.height,
        export,
        timeout: args.timeout.map(Duration::from_secs),
    };
    let mut reporter: Box<dyn Reporter> = if args.quiet {
        Box::new(SilentReporter)
    } else {
        Box::new(TerminalReporter::new())
    };

    let outcome = run_generate(&runner, &request, reporter.as_mut())?;
    println!("{}\t{}", outcome.job_id, outcome.output_url);
    if let Some(path) = outcome.exported {
        println!("{}", path.display());
    }
    Ok(())
}

fn list(config: &AppConfig) -> anyhow::Result<()> {
    let services = config.build_services()?;
    let runtime = tokio::runtime::Runtime::new()?;
    let predictions = runtime.block_on(services.api.list())?;
    engine_info!("Listed {} predictions", predictions.len());
    for prediction in predictions {
        println!(
            "{}\t{}\t{}\t{}",
            prediction.id,
            prediction.status,
            prediction.output_url().unwrap_or("-"),
            prediction.input.prompt
        );
    }
    Ok(())
}

fn serve(config: &AppConfig) -> anyhow::Result<()> {
    let services = config.build_services()?;
    let state = ServerState::new(
        &services,
        (DEFAULT_GENERATION_EDGE, DEFAULT_GENERATION_EDGE),
    );
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server::serve(state, &config.host, config.port))
}
