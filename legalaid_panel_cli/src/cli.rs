use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use enum_dispatch::enum_dispatch;
use log::info;
use polars::prelude::*;

use legalaid_panel::{config::Config, sources, PanelPipeline, COL};

use crate::display::{display_panel_rows, display_panel_summary};
use crate::error::PanelCliResult;

/// Trait that defines what to run when a given subcommand is invoked.
#[enum_dispatch]
pub trait RunCommand {
    fn run(&self, config: Config) -> PanelCliResult<()>;
}

/// The `build` command runs the full pipeline and writes the assembled panel.
#[derive(Args, Debug)]
pub struct BuildCommand {
    #[arg(long, help = "Directory containing the raw extracts")]
    raw_data_dir: Option<PathBuf>,
    #[arg(short = 'o', long, help = "Path to write the assembled panel to")]
    output: Option<PathBuf>,
    #[arg(
        long,
        default_value_t = false,
        help = "Fail on area-code divergence across sources instead of warning"
    )]
    strict: bool,
}

impl RunCommand for BuildCommand {
    fn run(&self, config: Config) -> PanelCliResult<()> {
        info!("Running `build` subcommand");
        let mut config = config;
        if let Some(raw_data_dir) = &self.raw_data_dir {
            config.raw_data_dir = raw_data_dir.clone();
        }
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if self.strict {
            config.strict_code_sets = true;
        }
        let panel = PanelPipeline::with_config(config).run()?;
        display_panel_summary(&panel)?;
        Ok(())
    }
}

/// The `inspect` command prints rows of an already-built panel.
#[derive(Args, Debug)]
pub struct InspectCommand {
    #[arg(help = "Panel CSV to inspect; defaults to the configured output path")]
    panel_file: Option<PathBuf>,
    #[arg(short = 'a', long, help = "Only show rows for this local authority code")]
    area: Option<String>,
    #[arg(short = 'm', long, help = "Maximum number of rows to show")]
    max_results: Option<usize>,
    #[arg(
        long,
        default_value_t = false,
        help = "Print headline figures instead of rows"
    )]
    summary: bool,
}

impl RunCommand for InspectCommand {
    fn run(&self, config: Config) -> PanelCliResult<()> {
        info!("Running `inspect` subcommand");
        let path = self
            .panel_file
            .clone()
            .unwrap_or_else(|| config.output_path.clone());
        let mut panel = sources::read_csv(&path)?;
        if let Some(area) = &self.area {
            panel = panel
                .lazy()
                .filter(col(COL::LA_CODE).eq(lit(area.clone())))
                .collect()?;
        }
        if self.summary {
            display_panel_summary(&panel)?;
        } else {
            display_panel_rows(panel, self.max_results)?;
        }
        Ok(())
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    #[arg(
        short = 'c',
        long = "config",
        help = "TOML configuration file; defaults apply when omitted",
        global = true
    )]
    pub config_file: Option<PathBuf>,
}

/// Commands contains the list of subcommands avaliable for use in the CLI.
/// Each command should implmement the RunCommand trait and specify the list
/// of required args for that command.
#[derive(Subcommand, Debug)]
#[enum_dispatch(RunCommand)]
pub enum Commands {
    /// Build the balanced local-authority panel from the raw extracts
    Build(BuildCommand),
    /// Show rows or headline figures of a built panel
    Inspect(InspectCommand),
}
