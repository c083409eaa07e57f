use std::path::PathBuf;

use clap::{Parser, Subcommand};
use portsim::commands::{self, AssetOp, ParamKind, RunOptions, View};
use portsim::data::{load_multi, load_single, load_workbook};
use portsim::init_logging;
use portsim_core::SimulationParameters;

#[derive(Parser, Debug)]
#[command(name = "portsim")]
#[command(about = "Monte Carlo projection of periodically funded portfolios")]
struct Args {
    /// Path to the data directory (default: ~/.portsim/)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct ViewArgs {
    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Percentile view to print
    #[arg(long, value_enum, default_value_t = View::Describe)]
    view: View,

    /// Also write the view to this CSV file
    #[arg(long)]
    export: Option<PathBuf>,
}

impl From<ViewArgs> for RunOptions {
    fn from(args: ViewArgs) -> Self {
        RunOptions {
            seed: args.seed,
            view: args.view,
            export: args.export,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate a single asset
    Single {
        /// YAML parameter file (defaults when omitted)
        #[arg(long)]
        params: Option<PathBuf>,

        #[command(flatten)]
        view: ViewArgs,
    },
    /// Simulate a basket of correlated assets
    Multi {
        /// YAML parameter file
        #[arg(long, conflicts_with = "workbook")]
        params: Option<PathBuf>,

        /// Workbook directory of CSV sections
        #[arg(long)]
        workbook: Option<PathBuf>,

        /// Let allocations drift instead of rebalancing every year
        #[arg(long)]
        no_rebalance: bool,

        #[command(flatten)]
        view: ViewArgs,
    },
    /// Write a parameter file filled with defaults
    Init {
        #[arg(value_enum)]
        kind: ParamKind,
        path: PathBuf,

        /// Write a workbook directory instead of YAML (multi only)
        #[arg(long)]
        workbook: bool,
    },
    /// Convert multi-asset parameters between YAML and a workbook
    Convert {
        from: PathBuf,
        to: PathBuf,

        /// Read a workbook and write YAML
        #[arg(long)]
        to_yaml: bool,
    },
    /// Add or remove the last asset of a multi-asset YAML file
    Assets {
        path: PathBuf,
        #[arg(value_enum)]
        op: AssetOp,

        /// Maximum number of assets when adding
        #[arg(long)]
        max: Option<usize>,
    },
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".portsim")
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let data_dir = args.data_dir.unwrap_or_else(default_data_dir);

    init_logging(&data_dir, &args.log_level)?;

    match args.command {
        Command::Single { params, view } => {
            let params = match params {
                Some(path) => load_single(&path)?,
                None => SimulationParameters::default(),
            };
            println!("{}", commands::run_single(params, &view.into())?);
        }
        Command::Multi {
            params,
            workbook,
            no_rebalance,
            view,
        } => {
            let mut params = match (params, workbook) {
                (Some(path), _) => load_multi(&path)?,
                (None, Some(dir)) => load_workbook(&dir)?,
                (None, None) => Default::default(),
            };
            if no_rebalance {
                params.rebalance = false;
            }
            println!("{}", commands::run_multi(params, &view.into())?);
        }
        Command::Init {
            kind,
            path,
            workbook,
        } => {
            commands::init_params(kind, &path, workbook)?;
            println!("Wrote {}", path.display());
        }
        Command::Convert { from, to, to_yaml } => {
            commands::convert(&from, &to, to_yaml)?;
            println!("Wrote {}", to.display());
        }
        Command::Assets { path, op, max } => {
            let dim = commands::resize_assets(&path, op, max)?;
            println!("{} now holds {} assets", path.display(), dim);
        }
    }

    tracing::info!("portsim finished");
    Ok(())
}
