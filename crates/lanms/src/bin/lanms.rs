use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use lanms::{process_rows, read_rows, LanmsParams, LanmsReport, LanmsRunConfig, MergeReference};
use log::info;

#[derive(Parser, Debug)]
#[command(name = "lanms", version, about = "Locality-aware NMS over quadrilateral detections")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run with a JSON config file (`input_path`, `output_path`, `params`).
    Run {
        #[arg(long)]
        config: PathBuf,
    },
    /// Merge and suppress the candidates in INPUT.
    ///
    /// INPUT holds one `x0 y0 x1 y1 x2 y2 x3 y3 score` row per candidate,
    /// either as text or as a JSON array of arrays.
    Merge {
        input: PathBuf,
        /// IoU above which adjacent candidates are merged.
        #[arg(long, default_value_t = 0.3)]
        merge_threshold: f32,
        /// IoU above which NMS suppresses a quad (defaults to the merge threshold).
        #[arg(long)]
        nms_threshold: Option<f32>,
        /// Fixed-point scale applied to coordinates before clipping.
        #[arg(long, default_value_t = 10_000.0)]
        precision: f32,
        #[arg(long, value_enum, default_value_t = ReferenceArg::MergedView)]
        reference: ReferenceArg,
        /// Write the JSON report here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReferenceArg {
    MergedView,
    LastMember,
}

impl From<ReferenceArg> for MergeReference {
    fn from(value: ReferenceArg) -> Self {
        match value {
            ReferenceArg::MergedView => MergeReference::MergedView,
            ReferenceArg::LastMember => MergeReference::LastMember,
        }
    }
}

fn init_logging(verbose: u8) {
    #[cfg(feature = "tracing")]
    {
        let _ = verbose;
        lanms::core::init_tracing();
    }
    #[cfg(not(feature = "tracing"))]
    lanms::core::init_with_level(lanms::core::level_from_verbosity(verbose));
}

fn execute(
    input: &Path,
    output: Option<&Path>,
    params: &LanmsParams,
) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("lanms", input = %input.display()).entered();

    let rows = read_rows(input)?;
    info!("read {} candidates from {}", rows.len(), input.display());
    let report: LanmsReport = process_rows(&rows, params)?;

    match output {
        Some(path) => {
            report.write_json(path)?;
            info!("wrote {} polygons to {}", report.output_count, path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Run { config } => {
            let cfg = LanmsRunConfig::load_json(&config)?;
            execute(&cfg.input_path, cfg.output_path.as_deref(), &cfg.params)
        }
        Command::Merge {
            input,
            merge_threshold,
            nms_threshold,
            precision,
            reference,
            output,
        } => {
            let params = LanmsParams {
                merge_threshold,
                nms_threshold: nms_threshold.unwrap_or(merge_threshold),
                precision,
                reference: reference.into(),
            };
            execute(&input, output.as_deref(), &params)
        }
    }
}
