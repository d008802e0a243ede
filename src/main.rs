use clap::{Parser, Subcommand};
use gapfill::errors::{GapFillError, Result};
use gapfill::models::peaks::DetectedPeak;
use gapfill::models::scans::{DataPoint, Scan};
use gapfill::{
    load_run, FeatureRow, FeatureTable, FillSummary, GapFillConfig, GapFillTask, InMemoryRun,
    IncludedRange, Peak, RawRun, RebuildOutcome,
};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tabled::{Table, Tabled};
use tracing::subscriber::set_global_default;
use tracing::{info, instrument};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser, Debug)]
struct FillGapsArgs {
    /// The path to the json file with the aligned feature table.
    #[arg(short, long)]
    table_path: String,

    /// The path to the json file mapping each run of the table to its raw data.
    #[arg(short, long)]
    runs_path: String,

    /// The path to the json file with the gap filling settings.
    #[arg(short, long)]
    config_path: String,

    /// Where to write the gap filled table, `.msgpack` paths are written as
    /// MessagePack and anything else as json.
    #[arg(short, long)]
    output_path: String,

    // Whether the output json should be pretty printed.
    #[arg(short, long)]
    pretty: bool,
}

#[derive(Parser, Debug)]
struct WriteTemplateArgs {
    /// The path to the output files.
    #[arg(short, long)]
    output_path: String,

    /// Number of features in the template table.
    #[arg(short, long, default_value_t = 10)]
    num_features: usize,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fill the gaps of a feature table.
    FillGaps(FillGapsArgs),
    WriteTemplate(WriteTemplateArgs),
}

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let formatting_layer = BunyanFormattingLayer::new("gapfill".into(), std::io::stdout);
    let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer);

    set_global_default(subscriber).expect("Setting default subscriber failed");
    let args = Args::parse();

    let res = match args.command {
        Some(Commands::FillGaps(args)) => main_fill_gaps(args),
        Some(Commands::WriteTemplate(args)) => main_write_template(args),
        None => {
            println!("No command provided");
            Ok(())
        }
    };

    if let Err(e) = res {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn read_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let file = std::fs::File::open(path)?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}

fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    let serialized = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    std::fs::write(path, serialized)?;
    Ok(())
}

#[derive(Tabled)]
struct SummaryLine {
    outcome: &'static str,
    cells: usize,
}

fn summary_table(summary: &FillSummary) -> Table {
    let lines = vec![
        SummaryLine {
            outcome: "Detected (copied)",
            cells: summary.copied,
        },
        SummaryLine {
            outcome: "Filled",
            cells: summary.filled,
        },
        SummaryLine {
            outcome: "No signal in window",
            cells: summary.no_signal,
        },
        SummaryLine {
            outcome: "Zero area",
            cells: summary.degenerate_area,
        },
        SummaryLine {
            outcome: "No sibling peaks",
            cells: summary.no_sibling,
        },
    ];
    Table::new(lines)
}

#[instrument]
fn main_fill_gaps(args: FillGapsArgs) -> Result<()> {
    let st = Instant::now();
    let config: GapFillConfig = read_json(&args.config_path)?;
    let table: FeatureTable = read_json(&args.table_path)?;
    table.validate()?;
    let manifest: HashMap<String, String> = read_json(&args.runs_path)?;

    let runs = table
        .runs()
        .par_iter()
        .map(|name| {
            let path = manifest.get(name).ok_or_else(|| {
                GapFillError::custom(format!(
                    "No raw data path for run {} in {}",
                    name, args.runs_path
                ))
            })?;
            load_run(name, path)
        })
        .collect::<Result<Vec<InMemoryRun>>>()?;
    info!("Loaded {} runs in {:#?}", runs.len(), st.elapsed());

    let total_rows = table.len();
    let task = GapFillTask::new(Arc::new(table), runs, config);
    let handle = task.handle();
    println!("{}", handle.description());

    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
    )
    .map_err(GapFillError::custom)?;
    let bar = ProgressBar::new(total_rows as u64).with_style(style);

    let outcome = std::thread::scope(|s| {
        let worker = s.spawn(|| task.run());
        while !worker.is_finished() {
            bar.set_position(handle.processed_rows() as u64);
            std::thread::sleep(Duration::from_millis(100));
        }
        worker.join()
    })
    .map_err(|_| GapFillError::custom("Gap filling thread panicked"))??;
    bar.set_position(handle.processed_rows() as u64);
    bar.finish();

    let result = match outcome {
        RebuildOutcome::Finished(result) => result,
        RebuildOutcome::Canceled { processed_rows } => {
            println!(
                "Gap filling canceled after {} of {} rows, nothing written",
                processed_rows, total_rows
            );
            return Ok(());
        }
    };

    let put_path = Path::new(&args.output_path);
    if let Some(parent) = put_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    println!("Writing {} to {}", result.table.name, put_path.display());
    let is_msgpack = put_path
        .extension()
        .map_or(false, |x| x.eq_ignore_ascii_case("msgpack"));
    if is_msgpack {
        std::fs::write(put_path, rmp_serde::to_vec_named(&result.table)?)?;
    } else {
        if args.pretty {
            println!("Pretty printing enabled");
        }
        write_json(put_path, &result.table, args.pretty)?;
    }

    println!("{}", summary_table(&result.summary));
    println!("Finished in {:#?}", st.elapsed());
    Ok(())
}

const TEMPLATE_RUNS: [&str; 3] = ["run_a", "run_b", "run_c"];
const TEMPLATE_RT_STEP: f64 = 0.5;
const TEMPLATE_RT_SPACING: f64 = 30.0;
const TEMPLATE_RT_SIGMA: f64 = 2.0;

fn template_feature(i: usize) -> (f64, f64) {
    let rt = TEMPLATE_RT_SPACING * (i as f64 + 1.0);
    let mz = 300.0 + 25.0 * i as f64;
    (rt, mz)
}

/// Gaussian elution profiles, one per feature, with a different scale per run.
fn template_runs(num_features: usize) -> Vec<InMemoryRun> {
    let max_rt = TEMPLATE_RT_SPACING * (num_features as f64 + 1.0);
    let num_scans = (max_rt / TEMPLATE_RT_STEP) as usize;

    TEMPLATE_RUNS
        .iter()
        .enumerate()
        .map(|(run_index, name)| {
            let scale = 1e4 * (run_index as f64 + 1.0);
            let scans = (0..num_scans)
                .map(|scan_id| {
                    let rt = scan_id as f64 * TEMPLATE_RT_STEP;
                    let points = (0..num_features).filter_map(|i| {
                        let (center, mz) = template_feature(i);
                        let z = (rt - center) / TEMPLATE_RT_SIGMA;
                        let intensity = scale * (-0.5 * z * z).exp();
                        (intensity > 1.0).then(|| DataPoint::new(mz, intensity.round()))
                    });
                    Scan::from_data_points(scan_id, rt, 1, points)
                })
                .collect();
            InMemoryRun::new(*name, scans)
        })
        .collect()
}

/// Each feature is detected in all runs but one.
fn template_table(num_features: usize) -> Result<FeatureTable> {
    let runs: Vec<String> = TEMPLATE_RUNS.iter().map(|x| x.to_string()).collect();
    let mut table = FeatureTable::with_capacity("Aligned feature list", runs, num_features);
    for i in 0..num_features {
        let (rt, mz) = template_feature(i);
        let mut row = FeatureRow::new(i as u64 + 1, TEMPLATE_RUNS.len());
        for run_index in 0..TEMPLATE_RUNS.len() {
            if run_index == i % TEMPLATE_RUNS.len() {
                continue;
            }
            let height = 1e4 * (run_index as f64 + 1.0);
            let peak = DetectedPeak {
                mz,
                rt,
                height,
                area: height * TEMPLATE_RT_SIGMA * (2.0 * std::f64::consts::PI).sqrt(),
                mz_range: IncludedRange::try_new(mz - 0.005, mz + 0.005)
                    .map_err(GapFillError::custom)?,
                rt_range: IncludedRange::try_new(
                    rt - 3.0 * TEMPLATE_RT_SIGMA,
                    rt + 3.0 * TEMPLATE_RT_SIGMA,
                )
                .map_err(GapFillError::custom)?,
            };
            row.set_peak(run_index, Peak::Detected(peak));
        }
        table.add_row(row)?;
    }
    Ok(table)
}

fn main_write_template(args: WriteTemplateArgs) -> Result<()> {
    let put_path = Path::new(&args.output_path);
    std::fs::create_dir_all(put_path)?;
    println!("Writing to {}", put_path.display());

    let mut manifest = HashMap::new();
    for run in template_runs(args.num_features) {
        let run_path = put_path.join(format!("{}.json", run.name()));
        write_json(&run_path, &run, false)?;
        manifest.insert(run.name().to_string(), run_path.display().to_string());
    }

    let table_path = put_path.join("feature_table.json");
    let runs_path = put_path.join("runs.json");
    let config_path = put_path.join("gapfill_config.json");
    write_json(&table_path, &template_table(args.num_features)?, true)?;
    write_json(&runs_path, &manifest, true)?;
    write_json(&config_path, &GapFillConfig::default(), true)?;

    println!(
        "use as `gapfill fill-gaps --output-path 'filled.json' --table-path {:#?} --runs-path {:#?} --config-path {:#?}`",
        table_path, runs_path, config_path,
    );
    Ok(())
}
