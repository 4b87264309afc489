//! reagent-check CLI - flag analyzer reagents below their minimum volume

use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use reagent_check::prelude::*;
use reagent_check::{report, CsvWriteOptions, CsvWriter, XlsxWriter, GENERIC};
use tracing::info;

/// Exit code when `--fail-on-reload` is set and something is below its minimum
const EXIT_RELOAD: u8 = 2;

#[derive(Parser)]
#[command(name = "reagent-check")]
#[command(
    author,
    version,
    about = "Compare analyzer reagent levels against minimum volumes"
)]
struct Cli {
    /// Log progress to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a status document against an analyzer's minimum volumes
    Check {
        /// Status document (PDF, PNG, JPEG, TIFF or plain text)
        document: PathBuf,

        /// Minimum volumes (xlsx, xlsm or csv), one sheet per analyzer
        #[arg(short, long)]
        thresholds: PathBuf,

        /// Analyzer sheet to use (default: the first one)
        #[arg(short, long)]
        analyzer: Option<String>,

        #[command(flatten)]
        format: FormatArgs,

        /// Header of the reagent name column in the thresholds file
        #[arg(long)]
        name_column: Option<String>,

        /// Header of the minimum volume column in the thresholds file
        #[arg(long)]
        minimum_column: Option<String>,

        /// Print the comparison as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Write the to-load list as CSV
        #[arg(long, value_name = "FILE")]
        to_load_csv: Option<PathBuf>,

        /// Write the to-load list as XLSX
        #[arg(long, value_name = "FILE")]
        to_load_xlsx: Option<PathBuf>,

        /// Write the full report (all reagents, below minimum, summary) as XLSX
        #[arg(long, value_name = "FILE.xlsx")]
        report: Option<PathBuf>,

        /// Exit with code 2 when any reagent needs reloading
        #[arg(long)]
        fail_on_reload: bool,

        #[command(flatten)]
        ocr: OcrArgs,
    },

    /// Print the readings found in a status document
    Extract {
        /// Status document (PDF, PNG, JPEG, TIFF or plain text)
        document: PathBuf,

        #[command(flatten)]
        format: FormatArgs,

        /// Print the recognized text instead of parsed readings
        #[arg(long)]
        raw: bool,

        /// Print the readings as JSON
        #[arg(long, conflicts_with = "raw")]
        json: bool,

        #[command(flatten)]
        ocr: OcrArgs,
    },

    /// List the analyzers in a thresholds file
    Analyzers {
        /// Minimum volumes (xlsx, xlsm or csv)
        thresholds: PathBuf,

        /// Header of the reagent name column
        #[arg(long)]
        name_column: Option<String>,

        /// Header of the minimum volume column
        #[arg(long)]
        minimum_column: Option<String>,
    },

    /// Inspect report table formats
    Formats {
        #[command(subcommand)]
        command: FormatsCommand,
    },
}

#[derive(Subcommand)]
enum FormatsCommand {
    /// List every known format name
    List {
        /// Custom formats (JSON)
        #[arg(long, env = "REAGENT_CHECK_FORMATS")]
        formats: Option<PathBuf>,
    },

    /// Print one format's columns as JSON
    Show {
        name: String,

        /// Custom formats (JSON)
        #[arg(long, env = "REAGENT_CHECK_FORMATS")]
        formats: Option<PathBuf>,
    },

    /// Write the custom formats as JSON
    Export {
        /// Custom formats (JSON)
        #[arg(long, env = "REAGENT_CHECK_FORMATS")]
        formats: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct FormatArgs {
    /// Report layout: generic, "Roche e801", "Beckman AU5800" or a custom format
    #[arg(short, long, default_value = GENERIC)]
    format: String,

    /// Custom formats (JSON)
    #[arg(long, env = "REAGENT_CHECK_FORMATS")]
    formats: Option<PathBuf>,
}

#[derive(Args)]
struct OcrArgs {
    /// tesseract binary
    #[arg(long, env = "REAGENT_CHECK_TESSERACT", default_value = "tesseract")]
    tesseract: PathBuf,

    /// pdftoppm binary (Poppler)
    #[arg(long, env = "REAGENT_CHECK_PDFTOPPM", default_value = "pdftoppm")]
    pdftoppm: PathBuf,

    /// Rasterization resolution for PDF pages
    #[arg(long, env = "REAGENT_CHECK_DPI", default_value = "200")]
    dpi: u32,

    /// Tesseract language, e.g. eng
    #[arg(long, env = "REAGENT_CHECK_LANG")]
    lang: Option<String>,

    /// Tesseract page segmentation mode
    #[arg(long, env = "REAGENT_CHECK_PSM")]
    psm: Option<u8>,

    /// Keep recognized text in this directory between runs
    #[arg(long, env = "REAGENT_CHECK_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// How long cached text stays fresh (seconds)
    #[arg(long, env = "REAGENT_CHECK_CACHE_TTL", default_value = "600")]
    cache_ttl: u64,
}

impl OcrArgs {
    fn engine(&self) -> CachedEngine<TesseractEngine> {
        let config = TesseractConfig {
            tesseract: self.tesseract.clone(),
            pdftoppm: self.pdftoppm.clone(),
            dpi: self.dpi,
            language: self.lang.clone(),
            psm: self.psm,
            ..Default::default()
        };
        let engine = CachedEngine::new(TesseractEngine::new(config))
            .with_ttl(Duration::from_secs(self.cache_ttl));
        match &self.cache_dir {
            Some(dir) => engine.with_dir(dir),
            None => engine,
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check {
            document,
            thresholds,
            analyzer,
            format,
            name_column,
            minimum_column,
            json,
            to_load_csv,
            to_load_xlsx,
            report,
            fail_on_reload,
            ocr,
        } => {
            let columns = ThresholdColumns {
                name: name_column,
                minimum: minimum_column,
            };
            let outputs = Outputs {
                json,
                to_load_csv,
                to_load_xlsx,
                report,
            };
            let comparison = check(
                &document,
                &thresholds,
                analyzer.as_deref(),
                &columns,
                &format,
                &ocr,
                &outputs,
            )?;
            if fail_on_reload && !comparison.all_sufficient() {
                return Ok(ExitCode::from(EXIT_RELOAD));
            }
        }
        Commands::Extract {
            document,
            format,
            raw,
            json,
            ocr,
        } => extract(&document, &format, raw, json, &ocr)?,
        Commands::Analyzers {
            thresholds,
            name_column,
            minimum_column,
        } => list_analyzers(
            &thresholds,
            &ThresholdColumns {
                name: name_column,
                minimum: minimum_column,
            },
        )?,
        Commands::Formats { command } => formats(command)?,
    }

    Ok(ExitCode::SUCCESS)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

struct Outputs {
    json: bool,
    to_load_csv: Option<PathBuf>,
    to_load_xlsx: Option<PathBuf>,
    report: Option<PathBuf>,
}

fn load_registry(formats: Option<&Path>) -> Result<FormatRegistry> {
    let mut registry = FormatRegistry::new();
    if let Some(path) = formats {
        let file =
            File::open(path).with_context(|| format!("Failed to open '{}'", path.display()))?;
        let count = registry
            .load_custom_json(BufReader::new(file))
            .with_context(|| format!("Failed to load formats from '{}'", path.display()))?;
        info!("Loaded {} custom format(s) from {}", count, path.display());
    }
    Ok(registry)
}

fn layout(args: &FormatArgs) -> Result<Layout> {
    let registry = load_registry(args.formats.as_deref())?;
    Ok(Layout::for_format(&args.format, &registry)?)
}

fn read_document(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read '{}'", path.display()))
}

fn check(
    document: &Path,
    thresholds: &Path,
    analyzer: Option<&str>,
    columns: &ThresholdColumns,
    format: &FormatArgs,
    ocr: &OcrArgs,
    outputs: &Outputs,
) -> Result<Comparison> {
    let book = open_thresholds(thresholds, columns)
        .with_context(|| format!("Failed to load minimum volumes from '{}'", thresholds.display()))?;
    let table = book.resolve(analyzer).with_context(|| {
        format!(
            "Available analyzers in '{}': {}",
            thresholds.display(),
            book.analyzers().join(", ")
        )
    })?;
    let layout = layout(format)?;

    let bytes = read_document(document)?;
    let checker = Checker::new(ocr.engine());
    let readings = checker
        .extract(&bytes, &layout)
        .with_context(|| format!("Failed to read reagent levels from '{}'", document.display()))?;
    let comparison = compare(&readings, table)?;

    if outputs.json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
    } else {
        print!("{}", report::render_table(&comparison));
    }

    if outputs.to_load_csv.is_some() || outputs.to_load_xlsx.is_some() {
        let sheet = report::to_load_sheet(&comparison);
        if let Some(path) = &outputs.to_load_csv {
            CsvWriter::write_file(&sheet, path, &CsvWriteOptions::default())
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            eprintln!("Wrote to-load list to '{}'", path.display());
        }
        if let Some(path) = &outputs.to_load_xlsx {
            let mut workbook = Workbook::new();
            workbook.add_sheet(sheet);
            XlsxWriter::write_file(&workbook, path)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            eprintln!("Wrote to-load list to '{}'", path.display());
        }
    }

    if let Some(path) = &outputs.report {
        let generated = chrono::Local::now().naive_local();
        let workbook = report::full_workbook(&readings, &comparison, generated);
        XlsxWriter::write_file(&workbook, path)
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
        eprintln!("Wrote report to '{}'", path.display());
    }

    Ok(comparison)
}

fn extract(document: &Path, format: &FormatArgs, raw: bool, json: bool, ocr: &OcrArgs) -> Result<()> {
    let bytes = read_document(document)?;
    let checker = Checker::new(ocr.engine());

    if raw {
        print!("{}", checker.recognize(&bytes)?);
        return Ok(());
    }

    let readings = checker
        .extract(&bytes, &layout(format)?)
        .with_context(|| format!("Failed to read reagent levels from '{}'", document.display()))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&readings)?);
    } else {
        let width = readings.iter().map(|r| r.name.chars().count()).max().unwrap_or(0);
        for reading in &readings {
            println!(
                "{:<width$}  {}",
                reading.name,
                CellValue::Number(reading.quantity),
                width = width
            );
        }
    }
    Ok(())
}

fn list_analyzers(thresholds: &Path, columns: &ThresholdColumns) -> Result<()> {
    let book = open_thresholds(thresholds, columns)
        .with_context(|| format!("Failed to load minimum volumes from '{}'", thresholds.display()))?;
    for table in book.tables() {
        println!("{}\t{} reagent(s)", table.analyzer(), table.len());
    }
    Ok(())
}

fn formats(command: FormatsCommand) -> Result<()> {
    match command {
        FormatsCommand::List { formats } => {
            let registry = load_registry(formats.as_deref())?;
            println!("{}", GENERIC);
            for name in registry.names() {
                println!("{}", name);
            }
        }
        FormatsCommand::Show { name, formats } => {
            let registry = load_registry(formats.as_deref())?;
            if name.trim().eq_ignore_ascii_case(GENERIC) {
                println!("{}: one 'name   ...   number' reading per line", GENERIC);
                return Ok(());
            }
            let Some(format) = registry.get(&name) else {
                bail!(
                    "Unknown format '{}' (known: {}, {})",
                    name,
                    GENERIC,
                    registry.names().join(", ")
                );
            };
            println!("{}", serde_json::to_string_pretty(format)?);
        }
        FormatsCommand::Export { formats, output } => {
            let registry = load_registry(formats.as_deref())?;
            match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create '{}'", path.display()))?;
                    registry.export_custom_json(file)?;
                    eprintln!(
                        "Exported {} custom format(s) to '{}'",
                        registry.custom_count(),
                        path.display()
                    );
                }
                None => {
                    let stdout = io::stdout();
                    let mut out = stdout.lock();
                    registry.export_custom_json(&mut out)?;
                    writeln!(out)?;
                }
            }
        }
    }
    Ok(())
}
