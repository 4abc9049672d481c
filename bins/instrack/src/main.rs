//! Instrack command-line binary
//!
//! Every command is one full interaction: load configuration, load the
//! store, act, and print the result.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use cli::{Cli, Commands, FilterArgs, FormatArg, LogFormatArg, SourceArgs};
use config::{
    generate_default_config, load_or_default, save_config, validate_config, ExportFormat,
    TrackerConfig,
};
use observability::{init_logging, LogFormat};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracker::{
    default_date_range, read_sheet, summarize, CsvRecordStore, ExportOutcome, Exporter,
    FilterQuery, InMemoryRecordStore, IssueService, NewRecord, Record, RecordStore,
    TrackerError, STORE_COLUMNS,
};

type Service = IssueService<dyn RecordStore>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging("instrack", log_format(cli.log_format), &cli.log_level)?;
    debug!(?cli, "CLI arguments parsed");

    match cli.command {
        Commands::Init { output } => {
            info!("Executing 'init' command");
            init_command(output.unwrap_or(cli.config)).await
        }
        Commands::Validate => {
            info!("Executing 'validate' command");
            validate_command(&cli.config)
        }
        Commands::Catalog => {
            let config = load_checked(&cli.config)?;
            catalog_command(&config);
            Ok(())
        }
        Commands::Add {
            instrument,
            quantity,
            issued_to,
            issue_date,
            return_date,
        } => {
            info!("Executing 'add' command");
            let config = load_checked(&cli.config)?;
            let today = today();
            let candidate = NewRecord {
                instrument,
                quantity,
                issue_date: issue_date.unwrap_or(today),
                return_date: return_date.unwrap_or(today),
                issued_to,
            };
            add_command(&config, candidate).await
        }
        Commands::List { source } => {
            let config = load_checked(&cli.config)?;
            list_command(&config, &source).await
        }
        Commands::Query { filter, source } => {
            let config = load_checked(&cli.config)?;
            query_command(&config, filter, &source).await
        }
        Commands::Report {
            month,
            format,
            source,
        } => {
            info!("Executing 'report' command");
            let config = load_checked(&cli.config)?;
            let format = export_format(format, &config);
            report_command(&config, month.unwrap_or_else(today), format, &source).await
        }
        Commands::Export {
            filter,
            format,
            source,
        } => {
            info!("Executing 'export' command");
            let config = load_checked(&cli.config)?;
            let format = export_format(format, &config);
            export_command(&config, filter, format, &source).await
        }
        Commands::Import { file } => {
            info!("Executing 'import' command");
            let config = load_checked(&cli.config)?;
            import_command(&config, &file).await
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn log_format(arg: LogFormatArg) -> LogFormat {
    LogFormat::parse(arg.as_str()).unwrap_or_default()
}

fn export_format(arg: Option<FormatArg>, config: &TrackerConfig) -> ExportFormat {
    match arg {
        Some(FormatArg::Spreadsheet) => ExportFormat::Spreadsheet,
        Some(FormatArg::Report) => ExportFormat::Report,
        Some(FormatArg::Json) => ExportFormat::Json,
        None => config.export.default_format,
    }
}

/// Load config (or defaults) and refuse to continue if it is invalid.
fn load_checked(path: &Path) -> Result<TrackerConfig> {
    let config = load_or_default(path)?;
    let report = validate_config(&config);

    for warning in &report.warnings {
        warn!(field = %warning.field, message = %warning.message);
    }

    if !report.is_valid() {
        error!(
            error_count = report.errors.len(),
            "Configuration validation failed"
        );
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!("Invalid configuration in {:?}; run 'instrack validate' for details", path);
    }

    Ok(config)
}

fn open_store(config: &TrackerConfig) -> Service {
    let store: Arc<dyn RecordStore> =
        Arc::new(CsvRecordStore::from_config(&config.store, &config.dates));
    IssueService::from_config(store, config)
}

/// The store, or a read-only view over an external sheet when `--source` is given.
async fn open_source(config: &TrackerConfig, source: &SourceArgs) -> Result<Service> {
    let Some(path) = &source.path else {
        return Ok(open_store(config));
    };

    let sheet = read_sheet(path, &config.dates.formats).await?;
    if !sheet.malformed.is_empty() {
        println!(
            "[warn] Skipped {} malformed row(s) in {}",
            sheet.malformed.len(),
            path.display()
        );
    }

    let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::with_records(
        sheet.records,
        path.display().to_string(),
    ));
    Ok(IssueService::from_config(store, config))
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn print_records(records: &[Record]) {
    let header = STORE_COLUMNS.map(String::from);
    let rows: Vec<[String; 5]> = records
        .iter()
        .map(|r| {
            [
                r.instrument.clone(),
                r.quantity.to_string(),
                r.issue_date.to_string(),
                r.return_date.to_string(),
                r.issued_to.clone(),
            ]
        })
        .collect();

    let mut widths = header.clone().map(|h| h.len());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    println!("{}", format_row(&header, &widths));
    println!("{}", format_row(&widths.map(|w| "-".repeat(w)), &widths));
    for row in &rows {
        println!("{}", format_row(row, &widths));
    }
}

fn build_query(filter: &FilterArgs) -> FilterQuery {
    FilterQuery::new()
        .with_person(filter.person.clone())
        .with_instrument(filter.instrument.clone())
}

async fn init_command(output_path: PathBuf) -> Result<()> {
    info!(?output_path, "Initializing new configuration file");

    let config = generate_default_config();

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    save_config(&config, &output_path)?;

    let store = CsvRecordStore::from_config(&config.store, &config.dates);
    let existing = store.load().await?.len();

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!("Store:    {} ({} record(s))", store.location(), existing);
    println!();
    println!("Next steps:");
    println!("  1. Edit the catalog in the configuration file if needed");
    println!(
        "  2. Run 'instrack --config {:?} add -i \"Lux Meter\" -t <name>' to record an issue",
        output_path
    );
    println!(
        "  3. Run 'instrack --config {:?} report' for this month's report",
        output_path
    );

    Ok(())
}

fn validate_command(config_path: &Path) -> Result<()> {
    info!(path = ?config_path, "Validating configuration");

    let config = load_or_default(config_path).map_err(|e| {
        error!(%e, "Failed to load configuration");
        e
    })?;

    let report = validate_config(&config);

    println!("\n=== Configuration Validation Report ===\n");

    if !report.defaults_applied.is_empty() {
        println!("Defaults Applied ({}):", report.defaults_applied.len());
        for default in &report.defaults_applied {
            println!("  [info] {} = {}", default.field, default.value);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Tracker: {}", config.tracker.name);
    println!("Store: {}", config.store.path.display());
    println!("Catalog: {} instrument(s)", config.catalog.instruments.len());
    println!("Export: {} as {}", config.export.directory.display(), config.export.default_format);

    Ok(())
}

fn catalog_command(config: &TrackerConfig) {
    println!("Catalog ({} instrument(s)):", config.catalog.instruments.len());
    for instrument in &config.catalog.instruments {
        println!("  - {}", instrument);
    }
}

async fn add_command(config: &TrackerConfig, candidate: NewRecord) -> Result<()> {
    let service = open_store(config);

    match service.submit(candidate).await {
        Ok(submission) => {
            for warning in &submission.warnings {
                println!("[warn] {}", warning);
            }
            println!("[ok] Record saved successfully!");
            println!("     {}", submission.record.report_line());
            println!("{} record(s) in {}", submission.stored, service.store().location());
            Ok(())
        }
        Err(TrackerError::Rejected(errors)) => {
            for err in &errors {
                println!("[error] {}", err);
            }
            anyhow::bail!("Record not saved")
        }
        Err(e) => Err(e.into()),
    }
}

async fn list_command(config: &TrackerConfig, source: &SourceArgs) -> Result<()> {
    let service = open_source(config, source).await?;
    let records = service.all_records().await?;

    println!("All Records ({}):", records.len());
    if records.is_empty() {
        println!("No records yet.");
    } else {
        print_records(&records);
    }
    Ok(())
}

async fn query_command(config: &TrackerConfig, filter: FilterArgs, source: &SourceArgs) -> Result<()> {
    let service = open_source(config, source).await?;
    let (query, view) = service
        .query_with_bounds(build_query(&filter), filter.since, filter.until, today())
        .await?;

    if let Some(range) = query.date_range.filter(|r| r.start > r.end) {
        println!("[warn] Start date {} is after end date {}", range.start, range.end);
    }

    if view.is_empty() {
        println!("No records match the filter.");
        return Ok(());
    }

    print_records(&view);
    let summary = summarize(&view);
    println!();
    println!(
        "{} record(s), {} unit(s) issued",
        summary.records, summary.total_quantity
    );
    for (instrument, qty) in &summary.by_instrument {
        println!("  {:<30} {}", instrument, qty);
    }
    Ok(())
}

async fn report_command(
    config: &TrackerConfig,
    month: NaiveDate,
    format: ExportFormat,
    source: &SourceArgs,
) -> Result<()> {
    let service = open_source(config, source).await?;
    let (range, view) = service.monthly(month).await?;

    if view.is_empty() {
        println!("No records found for selected month.");
        return Ok(());
    }

    println!("{} record(s) found for {}", view.len(), range.label());
    let exporter = Exporter::from_config(&config.export);
    match exporter.export(&view, &range, format).await? {
        ExportOutcome::Written { path, .. } => println!("[ok] Report written to {}", path.display()),
        ExportOutcome::NoData => println!("No records found for selected month."),
    }
    Ok(())
}

async fn export_command(
    config: &TrackerConfig,
    filter: FilterArgs,
    format: ExportFormat,
    source: &SourceArgs,
) -> Result<()> {
    let service = open_source(config, source).await?;
    let today = today();
    let (query, view) = service
        .query_with_bounds(build_query(&filter), filter.since, filter.until, today)
        .await?;
    let range = query
        .date_range
        .unwrap_or_else(|| default_date_range(&view, today));

    let exporter = Exporter::from_config(&config.export);
    match exporter.export(&view, &range, format).await? {
        ExportOutcome::Written { path, records } => {
            println!("[ok] Exported {} record(s) to {}", records, path.display());
        }
        ExportOutcome::NoData => println!("Nothing to export: no records match the filter."),
    }
    Ok(())
}

async fn import_command(config: &TrackerConfig, file: &Path) -> Result<()> {
    let service = open_store(config);
    let summary = service.import(file).await?;

    println!(
        "[ok] Imported {} record(s) into {}",
        summary.imported,
        service.store().location()
    );
    if summary.undated > 0 {
        println!("[warn] {} row(s) skipped: issue date could not be read", summary.undated);
    }
    if summary.malformed > 0 {
        println!("[warn] {} row(s) skipped: quantity could not be read", summary.malformed);
    }
    Ok(())
}
