use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "instrack")]
#[command(about = "Instrack - record who was issued which instrument, and report on it")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Path to the configuration file (defaults are used if it does not exist)
    #[arg(short, long, global = true, env = "INSTRACK_CONFIG", default_value = "instrack.yaml")]
    pub config: PathBuf,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "compact")]
    pub log_format: LogFormatArg,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration file and initialise an empty store
    Init {
        /// Output path for the configuration file (defaults to --config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate the configuration file
    Validate,

    /// List the instruments that can be issued
    Catalog,

    /// Record a new instrument issue
    Add {
        /// Instrument name, exactly as listed in the catalog
        #[arg(short, long)]
        instrument: String,

        /// Number of units issued
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Person the instrument is issued to
        #[arg(short = 't', long)]
        issued_to: String,

        /// Issue date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        issue_date: Option<NaiveDate>,

        /// Expected return date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        return_date: Option<NaiveDate>,
    },

    /// Show all records, newest issue date first
    List {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Show records matching a filter, in the order they were recorded
    Query {
        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Generate the monthly issue report
    Report {
        /// Month to report on (YYYY-MM), defaults to the current month
        #[arg(short, long, value_parser = parse_month)]
        month: Option<NaiveDate>,

        /// Output format (defaults to the configured format)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Export the records matching a filter
    Export {
        #[command(flatten)]
        filter: FilterArgs,

        /// Output format (defaults to the configured format)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Append the rows of an external sheet to the store
    Import {
        /// CSV sheet with at least an "Issue Date" column
        file: PathBuf,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only records issued to this person ("All" for everyone)
    #[arg(short, long)]
    pub person: Option<String>,

    /// Only records for this instrument ("All" for every instrument)
    #[arg(short, long)]
    pub instrument: Option<String>,

    /// Earliest issue date (YYYY-MM-DD), defaults to the earliest recorded
    #[arg(long)]
    pub since: Option<NaiveDate>,

    /// Latest issue date (YYYY-MM-DD), defaults to the latest recorded
    #[arg(long)]
    pub until: Option<NaiveDate>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Read records from this sheet instead of the store
    #[arg(long = "source", value_name = "FILE")]
    pub path: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    /// Single-sheet CSV
    Spreadsheet,
    /// Text report, one line per record
    Report,
    /// JSON array
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormatArg {
    Pretty,
    Json,
    Compact,
}

impl LogFormatArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormatArg::Pretty => "pretty",
            LogFormatArg::Json => "json",
            LogFormatArg::Compact => "compact",
        }
    }
}

/// Parse `YYYY-MM` into the first day of that month.
pub fn parse_month(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .map_err(|_| format!("invalid month '{}', expected YYYY-MM", s))
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2024-03"), Ok(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("March").is_err());
    }

    #[test]
    fn test_add_command() {
        let cli = Cli::try_parse_from([
            "instrack",
            "add",
            "-i",
            "Lux Meter",
            "-q",
            "2",
            "-t",
            "Asha",
            "--issue-date",
            "2024-03-01",
        ])
        .unwrap();

        match cli.command {
            Commands::Add {
                instrument,
                quantity,
                issued_to,
                issue_date,
                return_date,
            } => {
                assert_eq!(instrument, "Lux Meter");
                assert_eq!(quantity, 2);
                assert_eq!(issued_to, "Asha");
                assert_eq!(issue_date, NaiveDate::from_ymd_opt(2024, 3, 1));
                assert_eq!(return_date, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_export_with_filter_and_source() {
        let cli = Cli::try_parse_from([
            "instrack",
            "export",
            "--person",
            "Raj",
            "--since",
            "2024-03-01",
            "--format",
            "spreadsheet",
            "--source",
            "upload.csv",
        ])
        .unwrap();

        match cli.command {
            Commands::Export {
                filter,
                format,
                source,
            } => {
                assert_eq!(filter.person.as_deref(), Some("Raj"));
                assert_eq!(filter.until, None);
                assert_eq!(format, Some(FormatArg::Spreadsheet));
                assert_eq!(source.path, Some(PathBuf::from("upload.csv")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
