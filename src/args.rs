//! These structs provide the CLI interface for the fintrack CLI.

use crate::model::Month;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// fintrack: A command-line tool for keeping track of spending from bank statements.
///
/// Upload your monthly bank statements (PDF or text) and fintrack will add up what you spent and
/// earned in each month, sort your purchases into categories, and remember which merchant belongs
/// to which category so that it only has to ask you once.
#[derive(Debug, Parser, Clone)]
#[command(version)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration files.
    ///
    /// This is the first command you should run. Decide what directory you want to store data in
    /// and pass this as --fintrack-home. By default, it will be $HOME/fintrack.
    Init,
    /// Add the transactions of a bank statement.
    ///
    /// Merchants that fintrack does not recognize are shown with a numbered list of categories
    /// to choose from. Your answer is remembered for the next statement.
    Upload(UploadArgs),
    /// Show the totals, averages and category breakdown of a year or a month.
    Report(ReportArgs),
    /// List the categories and the merchants fintrack has learned.
    Merchants,
    /// Write the monthly totals of a year as CSV.
    Export(ExportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where fintrack data and configuration is held. Defaults to ~/fintrack
    #[arg(long, env = "FINTRACK_HOME", default_value_t = default_fintrack_home())]
    fintrack_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, fintrack_home: PathBuf) -> Self {
        Self {
            log_level,
            fintrack_home: fintrack_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn fintrack_home(&self) -> &DisplayPath {
        &self.fintrack_home
    }
}

/// (Not shown): Args for the `fintrack upload` command.
#[derive(Debug, Parser, Clone)]
pub struct UploadArgs {
    /// The statement to upload, a PDF or a text file.
    file: PathBuf,

    /// Use this year instead of the one printed on the statement.
    #[arg(long)]
    year: Option<i32>,
}

impl UploadArgs {
    pub fn new(file: impl Into<PathBuf>, year: Option<i32>) -> Self {
        Self {
            file: file.into(),
            year,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }
}

/// (Not shown): Args for the `fintrack report` command.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    /// The year to report on. Defaults to the most recent year.
    #[arg(long)]
    year: Option<i32>,

    /// Report on a single month, given by name (e.g. march) or number (e.g. 3).
    #[arg(long, value_parser = parse_month)]
    month: Option<Month>,
}

impl ReportArgs {
    pub fn new(year: Option<i32>, month: Option<Month>) -> Self {
        Self { year, month }
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn month(&self) -> Option<Month> {
        self.month
    }
}

/// (Not shown): Args for the `fintrack export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// The year to export.
    #[arg(long)]
    year: i32,

    /// The file to write. If not supplied, the CSV is written to stdout.
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,
}

impl ExportArgs {
    pub fn new(year: i32, out: Option<PathBuf>) -> Self {
        Self { year, out }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn out(&self) -> Option<&Path> {
        self.out.as_deref()
    }
}

/// Accepts a month name in any case or a month number.
fn parse_month(s: &str) -> Result<Month, String> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u32>() {
        return Month::from_number(n).ok_or_else(|| format!("{n} is not a month number"));
    }
    Month::ALL
        .into_iter()
        .find(|m| m.to_string().eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("'{s}' is not a month"))
}

fn default_fintrack_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("fintrack"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --fintrack-home or FINTRACK_HOME instead of relying on the \
                default fintrack home directory. If you continue using the program right now, you \
                may have problems!",
            );
            PathBuf::from("fintrack")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("march"), Ok(Month::March));
        assert_eq!(parse_month("DECEMBER"), Ok(Month::December));
        assert_eq!(parse_month("3"), Ok(Month::March));
        assert!(parse_month("13").is_err());
        assert!(parse_month("Smarch").is_err());
    }

    #[test]
    fn test_parse_upload() {
        let args = Args::try_parse_from([
            "fintrack",
            "--fintrack-home",
            "/tmp/ft",
            "upload",
            "March.pdf",
            "--year",
            "2024",
        ])
        .unwrap();
        assert_eq!(args.common().fintrack_home().path(), Path::new("/tmp/ft"));
        match args.command() {
            Command::Upload(upload) => {
                assert_eq!(upload.file(), Path::new("March.pdf"));
                assert_eq!(upload.year(), Some(2024));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_report_and_export() {
        let args = Args::try_parse_from(["fintrack", "report", "--month", "april"]).unwrap();
        match args.command() {
            Command::Report(r) => {
                assert_eq!(r.year(), None);
                assert_eq!(r.month(), Some(Month::April));
            }
            other => panic!("unexpected command {other:?}"),
        }

        let args = Args::try_parse_from(["fintrack", "--log-level", "debug", "export", "--year", "2023"])
            .unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
        assert!(matches!(args.command(), Command::Export(e) if e.year() == 2023 && e.out().is_none()));
    }
}
