// src/cli.rs
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::client::ScorecardClient;
use crate::config::consts::{DEFAULT_PER_PAGE, LOG_FILE};
use crate::config::{Credential, ExportFormat, ExportOptions, FetchOptions};
use crate::error::Result;
use crate::net::redact_api_key;
use crate::progress::Progress;
use crate::query::{parse_field_list, Filter};
use crate::table::ResultTable;
use crate::{file, stats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Csv,
    Tsv,
    Json,
}

impl From<FormatArg> for ExportFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Tsv => ExportFormat::Tsv,
            FormatArg::Json => ExportFormat::Json,
        }
    }
}

/// Pull College Scorecard data into flat tables and poke at it.
#[derive(Parser, Debug)]
#[command(name = "scorecard")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// More log output (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Write logs to a file instead of stderr
    #[arg(long = "log-file", value_name = "PATH", global = true,
          num_args = 0..=1, default_missing_value = LOG_FILE)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Query the API and print or export the resulting table
    Fetch(FetchArgs),
    /// Summary statistics for every numeric column of an exported file
    Describe {
        file: PathBuf,
        /// Only these columns, in this order
        #[arg(long, value_delimiter = ',', value_name = "LIST")]
        columns: Vec<String>,
    },
    /// Pearson correlation between two columns of an exported file
    Corr {
        file: PathBuf,
        x: String,
        y: String,
    },
    /// Paired t-test between two columns of an exported file
    Ttest {
        file: PathBuf,
        a: String,
        b: String,
    },
}

#[derive(clap::Args, Debug)]
pub struct FetchArgs {
    /// Server-side filter, e.g. `latest.student.size__range=25000..`
    #[arg(long, value_name = "FILTER")]
    pub filter: String,

    /// Comma-separated dotted field names, order kept
    #[arg(long, value_name = "LIST", default_value = "id,school.name")]
    pub fields: String,

    /// Extra constraints applied to the table after download (repeatable)
    #[arg(long = "where", value_name = "FILTER")]
    pub where_: Vec<String>,

    #[arg(long = "per-page", default_value_t = DEFAULT_PER_PAGE)]
    pub per_page: u32,

    #[arg(long, default_value_t = 0)]
    pub page: u32,

    /// Walk every page from 0 instead of fetching one
    #[arg(long = "all-pages")]
    pub all_pages: bool,

    /// Stop after this many pages (with --all-pages)
    #[arg(long = "max-pages", value_name = "N", requires = "all_pages")]
    pub max_pages: Option<u32>,

    #[arg(long = "api-key", value_name = "KEY", conflicts_with = "api_key_file")]
    pub api_key: Option<String>,

    /// File whose first non-empty line is the api key
    #[arg(long = "api-key-file", value_name = "PATH")]
    pub api_key_file: Option<PathBuf>,

    /// Output file or directory; stdout when omitted
    #[arg(short = 'o', long = "out", value_name = "PATH")]
    pub out: Option<String>,

    /// Output format (inferred from -o extension when not given, else csv)
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    #[arg(long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,

    #[arg(long, value_name = "PATH")]
    pub dataset: Option<String>,

    /// Warn about requested fields that came back without a column
    #[arg(long = "warn-unresolved")]
    pub warn_unresolved: bool,

    /// Skip the local request-quota ledger
    #[arg(long = "no-quota")]
    pub no_quota: bool,

    /// Print the request URL (key redacted) and exit
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

pub fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Fetch(f) => fetch(f),
        Command::Describe { file, columns } => describe(&file, &columns),
        Command::Corr { file, x, y } => {
            let table = file::import_table(&file, None)?;
            match stats::correlation(&table, &x, &y)? {
                Some(r) => println!("{r:.6}"),
                None => println!("NaN"),
            }
            Ok(())
        }
        Command::Ttest { file, a, b } => {
            let table = file::import_table(&file, None)?;
            let t = stats::paired_t_test(&table, &a, &b)?;
            println!("n={} mean_diff={:.6} t={:.6} df={} p={:.6}", t.n, t.mean_diff, t.t, t.df, t.p_value);
            Ok(())
        }
    }
}

/// Stderr progress lines for --all-pages.
struct StderrProgress {
    total: u32,
}

impl Progress for StderrProgress {
    fn begin(&mut self, total_pages: u32) {
        self.total = total_pages;
    }
    fn page_done(&mut self, page: u32, rows: usize) {
        eprintln!("page {}/{}: {} rows", page + 1, self.total, rows);
    }
    fn log(&mut self, msg: &str) {
        eprintln!("{msg}");
    }
}

fn fetch(args: FetchArgs) -> Result<()> {
    let filter: Filter = args.filter.parse()?;
    let locals: Vec<Filter> = args.where_.iter().map(|w| w.parse()).collect::<Result<_>>()?;

    let mut options = FetchOptions {
        per_page: args.per_page,
        warn_unresolved: args.warn_unresolved,
        ..FetchOptions::default()
    };
    if let Some(b) = args.base_url { options.base_url = b; }
    if let Some(d) = args.dataset { options.dataset = d; }
    if args.no_quota { options.quota = None; }

    let credential = Credential::resolve(args.api_key.as_deref(), args.api_key_file.as_deref())?;
    let mut client = ScorecardClient::new(options)?;
    let desc = client
        .request(filter, credential)
        .fields(parse_field_list(&args.fields))
        .page(args.page);

    if args.dry_run {
        desc.validate()?;
        println!("{}", redact_api_key(&desc.url()));
        return Ok(());
    }

    let mut table = if args.all_pages {
        let mut progress = StderrProgress { total: 0 };
        client.collect_pages(&desc, args.max_pages, Some(&mut progress))?
    } else {
        client.fetch(&desc)?
    };
    for f in &locals {
        table = table.filter(f)?;
    }

    let format = args.format.map(ExportFormat::from);
    match args.out {
        Some(out) => {
            let export = ExportOptions::for_path(&out, format);
            let path = file::export_table(&table, &export)?;
            eprintln!("Wrote {} rows to {}", table.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            file::write_table_as(&mut lock, &table, format.unwrap_or(ExportFormat::Csv))?;
            lock.flush()?;
        }
    }
    Ok(())
}

fn describe(path: &std::path::Path, columns: &[String]) -> Result<()> {
    let mut table = file::import_table(path, None)?;
    if !columns.is_empty() {
        let names: Vec<&str> = columns.iter().map(String::as_str).collect();
        table = table.select(&names);
    }
    print!("{}", render_summaries(&table));
    Ok(())
}

/// Column-aligned text, one statistic per row like a describe() printout.
fn render_summaries(table: &ResultTable) -> String {
    let sums = stats::describe(table);
    if sums.is_empty() {
        return s!("no numeric columns\n");
    }
    let labels = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];
    let width = sums.iter().map(|s| s.column.len()).max().unwrap_or(0).max(12);

    let mut out = format!("{:<6}", "");
    for s in &sums {
        out.push_str(&format!(" {:>width$}", s.column));
    }
    out.push('\n');
    for (i, label) in labels.iter().enumerate() {
        out.push_str(&format!("{label:<6}"));
        for s in &sums {
            let v = [s.count as f64, s.mean, s.std, s.min, s.q25, s.median, s.q75, s.max][i];
            out.push_str(&format!(" {:>width$.4}", v));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_parse_fetch() {
        let args = Args::try_parse_from([
            "scorecard", "fetch",
            "--filter", "latest.student.size__range=25000..",
            "--fields", "id,school.name",
            "--where", "school.state=CA",
            "--api-key", "K",
            "--all-pages", "--max-pages", "2",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.verbose, 2);
        let Command::Fetch(f) = args.command else { panic!("expected fetch") };
        assert_eq!(f.where_, ["school.state=CA"]);
        assert_eq!(f.max_pages, Some(2));
        assert_eq!(f.per_page, DEFAULT_PER_PAGE);
    }

    #[test]
    fn max_pages_needs_all_pages() {
        let r = Args::try_parse_from([
            "scorecard", "fetch", "--filter", "a=1", "--max-pages", "2",
        ]);
        assert!(r.is_err());
    }

    #[test]
    fn log_file_flag_defaults_path() {
        let args = Args::try_parse_from(["scorecard", "describe", "x.csv", "--log-file"]).unwrap();
        assert_eq!(args.log_file.as_deref(), Some(std::path::Path::new(LOG_FILE)));
    }

    #[test]
    fn describe_columns_split_on_commas() {
        let args = Args::try_parse_from(["scorecard", "describe", "x.csv", "--columns", "a,b"]).unwrap();
        let Command::Describe { columns, .. } = args.command else { panic!("expected describe") };
        assert_eq!(columns, ["a", "b"]);
    }
}
