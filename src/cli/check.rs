//! # Check Command
//!
//! This module implements the check/prepend command, the only command licheck
//! has.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Args;
use tracing::debug;

use licheck::config::{Config, load_config};
use licheck::info_log;
use licheck::license::LicenseResolver;
use licheck::logging::{ColorMode, init_tracing, is_verbose, set_quiet, set_verbose};
use licheck::output::{
  print_all_files_ok, print_blank_line, print_file_report, print_hint, print_start_message, print_summary,
};
use licheck::prepend::PrependPolicy;
use licheck::report::{FileReport, ReportFormat, ReportGenerator};
use licheck::scan::{ScanRequest, run_scan};
use licheck::scanner::{ScanFilters, absolutize_path};

/// Arguments for the check command
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
  /// Directory to scan recursively
  pub path: PathBuf,

  /// Only check files whose name matches this pattern (`/regex/flags` or a
  /// bare regex) [default: .+]
  pub file_pattern: Option<String>,

  /// License to look for: a file path, the license text, a `/regex/flags`
  /// pattern, or an http(s) URL
  #[arg(long, short = 'l', value_name = "LICENSE")]
  pub license: Option<String>,

  /// Prepend the license to files that are missing it
  #[arg(
    long,
    short = 'p',
    value_name = "WHEN",
    num_args = 0..=1,
    require_equals = true,
    default_missing_value = "missing",
    value_enum,
    help = "Prepend the license to files that are missing it

--prepend or --prepend=missing: only files with no license line
--prepend=partial: also files with part of the license"
  )]
  pub prepend: Option<PrependPolicy>,

  /// Turn escaped `\n` sequences in the license into newlines
  #[arg(long, short = 'n')]
  pub normalize_newlines: bool,

  /// Skip files whose name matches this pattern
  #[arg(long, short = 'e', value_name = "FILE_PATTERN")]
  pub exclude: Option<String>,

  /// Only enter directories whose name matches this pattern [default: .+]
  #[arg(long, short = 'd', value_name = "DIR_PATTERN")]
  pub dir_pattern: Option<String>,

  /// Skip directories whose name matches this pattern [default:
  /// ^node_modules, only when --dir-pattern is not given either]
  #[arg(long, value_name = "DIR_PATTERN")]
  pub exclude_dir: Option<String>,

  /// Maximum number of files processed at once [default: unbounded]
  #[arg(long, short = 'j', value_name = "N")]
  pub jobs: Option<usize>,

  /// Path to config file (default: .licheck.toml in the scanned directory)
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Ignore config file even if present
  #[arg(long)]
  pub no_config: bool,

  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Only print paths of files missing the license, and errors
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Control when to use colored output (auto, never, always)
  #[arg(
    long,
    value_name = "WHEN",
    num_args = 0..=1,
    require_equals = true,
    default_value_t = ColorMode::Auto,
    default_missing_value = "always",
    value_enum
  )]
  pub colors: ColorMode,

  /// Generate a JSON report of license status and save to the specified path
  #[arg(long, value_name = "OUTPUT")]
  pub report_json: Option<PathBuf>,

  /// Generate a CSV report of license status and save to the specified path
  #[arg(long, value_name = "OUTPUT")]
  pub report_csv: Option<PathBuf>,
}

/// Effective settings after merging the config file under the CLI flags.
#[derive(Debug)]
struct Settings {
  license: String,
  normalize_newlines: bool,
  prepend: PrependPolicy,
  jobs: Option<usize>,
  file_pattern: String,
  exclude: Option<String>,
  dir_pattern: Option<String>,
  exclude_dir: Option<String>,
}

impl CheckArgs {
  /// Merge the command-line flags with the config file. Flags win.
  fn resolve_settings(self, config: Config) -> Result<Settings> {
    let Some(license) = self.license.or(config.license) else {
      bail!("Missing required argument: --license <LICENSE>");
    };

    let jobs = self.jobs.or(config.jobs);
    if jobs == Some(0) {
      bail!("--jobs must be at least 1");
    }

    Ok(Settings {
      license,
      normalize_newlines: self.normalize_newlines || config.normalize_newlines.unwrap_or(false),
      prepend: self.prepend.or(config.prepend).unwrap_or_default(),
      jobs,
      file_pattern: self
        .file_pattern
        .or(config.filters.files)
        .unwrap_or_else(|| ".+".to_string()),
      exclude: self.exclude.or(config.filters.exclude_files),
      dir_pattern: self.dir_pattern.or(config.filters.dirs),
      exclude_dir: self.exclude_dir.or(config.filters.exclude_dirs),
    })
  }
}

/// Run the check command with the given arguments.
///
/// # Returns
///
/// [`ExitCode::SUCCESS`] when every checked file ends the scan with the full
/// license and no file failed, [`ExitCode::FAILURE`] otherwise. Errors that
/// prevent the scan from starting are returned.
pub async fn run_check(args: CheckArgs) -> Result<ExitCode> {
  // Initialize tracing subscriber for structured logging
  init_tracing(args.quiet, args.verbose);

  if args.verbose > 0 {
    set_verbose();
  } else if args.quiet {
    set_quiet();
  }
  args.colors.apply();

  let root = absolutize_path(&args.path).context("Failed to resolve the current directory")?;
  if !root.is_dir() {
    bail!("Not a directory: {}", args.path.display());
  }

  let config = load_config(args.config.as_deref(), &root, args.no_config)?.unwrap_or_default();

  let report_json = args.report_json.clone();
  let report_csv = args.report_csv.clone();
  let settings = args.resolve_settings(config)?;
  debug!("Effective settings: {:?}", settings);

  let filters = ScanFilters::from_patterns(
    &settings.file_pattern,
    settings.exclude.as_deref(),
    settings.dir_pattern.as_deref(),
    settings.exclude_dir.as_deref(),
  )?;

  let license = LicenseResolver::new(settings.normalize_newlines)
    .resolve(&settings.license)
    .await?;
  let detect_only = license.is_pattern();

  print_start_message(&root, &license.origin);

  let request = ScanRequest::new(root.clone(), filters, license)
    .with_prepend(settings.prepend)
    .with_max_concurrency(settings.jobs)
    .with_log(is_verbose());
  request.validate()?;

  let mut reports: Vec<FileReport> = Vec::new();
  let summary = run_scan(request, |report| {
    print_file_report(report, Some(&root));
    reports.push(report.clone());
  })
  .await?;

  // Completion order is arbitrary; keep report files stable
  reports.sort_by(|a, b| a.path.cmp(&b.path));

  let all_satisfied = summary.errors == 0
    && reports
      .iter()
      .filter(|r| r.result.is_some())
      .all(FileReport::is_satisfied);

  print_blank_line();
  if all_satisfied {
    print_all_files_ok();
  }
  print_summary(&summary);

  if !all_satisfied && !detect_only {
    let hint = match settings.prepend {
      PrependPolicy::Never => Some("Run with --prepend to add the license to files missing it."),
      PrependPolicy::IfFullyMissing if summary.partially_found > 0 => {
        Some("Run with --prepend=partial to also add the license to partially licensed files.")
      }
      _ => None,
    };
    if let Some(hint) = hint {
      print_blank_line();
      print_hint(hint);
    }
  }

  for (format, output_path) in [(ReportFormat::Json, report_json), (ReportFormat::Csv, report_csv)] {
    let Some(output_path) = output_path else {
      continue;
    };
    let report_generator = ReportGenerator::new(format, &output_path);
    if let Err(e) = report_generator.generate(&reports, &summary) {
      eprintln!("Error generating {} report: {}", format, e);
    } else {
      info_log!("Generated {} report at {}", format, output_path.display());
    }
  }

  Ok(if all_satisfied {
    ExitCode::SUCCESS
  } else {
    ExitCode::FAILURE
  })
}
