//! # licheck
//!
//! Checks that source files carry a license header, and optionally adds it.

mod cli;

use std::process::ExitCode;

use licheck::output::print_error;

use crate::cli::{Cli, run_check};

#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse_args();

  match run_check(cli.check_args).await {
    Ok(code) => code,
    Err(e) => {
      print_error(&format!("{e:#}"));
      ExitCode::FAILURE
    }
  }
}
