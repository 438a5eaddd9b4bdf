mod common;

use std::io::{Read, Write};
use std::net::TcpListener;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;

use crate::common::{create_tree, read_file, write_file};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn licheck() -> Result<Command, Box<dyn std::error::Error>> {
  let mut cmd = Command::cargo_bin("licheck")?;
  cmd.arg("--colors=never").env_remove("LICHECK_CONFIG").env_remove("RUST_LOG");
  Ok(cmd)
}

#[test]
fn test_check_only_reports_missing_and_fails() -> TestResult {
  let temp_dir = create_tree(&[("licensed.ts", "Copyright X\ncode"), ("missing.ts", "code")])?;

  licheck()?
    .arg("-l")
    .arg("Copyright X")
    .arg(temp_dir.path())
    .arg(r"\.ts$")
    .assert()
    .failure()
    .stdout(predicate::str::contains("missing.ts (license not found)"))
    .stdout(predicate::str::contains("licensed.ts").not())
    .stdout(predicate::str::contains("Checked 2 files: 1 found, 0 partial, 1 missing"))
    .stdout(predicate::str::contains("Run with --prepend"));

  assert_eq!(read_file(temp_dir.path(), "missing.ts")?, "code");
  Ok(())
}

#[test]
fn test_all_licensed_succeeds() -> TestResult {
  let temp_dir = create_tree(&[("a.ts", "Copyright X\ncode"), ("b.js", "no header")])?;

  licheck()?
    .args(["-l", "Copyright X"])
    .arg(temp_dir.path())
    .arg(r"/\.TS$/i")
    .assert()
    .success()
    .stdout(predicate::str::contains("All files have the license."));
  Ok(())
}

#[test]
fn test_verbose_lists_licensed_files() -> TestResult {
  let temp_dir = create_tree(&[("a.ts", "Copyright X\ncode")])?;

  licheck()?
    .args(["-v", "-l", "Copyright X"])
    .arg(temp_dir.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("\u{2713} a.ts"));
  Ok(())
}

#[test]
fn test_bare_prepend_adds_license_to_missing_files() -> TestResult {
  let temp_dir = create_tree(&[("a.ts", "code"), ("b.ts", "Copyright X\ncode")])?;

  licheck()?
    .args(["-l", "Copyright X\\nMIT", "-n", "--prepend"])
    .arg(temp_dir.path())
    .assert()
    // b.ts is only partially licensed and the bare flag leaves it alone
    .failure()
    .stdout(predicate::str::contains("a.ts (license not found, license prepended)"))
    .stdout(predicate::str::contains("b.ts (license partially found, 50.00%)"))
    .stdout(predicate::str::contains("Run with --prepend=partial"));

  assert_eq!(read_file(temp_dir.path(), "a.ts")?, "Copyright X\nMIT\ncode");
  assert_eq!(read_file(temp_dir.path(), "b.ts")?, "Copyright X\ncode");
  Ok(())
}

#[test]
fn test_partial_prepend_completes_every_file() -> TestResult {
  let temp_dir = create_tree(&[("main.ts", "Copyright X\nsome code")])?;

  licheck()?
    .args(["-l", "Copyright X\\nMIT", "-n", "--prepend=partial"])
    .arg(temp_dir.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("1 prepended"));

  assert_eq!(
    read_file(temp_dir.path(), "main.ts")?,
    "Copyright X\nMIT\nCopyright X\nsome code"
  );

  // A second run finds everything in place
  licheck()?
    .args(["-l", "Copyright X\\nMIT", "-n", "--prepend=partial"])
    .arg(temp_dir.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("1 found"));
  Ok(())
}

#[test]
fn test_regex_license_with_prepend_is_rejected() -> TestResult {
  let temp_dir = create_tree(&[("a.ts", "Copyright 2021\ncode"), ("b.ts", "code")])?;

  licheck()?
    .args(["-l", r"/Copyright \d{4}/", "--prepend"])
    .arg(temp_dir.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("Error >"))
    .stderr(predicate::str::contains("regular expression license"));

  assert_eq!(read_file(temp_dir.path(), "b.ts")?, "code");
  Ok(())
}

#[test]
fn test_regex_license_detects() -> TestResult {
  let temp_dir = create_tree(&[("a.ts", "// Copyright 2021\ncode")])?;

  licheck()?
    .args(["-l", r"/copyright \d{4}/i"])
    .arg(temp_dir.path())
    .assert()
    .success();
  Ok(())
}

#[test]
fn test_invalid_pattern_is_fatal() -> TestResult {
  let temp_dir = create_tree(&[("a.ts", "code")])?;

  licheck()?
    .args(["-l", "Copyright X"])
    .arg(temp_dir.path())
    .arg("/(unclosed/")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Error > Invalid pattern"));
  Ok(())
}

#[test]
fn test_missing_license_argument() -> TestResult {
  let temp_dir = create_tree(&[("a.ts", "code")])?;

  licheck()?
    .arg(temp_dir.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("--license"));
  Ok(())
}

#[test]
fn test_quiet_prints_only_unlicensed_paths() -> TestResult {
  let temp_dir = create_tree(&[("ok.ts", "Copyright X"), ("nested/missing.ts", "code")])?;

  licheck()?
    .args(["-q", "-l", "Copyright X"])
    .arg(temp_dir.path())
    .assert()
    .failure()
    .stdout(predicate::eq(format!(
      "{}\n",
      std::path::Path::new("nested").join("missing.ts").display()
    )));
  Ok(())
}

#[test]
fn test_node_modules_ignored_by_default() -> TestResult {
  let temp_dir = create_tree(&[("a.ts", "Copyright X"), ("node_modules/dep/index.ts", "code")])?;

  licheck()?
    .args(["-l", "Copyright X"])
    .arg(temp_dir.path())
    .assert()
    .success();

  // Overriding the directory exclude brings it back
  licheck()?
    .args(["-l", "Copyright X", "--exclude-dir", "^dist$"])
    .arg(temp_dir.path())
    .assert()
    .failure()
    .stdout(predicate::str::contains("index.ts (license not found)"));

  // So does a custom directory include with no exclude
  licheck()?
    .args(["-l", "Copyright X", "-d", ".+"])
    .arg(temp_dir.path())
    .assert()
    .failure()
    .stdout(predicate::str::contains("index.ts (license not found)"));
  Ok(())
}

#[test]
fn test_config_file_supplies_defaults() -> TestResult {
  let temp_dir = create_tree(&[
    ("HEADER.txt", "Copyright X\nMIT"),
    ("src/a.ts", "code"),
    ("src/b.js", "code"),
  ])?;
  let header = temp_dir.path().join("HEADER.txt");
  write_file(
    temp_dir.path(),
    ".licheck.toml",
    &format!(
      "license = '{}'\nprepend = \"missing\"\n\n[filters]\nfiles = '\\.ts$'\n",
      header.display()
    ),
  )?;

  licheck()?.arg(temp_dir.path()).assert().success();

  assert_eq!(read_file(temp_dir.path(), "src/a.ts")?, "Copyright X\nMIT\ncode");
  assert_eq!(read_file(temp_dir.path(), "src/b.js")?, "code");
  Ok(())
}

#[test]
fn test_no_config_ignores_config_file() -> TestResult {
  let temp_dir = create_tree(&[("a.ts", "code")])?;
  write_file(temp_dir.path(), ".licheck.toml", "license = \"Copyright X\"\n")?;

  licheck()?
    .arg("--no-config")
    .arg(temp_dir.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("--license"));
  Ok(())
}

#[test]
fn test_invalid_config_is_fatal() -> TestResult {
  let temp_dir = create_tree(&[("a.ts", "code")])?;
  write_file(temp_dir.path(), ".licheck.toml", "jobs = 0\n")?;

  licheck()?
    .args(["-l", "Copyright X"])
    .arg(temp_dir.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("Error > Failed to load config"));
  Ok(())
}

#[test]
fn test_json_and_csv_reports() -> TestResult {
  let temp_dir = create_tree(&[("src/a.ts", "Copyright X"), ("src/b.ts", "code")])?;
  let json_path = temp_dir.path().join("report.json");
  let csv_path = temp_dir.path().join("report.csv");

  licheck()?
    .args(["-l", "Copyright X"])
    .arg("--report-json")
    .arg(&json_path)
    .arg("--report-csv")
    .arg(&csv_path)
    .arg(temp_dir.path().join("src"))
    .assert()
    .failure();

  let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json_path)?)?;
  assert_eq!(json["summary"]["found"], 1);
  assert_eq!(json["summary"]["not_found"], 1);
  assert_eq!(json["files"].as_array().map(Vec::len), Some(2));

  let csv = std::fs::read_to_string(&csv_path)?;
  assert!(csv.starts_with("file_path,status,ratio,prepended,error\n"));
  assert!(csv.contains(",not_found,0.0000,false,"));
  Ok(())
}

#[test]
fn test_colors_never_has_no_escape_codes() -> TestResult {
  let temp_dir = create_tree(&[("a.ts", "code")])?;

  let output = licheck()?
    .args(["-l", "Copyright X"])
    .arg(temp_dir.path())
    .output()?;
  assert!(!String::from_utf8(output.stdout)?.contains("\x1b["));
  Ok(())
}

#[test]
fn test_url_not_found_aborts_before_scanning() -> TestResult {
  let listener = TcpListener::bind("127.0.0.1:0")?;
  let addr = listener.local_addr()?;
  let server = std::thread::spawn(move || {
    if let Ok((mut socket, _)) = listener.accept() {
      let mut request = Vec::new();
      let mut buf = [0u8; 1024];
      while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf) {
          Ok(0) | Err(_) => break,
          Ok(n) => request.extend_from_slice(&buf[..n]),
        }
      }
      let _ = socket.write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
    }
  });

  let temp_dir = create_tree(&[("a.ts", "code")])?;
  let mut cmd = licheck()?;
  for var in ["HTTP_PROXY", "http_proxy", "HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"] {
    cmd.env_remove(var);
  }

  cmd
    .args(["-l", &format!("http://{addr}/LICENSE"), "--prepend"])
    .arg(temp_dir.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("Error > Failed to fetch license"))
    .stdout(predicate::str::contains("Checking licenses").not());

  let _ = server.join();
  assert_eq!(read_file(temp_dir.path(), "a.ts")?, "code");
  Ok(())
}

#[test]
fn test_path_must_be_a_directory() -> TestResult {
  let temp_dir = create_tree(&[("a.ts", "code")])?;

  licheck()?
    .args(["-l", "Copyright X"])
    .arg(temp_dir.path().join("a.ts"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("Error > Not a directory"));
  Ok(())
}
