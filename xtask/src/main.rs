//! Development automation tasks for the dynconnect workspace.
//!
//! Run with: `cargo xtask <command>`
//!
//! This is a CLI tool for developers, so `println!` and `eprintln!` are
//! intentionally used for user-facing output rather than structured logging.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::env;
use std::process::{Command, ExitCode};

use anyhow::anyhow;

mod features;

fn main() -> ExitCode {
    let task = env::args().nth(1);

    let result = match task.as_deref() {
        Some("ci") => run_ci(),
        Some("fmt") => run_fmt(),
        Some("clippy") => run_clippy(),
        Some("test") => run_test(),
        Some("examples") => run_examples(),
        Some("deny") => run_deny(),
        Some("audit") => run_audit(),
        Some("test-features") => features::test_feature_matrix(),
        Some("help") | None => {
            print_help();
            Ok(())
        }
        Some(unknown) => {
            eprintln!("Unknown task: {unknown}");
            eprintln!();
            print_help();
            Err(anyhow::anyhow!("Unknown task"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Task failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!("dynconnect Development Tasks");
    println!();
    println!("USAGE:");
    println!("    cargo xtask <TASK>");
    println!();
    println!("TASKS:");
    println!("    ci        Run all CI checks (fmt, clippy, test-features, test, examples, deny, audit)");
    println!("    fmt       Check Rust code formatting");
    println!("    clippy    Run Clippy lints");
    println!("    test      Run all tests");
    println!("    examples  Build the runnable demos");
    println!("    test-features  Verify dynconnect-infra feature matrix compiles");
    println!("    deny      Check dependencies with cargo-deny");
    println!("    audit     Audit dependencies for security vulnerabilities");
    println!("    help      Show this help message");
}

/// Run all CI checks in sequence
fn run_ci() -> anyhow::Result<()> {
    println!("==> Running CI checks...\n");

    println!("==> Step 1/7: Checking Rust format...");
    run_fmt()?;

    println!("\n==> Step 2/7: Running Clippy...");
    run_clippy()?;

    println!("\n==> Step 3/7: Checking feature combinations...");
    features::test_feature_matrix()?;

    println!("\n==> Step 4/7: Running tests...");
    run_test()?;

    println!("\n==> Step 5/7: Building examples...");
    run_examples()?;

    println!("\n==> Step 6/7: Checking dependencies...");
    run_deny()?;

    println!("\n==> Step 7/7: Auditing dependencies...");
    run_audit()?;

    println!("\n✓ All CI checks passed!");
    Ok(())
}

/// Check Rust code formatting
fn run_fmt() -> anyhow::Result<()> {
    let status = Command::new("cargo").args(["fmt", "--all", "--", "--check"]).status()?;

    if !status.success() {
        anyhow::bail!("Format check failed. Run 'cargo fmt --all' to fix.");
    }

    Ok(())
}

/// Run Clippy lints
fn run_clippy() -> anyhow::Result<()> {
    let status = Command::new("cargo")
        .args(["clippy", "--workspace", "--all-targets", "--all-features"])
        .status()?;

    if status.success() {
        Ok(())
    } else {
        Err(anyhow!("Clippy run failed. See output above."))
    }
}

/// Run all workspace tests
///
/// Keychain tests that need a real platform store are `#[ignore]`d and stay
/// skipped here.
fn run_test() -> anyhow::Result<()> {
    let status = Command::new("cargo").args(["test", "--workspace", "--all-features"]).status()?;

    if !status.success() {
        anyhow::bail!("Tests failed");
    }

    Ok(())
}

/// Build the demos under `crates/infra/examples`
fn run_examples() -> anyhow::Result<()> {
    let status =
        Command::new("cargo").args(["build", "-p", "dynconnect-infra", "--examples"]).status()?;

    if !status.success() {
        anyhow::bail!("Example build failed");
    }

    Ok(())
}

/// Check dependencies with cargo-deny
fn run_deny() -> anyhow::Result<()> {
    ensure_installed("deny", "cargo-deny")?;

    let status = Command::new("cargo").args(["deny", "check"]).status()?;

    if !status.success() {
        anyhow::bail!("cargo-deny found issues");
    }

    Ok(())
}

/// Audit dependencies for security vulnerabilities
fn run_audit() -> anyhow::Result<()> {
    ensure_installed("audit", "cargo-audit")?;

    let status = Command::new("cargo").args(["audit"]).status()?;

    if !status.success() {
        anyhow::bail!("cargo-audit found vulnerabilities");
    }

    Ok(())
}

fn ensure_installed(subcommand: &str, package: &str) -> anyhow::Result<()> {
    let check_installed = Command::new("cargo").args([subcommand, "--version"]).output();

    if check_installed.is_err() || !check_installed.as_ref().is_ok_and(|o| o.status.success()) {
        eprintln!("{package} is not installed.");
        eprintln!("Install it with: cargo install {package}");
        anyhow::bail!("{package} not found");
    }

    Ok(())
}
