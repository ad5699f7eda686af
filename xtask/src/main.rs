use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const BINARY: &str = "awg-sweep";
const SAMPLE_TEMPLATE: &str = "demos/client.conf";

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the awg-sweep workspace",
    long_about = "A unified CLI for running sweeps, generating configurations,\n\
                  CI checks and release packaging in the awg-sweep workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build awg-sweep in release mode and run it under sudo
    Sweep {
        /// Arguments passed through to awg-sweep
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Render configurations without touching the network
    Generate {
        /// Template file or directory
        #[arg(long, default_value = "conf")]
        config: String,
        /// Output directory
        #[arg(long, default_value = "output")]
        output: String,
        /// Parameter preset
        #[arg(long, default_value = "default")]
        preset: String,
    },
    /// Run CI checks (fmt, clippy, tests, smoke run)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Build awg-sweep and package it into a zip archive
    Package {
        /// Compilation target triple
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for the binary
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Generate-only run against the sample template
    Smoke,
    /// Run check + smoke
    All,
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn run_generate(config: &str, output: &str, preset: &str) {
    run_cargo(&[
        "run",
        "-p",
        "awg_sweep_cli",
        "--",
        "--config",
        config,
        "--output-dir",
        output,
        "--preset",
        preset,
        "--generate-only",
    ]);
}

fn run_sweep(args: &[String]) {
    step("Build awg-sweep");
    run_cargo(&["build", "-p", "awg_sweep_cli", "--release"]);

    let binary = Path::new("target").join("release").join(BINARY);
    eprintln!("+ sudo {} {}", binary.display(), args.join(" "));
    let status = Command::new("sudo")
        .arg(&binary)
        .args(args)
        .status()
        .expect("failed to execute sudo");
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn package_release(target: &str, profile: BuildProfile) {
    ensure_rust_target_installed(target);

    step("Build awg-sweep binary");
    let mut cargo_args = vec!["build", "-p", "awg_sweep_cli", "--target", target];
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args);

    step("Package release zip");
    let binary_path = Path::new("target")
        .join(target)
        .join(profile.dir_name())
        .join(BINARY);
    let dist_dir = Path::new("target").join("dist");
    fs::create_dir_all(&dist_dir).expect("failed to create dist directory");

    let zip_path = dist_dir.join(format!("{BINARY}-{target}.zip"));
    package_zip(&binary_path, Path::new(SAMPLE_TEMPLATE), &zip_path);

    eprintln!("\nPackaged artifact:\n- {}", zip_path.display());
}

fn ensure_rust_target_installed(target: &str) {
    let output = Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output();

    let output = match output {
        Ok(value) => value,
        Err(error) => {
            eprintln!(
                "warning: failed to run `rustup target list --installed` ({error}); continuing without target preflight"
            );
            return;
        }
    };

    let installed = String::from_utf8_lossy(&output.stdout);
    if output.status.success() && !installed.lines().any(|line| line.trim() == target) {
        panic!(
            "required rust target `{target}` is not installed. install it with `rustup target add {target}` and re-run `cargo run -p xtask -- package`"
        );
    }
}

fn package_zip(binary_path: &Path, template_path: &Path, zip_path: &Path) {
    if !binary_path.exists() {
        panic!("expected binary at '{}'", binary_path.display());
    }

    let binary = fs::read(binary_path).expect("failed to read binary");
    let template = fs::read(template_path).expect("failed to read sample template");
    let file = fs::File::create(zip_path).expect("failed to create zip");
    let mut zip = ZipWriter::new(file);

    let executable = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file(BINARY, executable)
        .expect("failed to start binary entry");
    zip.write_all(&binary).expect("failed to write binary entry");

    let private = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o600);
    zip.start_file("conf/client.conf.sample", private)
        .expect("failed to start template entry");
    zip.write_all(&template)
        .expect("failed to write template entry");

    zip.finish().expect("failed to finish zip");
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test awg_sweep");
    run_cargo(&["test", "-p", "awg_sweep"]);

    step("Test awg_sweep_cli");
    run_cargo(&["test", "-p", "awg_sweep_cli"]);
}

fn ci_smoke() {
    step("Generate minimal preset from the sample template");
    run_generate(SAMPLE_TEMPLATE, "target/smoke", "minimal");

    let generated = Path::new("target/smoke/generated");
    let count = fs::read_dir(generated)
        .expect("generated directory missing")
        .count();
    if count != 2 {
        eprintln!("expected 2 generated configurations, found {count}");
        exit(1);
    }
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sweep { args } => run_sweep(&args),
        Commands::Generate {
            config,
            output,
            preset,
        } => run_generate(&config, &output, &preset),
        Commands::Ci { job } => match job {
            CiJob::Check => ci_check(),
            CiJob::Smoke => ci_smoke(),
            CiJob::All => {
                ci_check();
                ci_smoke();
            }
        },
        Commands::Package { target, profile } => package_release(&target, profile),
    }
}
