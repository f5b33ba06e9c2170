//! Release and CI tasks for the `nais` binary: `cargo xtask <task>`.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use xshell::{cmd, Shell};

const BIN_NAME: &str = "nais";
const PACKAGE: &str = "nais-cli";

#[derive(Parser)]
#[command(name = "xtask", about = "Release and CI tasks for the nais CLI")]
struct Cli {
    #[command(subcommand)]
    task: Task,
}

#[derive(Subcommand)]
enum Task {
    /// Compile the nais binary
    Build {
        #[arg(long)]
        release: bool,
    },
    /// Run unit and integration tests
    Test {
        /// Only the tests under tests/
        #[arg(long)]
        integration: bool,
    },
    /// Package a release archive named the way cargo-binstall expects
    Dist {
        /// Target triple, the host when omitted
        #[arg(long)]
        target: Option<String>,
    },
    /// Install the binary under <prefix>/bin
    Install {
        #[arg(long, default_value = "/usr/local")]
        prefix: PathBuf,
    },
    /// Formatting, clippy and tests, as run in CI
    Ci,
    Format {
        #[arg(long)]
        check: bool,
    },
    Clippy,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;
    sh.change_dir(workspace_root());

    match cli.task {
        Task::Build { release } => build(&sh, release),
        Task::Test { integration } => test(&sh, integration),
        Task::Dist { target } => dist(&sh, target.as_deref()),
        Task::Install { prefix } => install(&sh, &prefix),
        Task::Ci => {
            format(&sh, true)?;
            clippy(&sh)?;
            test(&sh, false)
        }
        Task::Format { check } => format(&sh, check),
        Task::Clippy => clippy(&sh),
    }
}

fn build(sh: &Shell, release: bool) -> Result<()> {
    let profile: &[&str] = if release { &["--release"] } else { &[] };
    cmd!(sh, "cargo build -p {PACKAGE} --bin {BIN_NAME} {profile...}").run()?;
    Ok(())
}

fn test(sh: &Shell, integration: bool) -> Result<()> {
    if integration {
        cmd!(sh, "cargo test -p {PACKAGE} --tests").run()?;
    } else {
        cmd!(sh, "cargo test --workspace").run()?;
    }
    Ok(())
}

fn dist(sh: &Shell, target: Option<&str>) -> Result<()> {
    let (target_args, release_dir, label) = match target {
        Some(triple) => (
            vec!["--target", triple],
            format!("target/{}/release", triple),
            triple,
        ),
        None => (Vec::new(), "target/release".to_string(), "host"),
    };

    cmd!(sh, "cargo build -p {PACKAGE} --release {target_args...}").run()?;

    let binary = workspace_root().join(&release_dir).join(BIN_NAME);
    if !binary.exists() {
        bail!("expected binary at {}", binary.display());
    }

    let archive = format!("{}-{}.tar.gz", BIN_NAME, label);
    cmd!(sh, "tar -czf {archive} -C {release_dir} {BIN_NAME}")
        .run()
        .with_context(|| format!("failed to write {}", archive))?;
    println!("{}", archive);
    Ok(())
}

fn install(sh: &Shell, prefix: &Path) -> Result<()> {
    cmd!(sh, "cargo install --path . --bin {BIN_NAME} --root {prefix} --locked").run()?;
    println!("Installed {}", prefix.join("bin").join(BIN_NAME).display());
    Ok(())
}

fn format(sh: &Shell, check: bool) -> Result<()> {
    let check_args: &[&str] = if check { &["--", "--check"] } else { &[] };
    cmd!(sh, "cargo fmt --all {check_args...}").run()?;
    Ok(())
}

fn clippy(sh: &Shell) -> Result<()> {
    cmd!(sh, "cargo clippy --workspace --all-targets -- -D warnings").run()?;
    Ok(())
}

fn workspace_root() -> PathBuf {
    let xtask_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    xtask_dir.parent().unwrap_or(xtask_dir).to_path_buf()
}
