// SPDX-License-Identifier: GPL-3.0-only

//! Safely unmount, lock and eject the removable drive behind a path

mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use eject_types::TeardownMode;
use eject_udisks::{EjectError, EjectRequest, UDisksBackend, eject};

/// Unmount every filesystem on a drive, lock its encrypted volumes, then eject
/// or power it off
#[derive(Parser, Debug)]
#[command(name = "udisks-eject", version)]
#[command(about = "Safely eject the removable drive behind a path", long_about = None)]
struct Cli {
    /// Only match PATH against device nodes, not mount points
    #[arg(long)]
    raw_device: bool,

    /// Trace path resolution and teardown on stderr
    #[arg(short, long)]
    debug: bool,

    /// Print the planned teardown as JSON instead of performing it
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Device node, mount point, or a path inside a mount point
    path: PathBuf,
}

impl Cli {
    fn request(&self) -> EjectRequest {
        EjectRequest {
            path: self.path.clone(),
            search_mount_points: !self.raw_device,
            mode: if self.dry_run {
                TeardownMode::DryRun
            } else {
                TeardownMode::Execute
            },
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let backend = UDisksBackend::connect()
        .await
        .context("Cannot reach UDisks2 on the system bus")?;

    let result = eject(&backend, &cli.request()).await;

    if let Err(e) = backend.close().await {
        tracing::debug!("closing system bus connection failed: {e}");
    }

    let report = result?;
    tracing::debug!(
        block = %report.block,
        drive = %report.drive.id,
        steps = report.steps.len(),
        "eject finished"
    );

    if cli.dry_run {
        println!("{}", serde_json::to_string_pretty(&report.steps)?);
    }

    Ok(())
}

fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<EjectError>()
        .map(EjectError::exit_code)
        .unwrap_or(1)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.debug);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("udisks-eject: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}
