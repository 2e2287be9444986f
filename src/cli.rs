//! Command line options for the lfs-mover tool.
use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};

use crate::config::Config;
use crate::errors::LfsMoverError;
use crate::mirror::MirrorManager;
use crate::runner::ProcessRunner;
use crate::transfer::{ensure_git_lfs, run_batch, JobSpec, TransferJob, TransferMode};

/// lfs-mover - Transfer Git LFS repositories to a new hosting platform
#[derive(Parser, Default, Clone, Debug)]
pub struct LfsMoverCli {
    /// Source repository URL (repeat for a batch; pairs with --target by position)
    #[arg(short, long, required = true)]
    pub source: Vec<String>,

    /// Target repository URL (repeat for a batch; pairs with --source by position)
    #[arg(short, long, required = true)]
    pub target: Vec<String>,

    /// Working directory for cloning (default: auto-generated temp dir)
    #[arg(long)]
    pub temp_dir: Option<PathBuf>,

    /// Keep working directories after the transfer
    #[arg(long = "no-cleanup")]
    pub no_cleanup: bool,

    /// Mirror mode: clone and push ALL refs (branches, tags, remotes)
    #[arg(long)]
    pub mirror: bool,

    /// Rewrite accelerable source URLs onto the download-acceleration front
    #[arg(long)]
    pub accelerate: bool,

    /// Configure server-side pull-mirroring instead of transferring locally
    #[arg(long = "use-remote-mirror")]
    pub use_remote_mirror: bool,

    /// Path to a .env file loaded before reading configuration
    #[arg(long, default_value = ".env")]
    pub env_file: PathBuf,
}

impl LfsMoverCli {
    /// Zip `--source`/`--target` occurrences into (source, target) pairs.
    ///
    /// # Errors
    /// Error if the two flags were given a different number of times.
    fn pairs(&self) -> Result<Vec<(String, String)>, LfsMoverError> {
        if self.source.len() != self.target.len() {
            return Err(format!(
                "got {} --source but {} --target; they pair by position",
                self.source.len(),
                self.target.len()
            )
            .into());
        }
        Ok(self
            .source
            .iter()
            .cloned()
            .zip(self.target.iter().cloned())
            .collect())
    }
}

/// Run the lfs-mover tool with the provided command line options.
///
/// # Errors
/// Error if configuration is invalid or any job/registration fails.
pub async fn lfs_mover_main() -> Result<(), LfsMoverError> {
    let args = LfsMoverCli::parse();
    if args.env_file.exists() {
        match dotenv::from_path(&args.env_file) {
            Ok(()) => info!("Loaded environment from {}", args.env_file.display()),
            Err(e) => warn!("Could not load {}: {e}", args.env_file.display()),
        }
    } else {
        warn!(
            "{} not found, using the ambient environment only",
            args.env_file.display()
        );
    }
    let config = Config::from_env();
    let pairs = args.pairs()?;

    if args.use_remote_mirror {
        return configure_mirrors(&pairs, &config).await;
    }

    ensure_git_lfs(&ProcessRunner).await?;
    let jobs = build_jobs(&args, pairs, &config);
    let summary = run_batch(jobs).await;
    if summary.all_succeeded() {
        Ok(())
    } else {
        Err(format!(
            "{} transfer(s) failed: {}",
            summary.failed.len(),
            summary.failed.join(", ")
        )
        .into())
    }
}

/// Register a pull mirror for every pair; failures are isolated per pair.
async fn configure_mirrors(
    pairs: &[(String, String)],
    config: &Config,
) -> Result<(), LfsMoverError> {
    let mut failed = Vec::new();
    for (source, target) in pairs {
        if let Err(e) = MirrorManager::new(source, target, config).configure().await {
            warn!("Mirror registration failed for {source}: {e}");
            failed.push(source.clone());
        }
    }
    if failed.is_empty() {
        Ok(())
    } else {
        Err(format!(
            "{} mirror registration(s) failed: {}",
            failed.len(),
            failed.join(", ")
        )
        .into())
    }
}

/// Build one [`TransferJob`] per pair.
///
/// A caller-provided temp dir is split into one subdirectory per job so no
/// two jobs share a working directory.
fn build_jobs(args: &LfsMoverCli, pairs: Vec<(String, String)>, config: &Config) -> Vec<TransferJob> {
    let batch = pairs.len() > 1;
    pairs
        .into_iter()
        .enumerate()
        .map(|(idx, (source_url, target_url))| {
            let temp_dir = args.temp_dir.as_ref().map(|dir| {
                if batch {
                    dir.join(format!("job-{}", idx + 1))
                } else {
                    dir.clone()
                }
            });
            TransferJob::new(
                JobSpec {
                    source_url,
                    target_url,
                    mode: if args.mirror {
                        TransferMode::Mirror
                    } else {
                        TransferMode::Standard
                    },
                    accelerate: args.accelerate,
                    keep_workdir: args.no_cleanup,
                    temp_dir,
                },
                config,
            )
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        LfsMoverCli::command().debug_assert();
    }

    #[test]
    fn mismatched_pair_counts_are_rejected() {
        let args = LfsMoverCli {
            source: vec!["https://host-a/org/one".to_string()],
            target: vec![],
            ..LfsMoverCli::default()
        };
        assert!(args.pairs().is_err());
    }

    #[test]
    fn batch_jobs_get_separate_workdirs() {
        let args = LfsMoverCli {
            source: vec![
                "https://host-a/org/one".to_string(),
                "https://host-a/org/two".to_string(),
            ],
            target: vec![
                "https://host-b/org/one".to_string(),
                "https://host-b/org/two".to_string(),
            ],
            temp_dir: Some(PathBuf::from("/tmp/work")),
            ..LfsMoverCli::default()
        };
        let pairs = args.pairs().unwrap();
        let jobs = build_jobs(&args, pairs, &Config::default());
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].source_label(), "https://host-a/org/one");
    }
}
