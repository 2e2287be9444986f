//! Local repository transfer: clone from the source, push to the target.
use std::fs::{create_dir_all, remove_dir_all};
use std::path::PathBuf;

use log::{debug, info, warn};
use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::config::{Config, EndpointCredentials};
use crate::errors::{LfsMoverError, LfsMoverErrorKind};
use crate::runner::{run_command, CommandRunner, ProcessRunner};
use crate::urls::{accelerate_url, inject_credentials, redact_credentials};

/// Environment toggle disabling large-object smudging during clone.
const SKIP_SMUDGE_ENV: &str = "GIT_LFS_SKIP_SMUDGE";

/// Branch to push when no checked-out branch can be detected.
const FALLBACK_BRANCH: &str = "main";

/// Transfer strategy for one job.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Clone the default branch, rewire the remote, push branch and tags.
    #[default]
    Standard,

    /// Clone every ref with `--mirror` and push directly to the target.
    Mirror,
}

/// Caller-facing description of one transfer job.
#[derive(Debug, Default, Clone)]
pub struct JobSpec {
    /// Source repository URL.
    pub source_url: String,

    /// Target repository URL.
    pub target_url: String,

    /// Transfer strategy.
    pub mode: TransferMode,

    /// Rewrite the source URL onto the acceleration front before cloning.
    pub accelerate: bool,

    /// Keep the working directory after the job instead of deleting it.
    pub keep_workdir: bool,

    /// Working directory override; a fresh temp dir is allocated when unset.
    pub temp_dir: Option<PathBuf>,
}

/// How a tolerated stage ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// The stage ran to completion.
    Completed,

    /// The stage did not apply and was skipped.
    Skipped(String),

    /// The stage failed but the failure is tolerated.
    Warned(String),
}

/// Outcome record for one orchestration stage.
#[derive(Debug, Clone)]
pub struct StageReport {
    /// Stage name.
    pub name: &'static str,

    /// Stage outcome.
    pub outcome: StageOutcome,
}

impl StageReport {
    /// Record a stage outcome, logging tolerated failures as they happen.
    fn record(reports: &mut Vec<StageReport>, name: &'static str, outcome: StageOutcome) {
        match &outcome {
            StageOutcome::Completed => info!("{name}: done"),
            StageOutcome::Skipped(reason) => info!("{name}: skipped ({reason})"),
            StageOutcome::Warned(reason) => warn!("{name}: {reason}"),
        }
        reports.push(StageReport { name, outcome });
    }
}

/// One end-to-end repository transfer.
pub struct TransferJob {
    /// Source URL as given on the command line, for reporting.
    source_label: String,

    /// Source URL actually cloned (possibly accelerated).
    source_url: String,

    /// Target URL pushed to.
    target_url: String,

    /// Transfer strategy.
    mode: TransferMode,

    /// Skip large-object content; sync pointer files only.
    pointer_only: bool,

    /// Keep the working directory after the job.
    keep_workdir: bool,

    /// Job working directory, exclusively owned for the job's lifetime.
    workdir: PathBuf,

    /// Clone destination inside [`TransferJob::workdir`].
    repo_path: PathBuf,

    /// Source endpoint credentials.
    source_creds: EndpointCredentials,

    /// Target endpoint credentials.
    target_creds: EndpointCredentials,

    /// Command execution seam.
    runner: Box<dyn CommandRunner>,
}

impl TransferJob {
    /// Build a job from its spec and the process configuration.
    #[must_use]
    pub fn new(spec: JobSpec, config: &Config) -> Self {
        let source_url = if spec.accelerate {
            let rewritten = accelerate_url(&spec.source_url);
            if rewritten != spec.source_url {
                info!("Acceleration enabled: {}", redact_credentials(&rewritten));
            }
            rewritten
        } else {
            spec.source_url.clone()
        };
        let workdir = spec.temp_dir.unwrap_or_else(|| {
            let suffix: String = thread_rng()
                .sample_iter(&Alphanumeric)
                .take(10)
                .map(char::from)
                .collect();
            std::env::temp_dir().join(format!("lfs-mover-{suffix}"))
        });
        let repo_path = workdir.join("repo");
        Self {
            source_label: spec.source_url,
            source_url,
            target_url: spec.target_url,
            mode: spec.mode,
            pointer_only: config.pointer_only,
            keep_workdir: spec.keep_workdir,
            workdir,
            repo_path,
            source_creds: config.source.clone(),
            target_creds: config.target.clone(),
            runner: Box::new(ProcessRunner),
        }
    }

    /// Replace the command runner (used by tests to script git).
    #[cfg(test)]
    fn with_runner(mut self, runner: Box<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Source URL as given by the caller, for summaries.
    #[must_use]
    pub fn source_label(&self) -> &str {
        &self.source_label
    }

    /// Run the transfer to completion.
    ///
    /// Tolerated sub-steps (tag push, large-object push, the mirror-push
    /// fallback cascade) are reported in the returned stage list; clone and
    /// mandatory fetch/push failures abort the job.
    ///
    /// # Errors
    /// Error if a mandatory stage fails; the working directory is deleted
    /// unless retention was requested, in which case its path is logged for
    /// manual recovery.
    pub async fn run(&self) -> Result<Vec<StageReport>, LfsMoverError> {
        info!(
            "Transferring {} -> {} ({:?} mode)",
            redact_credentials(&self.source_url),
            redact_credentials(&self.target_url),
            self.mode
        );
        if self.pointer_only {
            warn!("Pointer-only mode: large-object content will not be downloaded");
            warn!("The push fails unless the target already holds the referenced objects");
        }
        create_dir_all(&self.workdir)?;
        let result = match self.mode {
            TransferMode::Standard => self.run_standard().await,
            TransferMode::Mirror => self.run_mirror().await,
        };
        match result {
            Ok(reports) => {
                self.cleanup();
                Ok(reports)
            }
            Err(e) => {
                warn!("Transfer failed: {e}");
                self.cleanup();
                Err(e)
            }
        }
    }

    /// Standard-mode stage sequence.
    async fn run_standard(&self) -> Result<Vec<StageReport>, LfsMoverError> {
        let mut reports = Vec::new();
        self.clone_source(false).await?;
        StageReport::record(&mut reports, "clone", StageOutcome::Completed);
        StageReport::record(&mut reports, "fetch-lfs", self.fetch_lfs_files(true).await?);
        StageReport::record(&mut reports, "rewire-remote", self.rewire_remote().await?);
        let push_reports = self.push_standard().await?;
        reports.extend(push_reports);
        Ok(reports)
    }

    /// Mirror-mode stage sequence.
    async fn run_mirror(&self) -> Result<Vec<StageReport>, LfsMoverError> {
        let mut reports = Vec::new();
        self.clone_source(true).await?;
        StageReport::record(&mut reports, "clone-mirror", StageOutcome::Completed);
        StageReport::record(&mut reports, "fetch-lfs", self.fetch_lfs_files(false).await?);
        let push_reports = self.push_mirror().await;
        reports.extend(push_reports);
        Ok(reports)
    }

    /// Clone the credential-injected source into the working directory.
    ///
    /// Smudging is disabled during the clone regardless of mode; large-object
    /// content comes from the explicit fetch stage.
    async fn clone_source(&self, mirror: bool) -> Result<(), LfsMoverError> {
        let url = inject_credentials(
            &self.source_url,
            self.source_creds.username.as_deref(),
            self.source_creds.token.as_deref(),
        )?;
        let repo_path = self.repo_path.to_string_lossy().to_string();
        let mut argv = vec!["git", "clone"];
        if mirror {
            argv.push("--mirror");
        }
        argv.push(&url);
        argv.push(&repo_path);
        run_command(self.runner.as_ref(), &argv, None, &[(SKIP_SMUDGE_ENV, "1")]).await?;
        Ok(())
    }

    /// Fetch large-object content for all refs.
    ///
    /// Skipped entirely in pointer-only mode. `checkout` materializes
    /// working-tree copies and therefore only runs on non-bare clones.
    async fn fetch_lfs_files(&self, checkout: bool) -> Result<StageOutcome, LfsMoverError> {
        if self.pointer_only {
            return Ok(StageOutcome::Skipped(
                "pointer-only mode, pointer files only".to_string(),
            ));
        }
        run_command(
            self.runner.as_ref(),
            &["git", "lfs", "fetch", "--all"],
            Some(&self.repo_path),
            &[],
        )
        .await?;
        if checkout {
            run_command(
                self.runner.as_ref(),
                &["git", "lfs", "checkout"],
                Some(&self.repo_path),
                &[],
            )
            .await?;
        }
        Ok(StageOutcome::Completed)
    }

    /// Swap the `origin` remote from the source to the target.
    async fn rewire_remote(&self) -> Result<StageOutcome, LfsMoverError> {
        let removal = run_command(
            self.runner.as_ref(),
            &["git", "remote", "remove", "origin"],
            Some(&self.repo_path),
            &[],
        )
        .await;
        let outcome = match removal {
            Ok(_) => StageOutcome::Completed,
            Err(_) => StageOutcome::Warned("origin remote not found, skipping removal".to_string()),
        };
        let url = self.target_url_with_creds()?;
        run_command(
            self.runner.as_ref(),
            &["git", "remote", "add", "origin", &url],
            Some(&self.repo_path),
            &[],
        )
        .await?;
        let remotes = run_command(
            self.runner.as_ref(),
            &["git", "remote", "-v"],
            Some(&self.repo_path),
            &[],
        )
        .await?;
        debug!("Configured remotes:\n{}", remotes.stdout);
        Ok(outcome)
    }

    /// Push the checked-out branch with tracking, then tags (tolerated).
    async fn push_standard(&self) -> Result<Vec<StageReport>, LfsMoverError> {
        let mut reports = Vec::new();
        let branch = self.current_branch().await?;
        info!("Pushing branch: {branch}");
        run_command(
            self.runner.as_ref(),
            &["git", "push", "-u", "origin", &branch, "--force"],
            Some(&self.repo_path),
            &[],
        )
        .await?;
        StageReport::record(&mut reports, "push-branch", StageOutcome::Completed);
        let tags = run_command(
            self.runner.as_ref(),
            &["git", "push", "origin", "--tags", "--force"],
            Some(&self.repo_path),
            &[],
        )
        .await;
        let outcome = match tags {
            Ok(_) => StageOutcome::Completed,
            Err(e) => StageOutcome::Warned(format!("no tags to push or push failed: {e}")),
        };
        StageReport::record(&mut reports, "push-tags", outcome);
        Ok(reports)
    }

    /// Mirror-mode push cascade, every sub-step individually tolerated.
    ///
    /// Large objects first, then one `--mirror` push of all refs; when the
    /// target rejects that (protected or platform-internal refs are the
    /// usual cause), branches and tags are pushed selectively instead.
    async fn push_mirror(&self) -> Vec<StageReport> {
        let mut reports = Vec::new();
        let url = match self.target_url_with_creds() {
            Ok(url) => url,
            Err(e) => {
                StageReport::record(
                    &mut reports,
                    "push-mirror",
                    StageOutcome::Warned(format!("cannot build target URL: {e}")),
                );
                return reports;
            }
        };
        let lfs_push = run_command(
            self.runner.as_ref(),
            &["git", "lfs", "push", &url, "--all"],
            Some(&self.repo_path),
            &[],
        )
        .await;
        let outcome = match lfs_push {
            Ok(_) => StageOutcome::Completed,
            Err(e) if self.pointer_only => StageOutcome::Warned(format!(
                "large-object push failed (expected in pointer-only mode): {e}"
            )),
            Err(e) => StageOutcome::Warned(format!("large-object push failed: {e}")),
        };
        StageReport::record(&mut reports, "push-lfs", outcome);

        let mirror_push = run_command(
            self.runner.as_ref(),
            &["git", "push", "--mirror", &url, "--force"],
            Some(&self.repo_path),
            &[],
        )
        .await;
        match mirror_push {
            Ok(_) => {
                StageReport::record(&mut reports, "push-mirror", StageOutcome::Completed);
            }
            Err(e) => {
                StageReport::record(
                    &mut reports,
                    "push-mirror",
                    StageOutcome::Warned(format!(
                        "mirror push rejected, falling back to selective pushes: {e}"
                    )),
                );
                for (name, refspec) in [
                    ("push-branches", "refs/heads/*:refs/heads/*"),
                    ("push-tags", "refs/tags/*:refs/tags/*"),
                ] {
                    let push = run_command(
                        self.runner.as_ref(),
                        &["git", "push", &url, refspec, "--force"],
                        Some(&self.repo_path),
                        &[],
                    )
                    .await;
                    let outcome = match push {
                        Ok(_) => StageOutcome::Completed,
                        Err(e) => StageOutcome::Warned(format!("some refs failed to push: {e}")),
                    };
                    StageReport::record(&mut reports, name, outcome);
                }
            }
        }
        reports
    }

    /// Detect the checked-out branch, defaulting to [`FALLBACK_BRANCH`].
    async fn current_branch(&self) -> Result<String, LfsMoverError> {
        let output = run_command(
            self.runner.as_ref(),
            &["git", "branch", "--show-current"],
            Some(&self.repo_path),
            &[],
        )
        .await?;
        let branch = output.stdout.trim();
        if branch.is_empty() {
            Ok(FALLBACK_BRANCH.to_string())
        } else {
            Ok(branch.to_string())
        }
    }

    /// Credential-injected target URL.
    fn target_url_with_creds(&self) -> Result<String, LfsMoverError> {
        inject_credentials(
            &self.target_url,
            self.target_creds.username.as_deref(),
            self.target_creds.token.as_deref(),
        )
    }

    /// Delete the working directory, or surface its path when retained.
    fn cleanup(&self) {
        if self.keep_workdir {
            info!("Working directory retained at {}", self.workdir.display());
            return;
        }
        if self.workdir.exists() {
            match remove_dir_all(&self.workdir) {
                Ok(()) => info!("Cleaned up working directory {}", self.workdir.display()),
                Err(e) => warn!(
                    "Could not remove working directory {}: {e}",
                    self.workdir.display()
                ),
            }
        }
    }
}

/// Outcome of a sequential batch of transfer jobs.
#[derive(Debug, Default, Clone)]
pub struct BatchSummary {
    /// Number of jobs that completed.
    pub succeeded: usize,

    /// Source labels of the jobs that failed.
    pub failed: Vec<String>,
}

impl BatchSummary {
    /// Whether every job in the batch succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Run transfer jobs sequentially; one job's failure never stops the rest.
pub async fn run_batch(jobs: Vec<TransferJob>) -> BatchSummary {
    let mut summary = BatchSummary::default();
    let total = jobs.len();
    for (idx, job) in jobs.iter().enumerate() {
        info!("Job {}/{}: {}", idx + 1, total, redact_credentials(job.source_label()));
        match job.run().await {
            Ok(_) => summary.succeeded += 1,
            Err(e) => {
                warn!("Job failed for {}: {e}", redact_credentials(job.source_label()));
                summary.failed.push(job.source_label().to_string());
            }
        }
    }
    info!(
        "Batch finished: {} succeeded, {} failed",
        summary.succeeded,
        summary.failed.len()
    );
    summary
}

/// Verify that git-lfs is installed before attempting a local transfer.
///
/// # Errors
/// Error of kind `Configuration` with an install hint when git-lfs is
/// missing from `PATH`.
pub async fn ensure_git_lfs(runner: &dyn CommandRunner) -> Result<(), LfsMoverError> {
    match run_command(runner, &["git", "lfs", "version"], None, &[]).await {
        Ok(_) => Ok(()),
        Err(e) => Err(LfsMoverError::new(LfsMoverErrorKind::Configuration)
            .with_text("git-lfs is not installed or not in PATH (install it and run 'git lfs install')")
            .with_source(e)),
    }
}
