//! # lfs-mover
//!
//! Transfer Git LFS repositories to a new hosting platform
//!
//! ## Usage
//!
//! ```txt
//! Usage: lfs-mover [OPTIONS] --source <SOURCE> --target <TARGET>
//!
//! Options:
//!   -s, --source <SOURCE>      Source repository URL (repeat for a batch)
//!   -t, --target <TARGET>      Target repository URL (repeat for a batch)
//!       --temp-dir <TEMP_DIR>  Working directory for cloning
//!       --no-cleanup           Keep working directories after the transfer
//!       --mirror               Mirror mode: clone and push ALL refs
//!       --accelerate           Accelerate eligible source downloads
//!       --use-remote-mirror    Configure server-side pull-mirroring instead
//!       --env-file <ENV_FILE>  Path to a .env file [default: .env]
//!   -h, --help                 Print help
//! ```

#![warn(clippy::all, rust_2018_idioms)]
#![deny(
    missing_docs,
    clippy::all,
    clippy::missing_docs_in_private_items,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![warn(clippy::multiple_crate_versions)]

pub(crate) mod cli;
pub(crate) mod config;
pub(crate) mod errors;
pub(crate) mod runner;
pub(crate) mod transfer;
pub(crate) mod urls;

mod mirror;

pub use cli::{lfs_mover_main, LfsMoverCli};
pub use config::{Config, EndpointCredentials, MirrorSettings};
pub use errors::{LfsMoverError, LfsMoverErrorKind};
pub use mirror::{MirrorManager, MirrorPlatform};
pub use runner::{CommandOutput, CommandRunner, ProcessRunner};
pub use transfer::{
    run_batch, BatchSummary, JobSpec, StageOutcome, StageReport, TransferJob, TransferMode,
};
pub use urls::{accelerate_url, ensure_git_suffix, inject_credentials, strip_credentials};
