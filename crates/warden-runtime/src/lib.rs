//! Side-effecting engine: paginated retrieval against the tracker's
//! REST API, the dry-run-aware action executor, and the three batch
//! runs (`approve`, `autolabel`, `prcheck`).
//!
//! One run is single-threaded, synchronous, blocking I/O throughout;
//! requests are never pipelined and each page fetch completes before
//! the next is issued.

pub mod api_client;
pub mod approve_run;
pub mod autolabel_run;
pub mod executor;
pub mod prcheck_run;
pub mod retrieval;
pub mod summary;


pub use api_client::{ApiError, GithubApiClient};
pub use approve_run::run_approve;
pub use autolabel_run::run_autolabel;
pub use executor::ActionExecutor;
pub use prcheck_run::run_prcheck;
pub use retrieval::{fetch_comments, fetch_entries, fetch_issues, fetch_pulls};
pub use summary::RunSummary;
