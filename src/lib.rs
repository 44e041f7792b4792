//! Akita CLI - backend client with CI-aware command gating.
//!
//! Commands that talk to the Akita backend are wrapped by an execution gate:
//! when the CLI runs inside a CI build triggered by a GitHub pull request,
//! the gate asks the backend whether the PR's author is a member of the
//! Akita users team and silently skips the command if not. Outside CI, or
//! in non-PR builds, commands run unchanged.
//!
//! # Example
//!
//! ```
//! use akita_cli::cfg::Credentials;
//! use akita_cli::domain;
//!
//! // No credentials: the fixed Akita default.
//! assert_eq!(domain::resolve("", &Credentials::default()), "akita.software");
//!
//! // An explicit override always wins, verbatim.
//! assert_eq!(
//!     domain::resolve("custom.example.com", &Credentials::default()),
//!     "custom.example.com"
//! );
//!
//! // Legacy domain spellings get their canonical API host.
//! assert_eq!(domain::domain_to_host("akita.software"), "api.akita.software");
//! ```

pub mod cfg;
pub mod ci;
pub mod client;
pub mod commands;
pub mod domain;
pub mod error;
pub mod guard;
pub mod printer;

pub use ci::{CiInfo, CiKind, PullRequest};
pub use error::{ApiError, ApiResult};
pub use guard::{CommandContext, EnablementCheck, Verdict, guard};
