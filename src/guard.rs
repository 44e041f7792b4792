//! CI execution gate.
//!
//! Commands wrapped by [`guard`] are skipped, without error, when the CLI
//! runs inside a CI build triggered by a GitHub pull request whose author
//! is not a member of the Akita users team. Invocations with no detected
//! pull request always proceed unchecked; the enablement check is never
//! consulted for them. An unconfirmable check (timeout, transport failure)
//! surfaces as a command failure rather than defaulting to either outcome.

use crate::cfg::Config;
use crate::ci::{self, PullRequest};
use crate::client::FrontClient;
use crate::printer;
use anyhow::{Context as _, Result};
use std::collections::BTreeMap;
use std::time::Duration;

/// GitHub team whose members may run gated commands from a PR.
pub const GITHUB_USERS_TEAM_SLUG: &str = "akita-users";

/// Deadline for the enablement query.
const ENABLEMENT_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-invocation context threaded through every command handler.
///
/// `domain` is resolved exactly once at startup and read-only afterwards;
/// `env` is a snapshot of the process environment taken at the same time,
/// so detection is repeatable within one invocation.
pub struct CommandContext {
    pub config: Config,
    pub domain: String,
    pub client_id: String,
    pub env: BTreeMap<String, String>,
}

/// Decides whether a PR-triggered invocation may proceed.
pub trait EnablementCheck {
    fn check(&self, ctx: &CommandContext, pr: &PullRequest) -> Result<bool>;
}

/// Production check: one bounded-timeout query against the resolved
/// backend.
pub struct BackendCheck;

impl EnablementCheck for BackendCheck {
    fn check(&self, ctx: &CommandContext, pr: &PullRequest) -> Result<bool> {
        // Test-only bypass, so automated tests stay hermetic.
        if ctx.config.test_only_disable_github_teams_check {
            return Ok(true);
        }

        let client = FrontClient::new(
            &ctx.domain,
            &ctx.client_id,
            ctx.config.credentials.clone(),
            ENABLEMENT_CHECK_TIMEOUT,
        )
        .context("failed to determine whether GitHub PR is Akita-enabled")?;

        client
            .get_github_pr_enabled_state(pr, GITHUB_USERS_TEAM_SLUG)
            .context("failed to determine whether GitHub PR is Akita-enabled")
    }
}

/// Gate decision for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Run the wrapped handler.
    Proceed,
    /// Silently no-op; the PR is not enabled.
    Skip(PullRequest),
}

/// Consult CI detection and, only when a pull request is present, the
/// enablement check.
pub fn decide<C: EnablementCheck>(ctx: &CommandContext, checker: &C) -> Result<Verdict> {
    let info = ci::detect(&ctx.env);
    let Some(pr) = info.pull_request else {
        return Ok(Verdict::Proceed);
    };

    if checker.check(ctx, &pr)? {
        Ok(Verdict::Proceed)
    } else {
        Ok(Verdict::Skip(pr))
    }
}

/// The one warning emitted when a command is skipped.
pub fn skip_message(pr: &PullRequest) -> String {
    format!(
        "PR {}/{}#{} is not enabled: author is not a member of {}/{}. Exiting without action.",
        pr.owner, pr.repo, pr.num, pr.owner, GITHUB_USERS_TEAM_SLUG
    )
}

/// Wrap a command handler with the CI gate.
///
/// Returns a new handler value; the original is captured, never mutated.
/// A skipped command returns success so CI pipelines invoking it on
/// non-member PRs do not show spurious failures.
pub fn guard<C, H>(checker: C, handler: H) -> impl Fn(&CommandContext, &[String]) -> Result<()>
where
    C: EnablementCheck,
    H: Fn(&CommandContext, &[String]) -> Result<()>,
{
    move |ctx, args| match decide(ctx, &checker)? {
        Verdict::Proceed => handler(ctx, args),
        Verdict::Skip(pr) => {
            printer::warning(&skip_message(&pr));
            Ok(())
        }
    }
}
