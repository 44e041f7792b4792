//! CI environment detection.
//!
//! Pure inspection of a process-environment snapshot: recognizes known CI
//! systems and, for pull-request-triggered builds, extracts the PR identity
//! used by the execution gate. Running outside CI, or in CI without a PR
//! event, is a normal case and yields no pull request. No network I/O.

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Recognized CI systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CiKind {
    GithubActions,
    CircleCi,
    Travis,
}

impl fmt::Display for CiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GithubActions => "GitHub Actions",
            Self::CircleCi => "CircleCI",
            Self::Travis => "Travis CI",
        };
        f.write_str(name)
    }
}

/// Identity of the pull request that triggered a CI build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// Owning organization or user
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// PR number
    pub num: u32,
    /// Commit that triggered the build
    pub commit: String,
}

/// Result of CI detection: which system (if any), the pull request (if the
/// build was PR-triggered), and raw metadata tags for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct CiInfo {
    pub kind: Option<CiKind>,
    pub pull_request: Option<PullRequest>,
    pub tags: BTreeMap<String, String>,
}

/// Detect CI context from an environment snapshot.
///
/// Repeatable: the same snapshot always produces the same result.
pub fn detect(env: &BTreeMap<String, String>) -> CiInfo {
    if is_set(env, "GITHUB_ACTIONS") {
        return detect_github_actions(env);
    }
    if is_set(env, "CIRCLECI") {
        return detect_circleci(env);
    }
    if is_set(env, "TRAVIS") {
        return detect_travis(env);
    }
    CiInfo::default()
}

/// Detect CI context from the current process environment.
pub fn detect_current() -> CiInfo {
    let env: BTreeMap<String, String> = std::env::vars().collect();
    detect(&env)
}

fn is_set(env: &BTreeMap<String, String>, var: &str) -> bool {
    env.get(var).is_some_and(|v| v == "true" || v == "1")
}

fn get<'a>(env: &'a BTreeMap<String, String>, var: &str) -> Option<&'a str> {
    env.get(var).map(String::as_str).filter(|v| !v.is_empty())
}

fn detect_github_actions(env: &BTreeMap<String, String>) -> CiInfo {
    let mut info = CiInfo {
        kind: Some(CiKind::GithubActions),
        ..CiInfo::default()
    };
    tag(&mut info, "ci", "github-actions");
    copy_tag(env, &mut info, "GITHUB_RUN_ID", "github_run_id");
    copy_tag(env, &mut info, "GITHUB_HEAD_REF", "branch");

    let event = get(env, "GITHUB_EVENT_NAME").unwrap_or_default();
    if event != "pull_request" && event != "pull_request_target" {
        return info;
    }

    // GITHUB_REF is "refs/pull/<num>/merge" for PR events.
    static PR_REF: OnceLock<Regex> = OnceLock::new();
    let re = PR_REF.get_or_init(|| Regex::new(r"^refs/pull/(\d+)/").unwrap());

    let num = get(env, "GITHUB_REF")
        .and_then(|r| re.captures(r))
        .and_then(|c| c[1].parse::<u32>().ok());
    let repo = get(env, "GITHUB_REPOSITORY").and_then(split_slug);

    if let (Some(num), Some((owner, repo))) = (num, repo) {
        info.pull_request = Some(PullRequest {
            owner,
            repo,
            num,
            commit: get(env, "GITHUB_SHA").unwrap_or_default().to_string(),
        });
    }
    info
}

fn detect_circleci(env: &BTreeMap<String, String>) -> CiInfo {
    let mut info = CiInfo {
        kind: Some(CiKind::CircleCi),
        ..CiInfo::default()
    };
    tag(&mut info, "ci", "circleci");
    copy_tag(env, &mut info, "CIRCLE_BRANCH", "branch");
    copy_tag(env, &mut info, "CIRCLE_BUILD_URL", "circle_build_url");

    // CIRCLE_PULL_REQUEST is the PR URL, e.g.
    // https://github.com/owner/repo/pull/123
    static PR_URL: OnceLock<Regex> = OnceLock::new();
    let re = PR_URL
        .get_or_init(|| Regex::new(r"github\.com/([^/]+)/([^/]+)/pull/(\d+)$").unwrap());

    if let Some(caps) = get(env, "CIRCLE_PULL_REQUEST").and_then(|url| re.captures(url)) {
        if let Ok(num) = caps[3].parse::<u32>() {
            info.pull_request = Some(PullRequest {
                owner: caps[1].to_string(),
                repo: caps[2].to_string(),
                num,
                commit: get(env, "CIRCLE_SHA1").unwrap_or_default().to_string(),
            });
        }
    }
    info
}

fn detect_travis(env: &BTreeMap<String, String>) -> CiInfo {
    let mut info = CiInfo {
        kind: Some(CiKind::Travis),
        ..CiInfo::default()
    };
    tag(&mut info, "ci", "travis");
    copy_tag(env, &mut info, "TRAVIS_BRANCH", "branch");

    // TRAVIS_PULL_REQUEST is "false" for non-PR builds.
    let num = get(env, "TRAVIS_PULL_REQUEST")
        .filter(|v| *v != "false")
        .and_then(|v| v.parse::<u32>().ok());
    let repo = get(env, "TRAVIS_REPO_SLUG").and_then(split_slug);

    if let (Some(num), Some((owner, repo))) = (num, repo) {
        info.pull_request = Some(PullRequest {
            owner,
            repo,
            num,
            commit: get(env, "TRAVIS_PULL_REQUEST_SHA")
                .unwrap_or_default()
                .to_string(),
        });
    }
    info
}

/// Split "owner/repo" into its two halves.
fn split_slug(slug: &str) -> Option<(String, String)> {
    let (owner, repo) = slug.split_once('/')?;
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

fn tag(info: &mut CiInfo, key: &str, value: &str) {
    info.tags.insert(key.to_string(), value.to_string());
}

fn copy_tag(env: &BTreeMap<String, String>, info: &mut CiInfo, var: &str, key: &str) {
    if let Some(v) = get(env, var) {
        tag(info, key, v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_no_ci_detected() {
        let info = detect(&env(&[("PATH", "/usr/bin"), ("HOME", "/home/u")]));
        assert_eq!(info.kind, None);
        assert_eq!(info.pull_request, None);
        assert!(info.tags.is_empty());
    }

    #[test]
    fn test_github_actions_pull_request() {
        let info = detect(&env(&[
            ("GITHUB_ACTIONS", "true"),
            ("GITHUB_EVENT_NAME", "pull_request"),
            ("GITHUB_REPOSITORY", "acme/widget"),
            ("GITHUB_REF", "refs/pull/42/merge"),
            ("GITHUB_SHA", "deadbeef"),
            ("GITHUB_HEAD_REF", "feature/x"),
        ]));
        assert_eq!(info.kind, Some(CiKind::GithubActions));
        let pr = info.pull_request.expect("pull request");
        assert_eq!(pr.owner, "acme");
        assert_eq!(pr.repo, "widget");
        assert_eq!(pr.num, 42);
        assert_eq!(pr.commit, "deadbeef");
        assert_eq!(info.tags.get("branch").map(String::as_str), Some("feature/x"));
    }

    #[test]
    fn test_github_actions_push_event_has_no_pr() {
        let info = detect(&env(&[
            ("GITHUB_ACTIONS", "true"),
            ("GITHUB_EVENT_NAME", "push"),
            ("GITHUB_REPOSITORY", "acme/widget"),
            ("GITHUB_REF", "refs/heads/main"),
        ]));
        assert_eq!(info.kind, Some(CiKind::GithubActions));
        assert_eq!(info.pull_request, None);
    }

    #[test]
    fn test_circleci_pull_request_url() {
        let info = detect(&env(&[
            ("CIRCLECI", "true"),
            (
                "CIRCLE_PULL_REQUEST",
                "https://github.com/acme/widget/pull/7",
            ),
            ("CIRCLE_SHA1", "cafe01"),
            ("CIRCLE_BRANCH", "fix/y"),
        ]));
        assert_eq!(info.kind, Some(CiKind::CircleCi));
        let pr = info.pull_request.expect("pull request");
        assert_eq!((pr.owner.as_str(), pr.repo.as_str(), pr.num), ("acme", "widget", 7));
        assert_eq!(pr.commit, "cafe01");
    }

    #[test]
    fn test_circleci_without_pr_variable() {
        let info = detect(&env(&[("CIRCLECI", "true"), ("CIRCLE_BRANCH", "main")]));
        assert_eq!(info.kind, Some(CiKind::CircleCi));
        assert_eq!(info.pull_request, None);
    }

    #[test]
    fn test_travis_pull_request() {
        let info = detect(&env(&[
            ("TRAVIS", "true"),
            ("TRAVIS_REPO_SLUG", "acme/widget"),
            ("TRAVIS_PULL_REQUEST", "99"),
            ("TRAVIS_PULL_REQUEST_SHA", "beef99"),
        ]));
        let pr = info.pull_request.expect("pull request");
        assert_eq!(pr.num, 99);
        assert_eq!(pr.owner, "acme");
    }

    #[test]
    fn test_travis_non_pr_build() {
        let info = detect(&env(&[
            ("TRAVIS", "true"),
            ("TRAVIS_REPO_SLUG", "acme/widget"),
            ("TRAVIS_PULL_REQUEST", "false"),
        ]));
        assert_eq!(info.kind, Some(CiKind::Travis));
        assert_eq!(info.pull_request, None);
    }

    #[test]
    fn test_detection_is_repeatable() {
        let snapshot = env(&[
            ("GITHUB_ACTIONS", "true"),
            ("GITHUB_EVENT_NAME", "pull_request"),
            ("GITHUB_REPOSITORY", "acme/widget"),
            ("GITHUB_REF", "refs/pull/5/merge"),
        ]);
        let a = detect(&snapshot);
        let b = detect(&snapshot);
        assert_eq!(a.pull_request, b.pull_request);
        assert_eq!(a.tags, b.tags);
    }

    #[test]
    fn test_malformed_slug_rejected() {
        assert_eq!(split_slug("no-slash"), None);
        assert_eq!(split_slug("/repo"), None);
        assert_eq!(split_slug("owner/"), None);
    }
}
