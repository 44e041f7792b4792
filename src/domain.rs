//! Backend domain resolution.
//!
//! A "domain" is the logical backend identifier; it is distinct from the
//! host actually contacted. Resolution priority is strict: an explicit
//! `--domain` override wins, then the Postman environment associated with a
//! stored Postman API key, then the fixed Akita default. The resolved value
//! is computed once in `main` and carried in [`CommandContext`], so there is
//! no mutable global to race on.
//!
//! [`CommandContext`]: crate::guard::CommandContext

use crate::cfg::Credentials;
use crate::printer;

/// Default backend when no Postman credentials are configured.
pub const DEFAULT_DOMAIN: &str = "akita.software";

/// Postman backend tiers, keyed by the `POSTMAN_ENV` tag.
///
/// A closed enumeration: adding a tier means adding a variant and a table
/// row, not another string branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostmanEnv {
    Production,
    Stage,
    Preview,
    Beta,
    Dev,
}

impl PostmanEnv {
    /// Parse an environment tag, case-insensitively. An empty tag means the
    /// user did not choose one and maps to production.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.to_uppercase().as_str() {
            "" | "PRODUCTION" => Some(Self::Production),
            "STAGE" => Some(Self::Stage),
            "PREVIEW" => Some(Self::Preview),
            "BETA" => Some(Self::Beta),
            "DEV" => Some(Self::Dev),
            _ => None,
        }
    }

    /// Backend domain for this tier.
    pub fn domain(self) -> &'static str {
        match self {
            Self::Production => "api.observability.postman.com",
            Self::Stage => "api.observability.postman-stage.com",
            Self::Preview => "api.observability.postman-preview.com",
            Self::Beta => "api.observability.postman-beta.com",
            Self::Dev => "localhost:50443",
        }
    }
}

/// Resolve the backend domain from the `--domain` override and the stored
/// credential state.
///
/// A non-empty override is returned verbatim: no validation, no rewriting.
pub fn resolve(explicit_override: &str, credentials: &Credentials) -> String {
    if !explicit_override.is_empty() {
        return explicit_override.to_string();
    }
    default_domain(credentials)
}

/// Default domain given the stored credentials.
pub fn default_domain(credentials: &Credentials) -> String {
    if credentials.postman_api_key.is_none() {
        printer::debug("No Postman API key, using Akita backend.");
        return DEFAULT_DOMAIN.to_string();
    }

    let tag = credentials.postman_env.as_deref().unwrap_or("");
    match PostmanEnv::parse(tag) {
        Some(env) => {
            if env == PostmanEnv::Dev {
                printer::debug("Selecting localhost backend for DEV environment.");
            }
            env.domain().to_string()
        }
        None => {
            // Unrecognized input is never fatal at this layer.
            printer::warning(&format!(
                "Unknown Postman environment {tag:?}, using production."
            ));
            PostmanEnv::Production.domain().to_string()
        }
    }
}

/// Convert a domain to the specific host to contact.
///
/// The two legacy Akita spellings were used both as display names and as
/// connectable hosts and need an `api` prefix; everything else is assumed to
/// already be a usable host and passes through unchanged.
pub fn domain_to_host(domain: &str) -> String {
    match domain {
        "akita.software" => "api.akita.software".to_string(),
        "staging.akita.software" => "api.staging.akita.software".to_string(),
        _ => domain.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postman_creds(env: Option<&str>) -> Credentials {
        Credentials {
            postman_api_key: Some("PMAK-test".to_string()),
            postman_env: env.map(String::from),
            ..Credentials::default()
        }
    }

    #[test]
    fn test_override_wins_regardless_of_credentials() {
        let creds = postman_creds(Some("DEV"));
        assert_eq!(resolve("custom.example.com", &creds), "custom.example.com");
        assert_eq!(
            resolve("custom.example.com", &Credentials::default()),
            "custom.example.com"
        );
    }

    #[test]
    fn test_no_credentials_uses_akita_default() {
        assert_eq!(resolve("", &Credentials::default()), "akita.software");
    }

    #[test]
    fn test_postman_env_dispatch() {
        assert_eq!(
            resolve("", &postman_creds(None)),
            "api.observability.postman.com"
        );
        assert_eq!(resolve("", &postman_creds(Some("DEV"))), "localhost:50443");
        assert_eq!(
            resolve("", &postman_creds(Some("beta"))),
            "api.observability.postman-beta.com"
        );
        assert_eq!(
            resolve("", &postman_creds(Some("Stage"))),
            "api.observability.postman-stage.com"
        );
        assert_eq!(
            resolve("", &postman_creds(Some("preview"))),
            "api.observability.postman-preview.com"
        );
    }

    #[test]
    fn test_unknown_env_falls_back_to_production() {
        assert_eq!(
            resolve("", &postman_creds(Some("bogus"))),
            "api.observability.postman.com"
        );
    }

    #[test]
    fn test_domain_to_host_legacy_spellings() {
        assert_eq!(domain_to_host("akita.software"), "api.akita.software");
        assert_eq!(
            domain_to_host("staging.akita.software"),
            "api.staging.akita.software"
        );
        assert_eq!(domain_to_host("localhost:50443"), "localhost:50443");
        assert_eq!(domain_to_host("custom.example.com"), "custom.example.com");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn domain_to_host_is_idempotent(domain in "[a-z0-9.:\\-]{0,40}") {
                let once = domain_to_host(&domain);
                prop_assert_eq!(domain_to_host(&once), once);
            }

            #[test]
            fn resolve_is_deterministic(
                override_ in "[a-z0-9.\\-]{0,20}",
                env in prop::option::of("[A-Za-z]{0,10}"),
                has_key in any::<bool>(),
            ) {
                let creds = Credentials {
                    postman_api_key: has_key.then(|| "PMAK-x".to_string()),
                    postman_env: env.clone(),
                    ..Credentials::default()
                };
                prop_assert_eq!(resolve(&override_, &creds), resolve(&override_, &creds));
            }

            #[test]
            fn nonempty_override_returned_verbatim(override_ in "[a-z0-9.\\-]{1,20}") {
                prop_assert_eq!(resolve(&override_, &Credentials::default()), override_);
            }
        }
    }
}
