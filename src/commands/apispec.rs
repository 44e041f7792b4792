//! `akita apispec`: submit a spec-generation request from collected traces.

use crate::client::{CreateSpecRequest, FrontClient};
use crate::commands::parse_tag_pairs;
use crate::guard::CommandContext;
use crate::printer;
use anyhow::{Context as _, Result, bail};
use clap::Args;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Args)]
pub struct ApispecArgs {
    /// Trace locations to assemble the spec from
    #[arg(long = "traces", value_name = "URI")]
    pub traces: Vec<String>,

    /// Select traces by key=value tag
    #[arg(long = "trace-tag", value_name = "KEY=VALUE")]
    pub trace_tags: Vec<String>,

    /// Service the traces belong to (required with --trace-tag unless
    /// --out names one)
    #[arg(long)]
    pub service: Option<String>,

    /// Destination URI for the generated spec, e.g. akita://widget:spec;
    /// its service name may stand in for --service
    #[arg(long, value_name = "URI")]
    pub out: Option<String>,

    /// key=value tags to attach to the generated spec
    #[arg(long = "tags", value_name = "KEY=VALUE")]
    pub tags: Vec<String>,
}

pub fn run(ctx: &CommandContext, args: &ApispecArgs) -> Result<()> {
    let request = build_request(args)?;

    let client = FrontClient::new(
        &ctx.domain,
        &ctx.client_id,
        ctx.config.credentials.clone(),
        REQUEST_TIMEOUT,
    )?;
    let resp = client
        .create_spec(&request)
        .context("failed to create spec")?;

    printer::info(&format!("Created spec {}", resp.id));
    Ok(())
}

/// Validate the flag combination and marshal it into a request.
fn build_request(args: &ApispecArgs) -> Result<CreateSpecRequest> {
    let trace_tags = parse_tag_pairs(&args.trace_tags)?;
    let tags = parse_tag_pairs(&args.tags)?;

    if args.traces.is_empty() && trace_tags.is_empty() {
        bail!("Must specify at least one input via \"traces\" or \"trace-tag\"");
    }

    let service = match &args.service {
        Some(s) => s.clone(),
        None => match args.out.as_deref().and_then(service_from_uri) {
            Some(s) => s,
            None if !trace_tags.is_empty() => {
                bail!("Must specify \"service\" or \"out\" to use \"trace-tag\"");
            }
            None => String::new(),
        },
    };

    Ok(CreateSpecRequest {
        service,
        traces: args.traces.clone(),
        trace_tags,
        tags,
    })
}

/// Service name from an `akita://` URI, e.g. `akita://widget:spec:latest`.
fn service_from_uri(uri: &str) -> Option<String> {
    let rest = uri.strip_prefix("akita://")?;
    let service = rest.split(':').next().unwrap_or("");
    (!service.is_empty()).then(|| service.to_string())
}
