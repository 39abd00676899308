//! Request simulation

use crate::args::SimulateArgs;
use crate::console::CliConsole;
use crate::context::AppContext;
use colored::*;
use zeropass_core::{Decision, SimulationRequest, parse_header_payload};

pub async fn run(ctx: &AppContext, console: &CliConsole, args: SimulateArgs) -> anyhow::Result<()> {
    let request = build_request(args);
    let result = ctx.gateway.simulate(&request).await?;

    if console.is_json() {
        return console.emit(&result);
    }

    let decision = match result.decision {
        Decision::Allowed => "ALLOWED".green().bold(),
        Decision::Blocked => "BLOCKED".red().bold(),
    };
    console.header(&format!("{} {} from {}", request.method, request.path, request.client_ip));
    console.field("Decision", decision);
    if let Some(rule) = &result.matched_rule {
        console.field("Matched", rule);
    }
    console.field("Reason", &result.reason);
    for detail in &result.evaluation_details {
        println!("    {} {}", "·".dimmed(), detail);
    }
    Ok(())
}

fn build_request(args: SimulateArgs) -> SimulationRequest {
    let mut request = SimulationRequest::new(
        args.rule_set,
        args.ip,
        args.method.to_uppercase(),
        args.path,
    );
    if let Some(raw) = args.headers_json.as_deref() {
        request.headers = parse_header_payload(raw);
    }
    request.jwt_token = args.jwt;
    request.oauth_scopes = args.scope;
    request
}
