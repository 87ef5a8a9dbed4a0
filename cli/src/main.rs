//! chaingate CLI — inspect upstream bodies and call vendors from the terminal.
//!
//! Usage:
//! ```bash
//! # Normalize a raw upstream body (use `-` to read stdin)
//! chaingate decode '{"code":-32000,"message":"rate limited"}'
//!
//! # Print the cache fingerprint of a request
//! chaingate hash --method eth_getBalance --params '["0xABC","latest"]'
//!
//! # List chains served through dRPC
//! chaingate chains
//!
//! # Send one request through an upstream
//! chaingate call --upstream drpc://$DRPC_KEY --network evm:1 --method eth_blockNumber
//! ```

mod logging;

use std::env;
use std::io::Read;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use serde_json::Value;

use chaingate_core::{
    translate_to_json_rpc_exception, JsonRpcRequest, Network, NormalizedRequest, NormalizedResponse,
    RequestContext, RpcParam, RpcTransport, UpstreamConfig,
};
use chaingate_providers::drpc::registry;

use crate::logging::{init_tracing, LogConfig};

#[tokio::main]
async fn main() {
    init_tracing(&LogConfig::from_env());

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "decode" => cmd_decode(&args[2..]),
        "hash" => cmd_hash(&args[2..]),
        "call" => cmd_call(&args[2..]).await,
        "chains" => {
            cmd_chains();
            Ok(())
        }
        "version" | "--version" | "-V" => {
            println!("chaingate {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("chaingate {}", env!("CARGO_PKG_VERSION"));
    println!("Normalize JSON-RPC upstream traffic and call vendor gateways\n");
    println!("USAGE:");
    println!("    chaingate <COMMAND>\n");
    println!("COMMANDS:");
    println!("    decode     Normalize a raw upstream response body");
    println!("    hash       Print the cache fingerprint of a request");
    println!("    chains     List chains served through dRPC");
    println!("    call       Send one JSON-RPC request through an upstream");
    println!("    version    Print version");
    println!("    help       Print this help\n");
    println!("DECODE:");
    println!("    chaingate decode <BODY | ->\n");
    println!("HASH FLAGS:");
    println!("    --method <NAME>     JSON-RPC method        [required]");
    println!("    --params <JSON>     JSON array of params   [default: []]\n");
    println!("CALL FLAGS:");
    println!("    --upstream <URL>    https://... or drpc://<api-key>  [required]");
    println!("    --network <ID>      e.g. evm:1                       [required]");
    println!("    --method <NAME>     JSON-RPC method                  [required]");
    println!("    --params <JSON>     JSON array of params             [default: []]");
    println!("    --timeout-ms <MS>   request deadline                 [default: 30000]\n");
    println!("ENVIRONMENT:");
    println!("    CHAINGATE_LOG       log level or filter directive  [default: warn]");
    println!("    CHAINGATE_LOG_JSON  emit JSON logs when set to 1");
}

fn cmd_decode(args: &[String]) -> anyhow::Result<()> {
    let body = match args.first().map(String::as_str) {
        None => bail!("a response body (or `-` for stdin) is required"),
        Some("-") => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
        Some(body) => body.as_bytes().to_vec(),
    };

    let resp = NormalizedResponse::decode(&body);
    println!("{}", serde_json::to_string_pretty(&resp)?);
    Ok(())
}

fn cmd_hash(args: &[String]) -> anyhow::Result<()> {
    let method = parse_flag(args, "--method").ok_or_else(|| anyhow!("--method is required"))?;
    let params = parse_params(args)?;

    let req = NormalizedRequest::new(JsonRpcRequest::new(1, method, params));
    let hash = req.cache_hash().context("request is not cacheable")?;
    println!("{hash}");
    Ok(())
}

fn cmd_chains() {
    println!("Chains served through dRPC ({}):\n", registry::len());
    for &(chain_id, slug) in registry::NETWORKS {
        println!("  evm:{chain_id:<14} {slug}");
    }
}

async fn cmd_call(args: &[String]) -> anyhow::Result<()> {
    let endpoint =
        parse_flag(args, "--upstream").ok_or_else(|| anyhow!("--upstream is required"))?;
    let network = parse_flag(args, "--network").ok_or_else(|| anyhow!("--network is required"))?;
    let method = parse_flag(args, "--method").ok_or_else(|| anyhow!("--method is required"))?;
    let params = parse_params(args)?;
    let timeout_ms = match parse_flag(args, "--timeout-ms") {
        Some(ms) => ms.parse::<u64>().context("--timeout-ms must be an integer")?,
        None => 30_000,
    };

    let network = Network::parse(&network)?;
    let upstream = Arc::new(UpstreamConfig {
        request_timeout_ms: timeout_ms,
        ..UpstreamConfig::new("cli", endpoint)
    });
    let client = chaingate_providers::create_client(upstream)?;
    if !client.supports_network(network.id()) {
        bail!("upstream does not serve network {network}");
    }

    let req = NormalizedRequest::new(JsonRpcRequest::new(1, method, params))
        .with_network(Arc::new(network));
    let (ctx, cancel) = RequestContext::background()
        .with_timeout(Duration::from_millis(timeout_ms))
        .with_cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    tracing::info!(request = %req.log_projection(), url = client.url(), "sending request");
    let resp = match client.send_request(&ctx, &req).await {
        Ok(resp) => resp,
        Err(e) => {
            let exception = translate_to_json_rpc_exception(&e);
            tracing::warn!(error = %e, code = exception.code, "request failed");
            NormalizedResponse::from_exception(req.id().clone(), &exception)
        }
    };

    println!("{}", serde_json::to_string_pretty(&resp)?);
    Ok(())
}

fn parse_params(args: &[String]) -> anyhow::Result<Vec<RpcParam>> {
    match parse_flag(args, "--params") {
        Some(raw) => serde_json::from_str::<Vec<Value>>(&raw)
            .with_context(|| format!("--params must be a JSON array, got {raw}")),
        None => Ok(Vec::new()),
    }
}

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}
