//! Command-line client for the RawPaste API.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use rawpaste_core::{DEFAULT_CLI_SERVER_URL, DEFAULT_OWNER_HEADER};
use serde_json::Value;
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

const CLI_USER_AGENT: &str = concat!("rawpaste-cli/", env!("CARGO_PKG_VERSION"));
const PREVIEW_CHARS: usize = 40;

#[derive(Parser)]
#[command(name = "rawpaste-cli", about = "RawPaste CLI", version)]
struct Cli {
    /// Server URL (can also be set via RAWPASTE_SERVER env var)
    #[arg(short, long, env = "RAWPASTE_SERVER")]
    server: Option<String>,

    /// Owner id sent to the server (can also be set via RAWPASTE_OWNER env var)
    #[arg(short, long, env = "RAWPASTE_OWNER")]
    owner: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Print timing for API requests
    #[arg(long, global = true)]
    timing: bool,

    /// Request timeout in seconds
    #[arg(short = 't', long, default_value = "30")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Publish a snippet from a file or stdin
    New {
        #[arg(short, long)]
        file: Option<String>,
        /// Refuse raw delivery of this snippet
        #[arg(short, long)]
        private: bool,
    },
    /// Fetch the raw body of a public snippet
    Get { identifier: String },
    /// List your snippets, newest first
    List,
    /// Delete one of your snippets
    Delete { identifier: String },
    /// Show how many snippets you hold
    Quota,
}

fn log_timing(timing: bool, label: &str, duration: Duration) {
    if timing {
        eprintln!(
            "[timing] {}: {:.1} ms",
            label,
            duration.as_secs_f64() * 1000.0
        );
    }
}

fn log_timing_parts(timing: bool, label: &str, request: Duration, parse: Option<Duration>) {
    if !timing {
        return;
    }
    if let Some(parse) = parse {
        let total = request + parse;
        eprintln!(
            "[timing] {}: request {:.1} ms, parse {:.1} ms, total {:.1} ms",
            label,
            request.as_secs_f64() * 1000.0,
            parse.as_secs_f64() * 1000.0,
            total.as_secs_f64() * 1000.0
        );
    } else {
        log_timing(timing, label, request);
    }
}

fn error_message_for_response(status: reqwest::StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return value
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or(body)
            .to_string();
    }

    // Raw delivery denials are plain text.
    body.trim().to_string()
}

async fn ensure_success_or_exit(res: reqwest::Response, action: &str) -> reqwest::Response {
    let status = res.status();
    if status.is_success() {
        return res;
    }

    let body = match res.text().await {
        Ok(body) => body,
        Err(err) => format!("failed to read error response body: {}", err),
    };
    let message = error_message_for_response(status, &body);
    eprintln!("{} failed ({}): {}", action, status, message);
    std::process::exit(1);
}

fn exit_with(action: &str, message: &str) -> ! {
    eprintln!("{} failed: {}", action, message);
    std::process::exit(1);
}

fn content_preview(content: &str) -> String {
    let first_line = content.lines().next().unwrap_or("").trim();
    let mut preview: String = first_line.chars().take(PREVIEW_CHARS).collect();
    if first_line.chars().count() > PREVIEW_CHARS || content.lines().nth(1).is_some() {
        preview.push_str("...");
    }
    preview
}

fn format_summary_output(snippets: &[Value], json: bool) -> Result<String, String> {
    if json {
        return serde_json::to_string_pretty(snippets)
            .map_err(|err| format!("response encoding error: {}", err));
    }

    let mut rows = Vec::with_capacity(snippets.len());
    for (index, snippet) in snippets.iter().enumerate() {
        let field = |name: &str| snippet.get(name).and_then(Value::as_str);
        let (Some(identifier), Some(visibility), Some(created_at), Some(content)) = (
            field("identifier"),
            field("visibility"),
            field("created_at"),
            field("content"),
        ) else {
            return Err(format!(
                "response item {} missing 'identifier', 'visibility', 'created_at' or 'content' field",
                index
            ));
        };
        rows.push(format!(
            "{:<20} {:<8} {:<32} {}",
            identifier,
            visibility,
            created_at,
            content_preview(content)
        ));
    }

    Ok(rows.join("\n"))
}

fn format_new_output(server: &str, response: &Value, json: bool) -> Result<String, String> {
    if json {
        return serde_json::to_string_pretty(response)
            .map_err(|err| format!("response encoding error: {}", err));
    }

    let identifier = response
        .get("identifier")
        .and_then(Value::as_str)
        .ok_or_else(|| "response missing 'identifier' field".to_string())?;
    let raw_path = response
        .get("raw_path")
        .and_then(Value::as_str)
        .ok_or_else(|| "response missing 'raw_path' field".to_string())?;
    Ok(format!("Created: {} ({}{})", identifier, server, raw_path))
}

fn format_get_output(identifier: &str, content: &str, json: bool) -> Result<String, String> {
    if json {
        let payload = serde_json::json!({ "identifier": identifier, "content": content });
        return serde_json::to_string_pretty(&payload)
            .map_err(|err| format!("response encoding error: {}", err));
    }

    Ok(content.to_string())
}

fn format_quota_output(quota: &Value, json: bool) -> Result<String, String> {
    if json {
        return serde_json::to_string_pretty(quota)
            .map_err(|err| format!("response encoding error: {}", err));
    }

    let number = |name: &str| quota.get(name).and_then(Value::as_u64);
    match (number("used"), number("limit"), number("remaining")) {
        (Some(used), Some(limit), Some(remaining)) => Ok(format!(
            "Snippets: {}/{} ({} remaining)",
            used, limit, remaining
        )),
        _ => Err("response missing 'used', 'limit' or 'remaining' field".to_string()),
    }
}

fn format_delete_output(identifier: &str, response: &Value, json: bool) -> Result<String, String> {
    if json {
        return serde_json::to_string_pretty(response)
            .map_err(|err| format!("response encoding error: {}", err));
    }

    Ok(format!("Deleted snippet: {}", identifier))
}

fn api_url(server: &str, segments: &[&str]) -> Result<reqwest::Url, String> {
    let mut url = reqwest::Url::parse(server)
        .map_err(|err| format!("Invalid server URL '{}': {}", server, err))?;
    let mut path = url
        .path_segments_mut()
        .map_err(|_| "Server URL cannot be used as an API base".to_string())?;
    path.pop_if_empty();
    for segment in segments {
        path.push(segment);
    }
    drop(path);
    Ok(url)
}

fn api_url_or_exit(server: &str, action: &str, segments: &[&str]) -> reqwest::Url {
    match api_url(server, segments) {
        Ok(url) => url,
        Err(message) => exit_with(action, &message),
    }
}

fn normalize_server(server: String) -> String {
    if let Ok(mut url) = reqwest::Url::parse(&server) {
        let should_normalize_localhost =
            url.scheme().eq_ignore_ascii_case("http") && url.host_str() == Some("localhost");
        if should_normalize_localhost && url.set_host(Some("127.0.0.1")).is_err() {
            return server;
        }
        let mut normalized = url.to_string();
        while normalized.ends_with('/') {
            normalized.pop();
        }
        return normalized;
    }
    server
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn resolve_server(server: Option<String>) -> String {
    non_blank(server).unwrap_or_else(|| DEFAULT_CLI_SERVER_URL.to_string())
}

fn require_owner_or_exit(owner: Option<&str>, action: &str) -> String {
    match owner {
        Some(owner) => owner.to_string(),
        None => exit_with(action, "an owner id is required (use --owner or RAWPASTE_OWNER)"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Cli {
        server,
        owner,
        json,
        timing,
        timeout,
        command,
    } = Cli::parse();

    if let Commands::Completions { shell } = &command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout))
        .user_agent(CLI_USER_AGENT)
        .build()?;
    let server = normalize_server(resolve_server(server));
    let owner = non_blank(owner);

    match command {
        Commands::Completions { .. } => unreachable!("completions handled before client setup"),
        Commands::New { file, private } => {
            let owner = require_owner_or_exit(owner.as_deref(), "New");
            let endpoint = api_url_or_exit(&server, "New", &["api", "snippet"]);
            let content = if let Some(path) = file {
                std::fs::read_to_string(path)?
            } else {
                let mut buffer = String::new();
                io::stdin().read_to_string(&mut buffer)?;
                buffer
            };
            let visibility = if private { "private" } else { "public" };
            let body = serde_json::json!({ "content": content, "visibility": visibility });

            let request_start = Instant::now();
            let res = client
                .post(endpoint)
                .header(DEFAULT_OWNER_HEADER, owner)
                .json(&body)
                .send()
                .await?;
            let request_elapsed = request_start.elapsed();
            let res = ensure_success_or_exit(res, "New").await;

            let parse_start = Instant::now();
            let response: Value = res.json().await?;
            let parse_elapsed = parse_start.elapsed();

            log_timing_parts(timing, "new", request_elapsed, Some(parse_elapsed));
            match format_new_output(&server, &response, json) {
                Ok(output) => println!("{}", output),
                Err(message) => exit_with("New", &message),
            }
        }
        Commands::Get { identifier } => {
            let endpoint = api_url_or_exit(&server, "Get", &["raw", identifier.as_str()]);
            let request_start = Instant::now();
            let res = client.get(endpoint).send().await?;
            let request_elapsed = request_start.elapsed();
            let res = ensure_success_or_exit(res, "Get").await;
            let content = res.text().await?;
            log_timing(timing, "get", request_elapsed);

            match format_get_output(&identifier, &content, json) {
                Ok(output) if json => println!("{}", output),
                // Raw bodies are written byte-for-byte.
                Ok(output) => io::stdout().write_all(output.as_bytes())?,
                Err(message) => exit_with("Get", &message),
            }
        }
        Commands::List => {
            let owner = require_owner_or_exit(owner.as_deref(), "List");
            let endpoint = api_url_or_exit(&server, "List", &["api", "snippets"]);
            let request_start = Instant::now();
            let res = client
                .get(endpoint)
                .header(DEFAULT_OWNER_HEADER, owner)
                .send()
                .await?;
            let request_elapsed = request_start.elapsed();
            let res = ensure_success_or_exit(res, "List").await;

            let parse_start = Instant::now();
            let snippets: Vec<Value> = res.json().await?;
            let parse_elapsed = parse_start.elapsed();

            log_timing_parts(timing, "list", request_elapsed, Some(parse_elapsed));
            let output = match format_summary_output(&snippets, json) {
                Ok(output) => output,
                Err(message) => exit_with("List", &message),
            };
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Commands::Delete { identifier } => {
            let owner = require_owner_or_exit(owner.as_deref(), "Delete");
            let endpoint =
                api_url_or_exit(&server, "Delete", &["api", "snippet", identifier.as_str()]);
            let request_start = Instant::now();
            let res = client
                .delete(endpoint)
                .header(DEFAULT_OWNER_HEADER, owner)
                .send()
                .await?;
            let request_elapsed = request_start.elapsed();
            let res = ensure_success_or_exit(res, "Delete").await;
            let parse_start = Instant::now();
            let response: Value = res.json().await?;
            let parse_elapsed = parse_start.elapsed();
            log_timing_parts(timing, "delete", request_elapsed, Some(parse_elapsed));

            match format_delete_output(&identifier, &response, json) {
                Ok(output) => println!("{}", output),
                Err(message) => exit_with("Delete", &message),
            }
        }
        Commands::Quota => {
            let owner = require_owner_or_exit(owner.as_deref(), "Quota");
            let endpoint = api_url_or_exit(&server, "Quota", &["api", "quota"]);
            let request_start = Instant::now();
            let res = client
                .get(endpoint)
                .header(DEFAULT_OWNER_HEADER, owner)
                .send()
                .await?;
            let request_elapsed = request_start.elapsed();
            let res = ensure_success_or_exit(res, "Quota").await;
            let parse_start = Instant::now();
            let quota: Value = res.json().await?;
            let parse_elapsed = parse_start.elapsed();
            log_timing_parts(timing, "quota", request_elapsed, Some(parse_elapsed));

            match format_quota_output(&quota, json) {
                Ok(output) => println!("{}", output),
                Err(message) => exit_with("Quota", &message),
            }
        }
    }

    Ok(())
}
