use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use socket_agent::{
    ApiResponse, ClientBuilder, ClientConfig, ConfigError, Descriptor, DescriptorError, Params,
    ProjectionError, RestMethod, SocketAgentError, ToolFormat, UnknownParameterPolicy,
};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Call self-describing HTTP APIs from the shell.
///
/// The service's descriptor is fetched from <URL>/.well-known/socket-agent
/// unless --descriptor points at a local copy.
#[derive(Debug, Parser)]
#[command(name = "socket-agent", version, after_help = AFTER_HELP)]
struct Cli {
    /// Base URL of the service (default: $SOCKET_AGENT_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Load the descriptor from a JSON or YAML file instead of discovering it
    #[arg(long, value_name = "FILE", global = true)]
    descriptor: Option<PathBuf>,

    /// Bearer token (default: $SOCKET_AGENT_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// API key sent as X-API-Key (default: $SOCKET_AGENT_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    timeout: Option<u64>,

    /// Drop undeclared parameters instead of rejecting the call
    #[arg(long, global = true)]
    lenient: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List endpoint names
    Endpoints,

    /// Print one endpoint definition
    Describe {
        /// Endpoint name
        endpoint: String,
    },

    /// Print tool schemas for LLM function calling
    Tools {
        /// Schema dialect: openai, anthropic or generic
        #[arg(long, default_value = "openai")]
        format: String,
    },

    /// Call an endpoint by name
    Call {
        /// Endpoint name
        endpoint: String,

        /// Parameters; values are parsed as JSON when possible
        #[arg(value_name = "KEY=VALUE", value_parser = parse_assignment)]
        params: Vec<(String, Value)>,
    },

    /// Send a request without consulting the descriptor
    Raw {
        /// HTTP method
        #[arg(value_parser = parse_method)]
        method: RestMethod,

        /// Path relative to the base URL
        path: String,

        /// Query parameters; values are parsed as JSON when possible
        #[arg(value_name = "KEY=VALUE", value_parser = parse_assignment)]
        params: Vec<(String, Value)>,

        /// JSON request body
        #[arg(long, value_parser = parse_json)]
        body: Option<Value>,

        /// Extra request header
        #[arg(long = "header", value_name = "NAME:VALUE", value_parser = parse_header)]
        headers: Vec<(String, String)>,
    },
}

const AFTER_HELP: &str = "\
EXAMPLES:
  socket-agent --url localhost:8000 endpoints
  socket-agent --url localhost:8000 tools --format anthropic
  socket-agent --url localhost:8000 call get_product id=123
  socket-agent --url localhost:8000 call create_product name=Widget price=9.99
  socket-agent --url localhost:8000 raw GET /health
";

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Agent(#[from] SocketAgentError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid descriptor file: {0}")]
    Descriptor(#[from] DescriptorError),

    #[error(transparent)]
    Format(#[from] ProjectionError),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let local = cli.descriptor.as_deref().map(load_descriptor).transpose()?;
    let config = resolve_config(&cli, local.as_ref())?;
    let mut builder = ClientBuilder::from_config(&config)?;
    if let Some(descriptor) = local {
        builder = builder.descriptor(descriptor);
    }
    let client = builder.build()?;

    let needs_descriptor = !matches!(cli.command, Command::Raw { .. });
    if needs_descriptor && client.descriptor().is_none() {
        debug!(url = %client.base_url(), "Discovering descriptor");
        client.discover().await?;
    }

    match cli.command {
        Command::Endpoints => print_json(&client.list_endpoints()?)?,
        Command::Describe { endpoint } => print_json(&client.get_endpoint(&endpoint)?)?,
        Command::Tools { format } => {
            let format: ToolFormat = format.parse()?;
            print_json(&client.get_tools(format)?)?;
        }
        Command::Call { endpoint, params } => {
            let response = client.call(&endpoint, into_params(params)).await?;
            return print_response(&response);
        }
        Command::Raw {
            method,
            path,
            params,
            body,
            headers,
        } => {
            let response = client
                .call_raw(method, &path, into_params(params), body, headers)
                .await?;
            return print_response(&response);
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Environment first, then flags; a local descriptor may supply the URL.
fn resolve_config(cli: &Cli, local: Option<&Descriptor>) -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.url {
        config.base_url = Some(url.clone());
    }
    if config.base_url.is_none() {
        config.base_url = local
            .and_then(Descriptor::base_url)
            .map(|url| url.to_string());
    }
    if let Some(token) = &cli.token {
        config.token = Some(token.clone());
    }
    if let Some(key) = &cli.api_key {
        config.api_key = Some(key.clone());
    }
    if let Some(secs) = cli.timeout {
        config.timeout_secs = secs;
    }
    if cli.lenient {
        config.unknown_parameters = UnknownParameterPolicy::Ignore;
    }
    Ok(config)
}

fn load_descriptor(path: &Path) -> Result<Descriptor, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let descriptor = if is_yaml {
        Descriptor::from_yaml(&text)?
    } else {
        Descriptor::from_json(&text)?
    };
    Ok(descriptor)
}

fn into_params(pairs: Vec<(String, Value)>) -> Params {
    pairs.into_iter().collect()
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_response(response: &ApiResponse) -> Result<ExitCode, CliError> {
    print_json(response)?;
    Ok(if response.success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_tracing(verbose: u8) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,socket_agent=info".to_string(),
            2 => "info,socket_agent=debug".to_string(),
            _ => "debug,socket_agent=trace".to_string(),
        },
    };
    let filter = EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Parses `key=value`; the value is JSON if it parses, else a plain string.
fn parse_assignment(input: &str) -> Result<(String, Value), String> {
    let (key, raw) = input
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{input}'"))?;
    if key.is_empty() {
        return Err(format!("missing key in '{input}'"));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

fn parse_method(input: &str) -> Result<RestMethod, String> {
    input
        .parse()
        .map_err(|_| format!("unsupported method '{input}' (expected GET, POST, PUT, PATCH or DELETE)"))
}

fn parse_json(input: &str) -> Result<Value, String> {
    serde_json::from_str(input).map_err(|e| format!("invalid JSON: {e}"))
}

fn parse_header(input: &str) -> Result<(String, String), String> {
    let (name, value) = input
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:VALUE, got '{input}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing header name in '{input}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn assignment_values_parse_as_json_when_possible() {
        assert_eq!(parse_assignment("id=123").unwrap(), ("id".to_string(), json!(123)));
        assert_eq!(parse_assignment("price=9.99").unwrap().1, json!(9.99));
        assert_eq!(parse_assignment("draft=true").unwrap().1, json!(true));
        assert_eq!(parse_assignment(r#"tags=["a","b"]"#).unwrap().1, json!(["a", "b"]));
        assert_eq!(parse_assignment("name=Widget").unwrap().1, json!("Widget"));
        assert_eq!(parse_assignment("note=").unwrap().1, json!(""));
        assert_eq!(parse_assignment("q=a=b").unwrap().1, json!("a=b"));
    }

    #[test]
    fn assignment_requires_key_and_equals() {
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=1").is_err());
    }

    #[test]
    fn header_parsing_trims() {
        assert_eq!(
            parse_header("X-Tenant: acme").unwrap(),
            ("X-Tenant".to_string(), "acme".to_string())
        );
        assert!(parse_header("no-colon").is_err());
    }

    #[test]
    fn parses_call_with_params() {
        let cli = Cli::try_parse_from([
            "socket-agent",
            "--url",
            "localhost:8000",
            "call",
            "create_product",
            "name=Widget",
            "price=9.99",
        ])
        .unwrap();

        assert_eq!(cli.url.as_deref(), Some("localhost:8000"));
        match cli.command {
            Command::Call { endpoint, params } => {
                assert_eq!(endpoint, "create_product");
                let params = into_params(params);
                assert_eq!(params["name"], "Widget");
                assert_eq!(params["price"], 9.99);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_raw_with_body_and_headers() {
        let cli = Cli::try_parse_from([
            "socket-agent",
            "raw",
            "patch",
            "/products/9",
            "notify=false",
            "--body",
            r#"{"price": 12}"#,
            "--header",
            "X-Trace: 1",
            "--lenient",
        ])
        .unwrap();

        assert!(cli.lenient);
        match cli.command {
            Command::Raw {
                method,
                path,
                params,
                body,
                headers,
            } => {
                assert_eq!(method, RestMethod::Patch);
                assert_eq!(path, "/products/9");
                assert_eq!(params, vec![("notify".to_string(), json!(false))]);
                assert_eq!(body, Some(json!({ "price": 12 })));
                assert_eq!(headers, vec![("X-Trace".to_string(), "1".to_string())]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_method_and_bad_body() {
        assert!(Cli::try_parse_from(["socket-agent", "raw", "TRACE", "/"]).is_err());
        assert!(Cli::try_parse_from(["socket-agent", "raw", "POST", "/", "--body", "{"]).is_err());
    }

    #[test]
    fn tools_format_defaults_to_openai() {
        let cli = Cli::try_parse_from(["socket-agent", "tools"]).unwrap();
        assert!(matches!(cli.command, Command::Tools { ref format } if format == "openai"));
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "socket-agent",
            "--url",
            "shop.test",
            "--token",
            "sk-cli",
            "--timeout",
            "5",
            "--lenient",
            "endpoints",
        ])
        .unwrap();

        let config = resolve_config(&cli, None).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("shop.test"));
        assert_eq!(config.token.as_deref(), Some("sk-cli"));
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.unknown_parameters, UnknownParameterPolicy::Ignore);
    }
}
