//! `toolbox` binary: loads a tools file, wires the invocation pipeline, and
//! serves it over REST + MCP/HTTP or MCP/stdio (§4.8, §4.9, §6).

mod cli;
mod stubs;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use toolbox_config::ConfigLoader;
use toolbox_registry::{default_auth_service_registry, AuthServiceRegistry};
use toolbox_server::AppState;

const EXIT_OK: u8 = 0;
const EXIT_CONFIG_ERROR: u8 = 1;
const EXIT_BIND_ERROR: u8 = 2;
const EXIT_SIGINT: u8 = 130;

fn init_tracing(log_level: Option<&str>) {
    let filter = match log_level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| {
            eprintln!("invalid --log-level '{level}', falling back to 'info'");
            EnvFilter::new("info")
        }),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    if cli.telemetry_otlp.is_some() {
        tracing::info!(
            endpoint = cli.telemetry_otlp.as_deref(),
            "telemetry OTLP endpoint accepted but no exporter is wired in this core"
        );
    }

    let loader = ConfigLoader::new(
        Arc::new(stubs::source_registry()),
        Arc::new(stubs::tool_registry()),
        Arc::new(default_auth_service_registry()) as Arc<AuthServiceRegistry>,
    );

    let loaded = match (&cli.tools_file, &cli.prebuilt) {
        (Some(path), None) => loader.load_file(path).await,
        (None, Some(name)) => match toolbox_config::prebuilt::lookup(name) {
            Ok(yaml) => loader.load_str(yaml).await,
            Err(err) => {
                tracing::error!(error = %err, "failed to resolve prebuilt config");
                return ExitCode::from(EXIT_CONFIG_ERROR);
            }
        },
        _ => {
            eprintln!("exactly one of --tools-file or --prebuilt is required");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let loaded = match loaded {
        Ok(loaded) => loaded,
        Err(err) => {
            tracing::error!(error = %err, "failed to load tools file");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let pipeline = Arc::new(toolbox_pipeline::Pipeline::new(
        loaded.sources,
        loaded.tools,
        loaded.toolsets,
        loaded.auth,
    ));
    let toolsets = Arc::new(loaded.manifests);

    if cli.stdio {
        let handler = Arc::new(toolbox_mcp::McpHandler::new(pipeline, toolsets));
        tokio::select! {
            result = toolbox_mcp::stdio::serve(handler, "") => {
                if let Err(err) = result {
                    tracing::error!(error = %err, "stdio transport ended with an error");
                    return ExitCode::from(EXIT_CONFIG_ERROR);
                }
                ExitCode::from(EXIT_OK)
            }
            _ = tokio::signal::ctrl_c() => ExitCode::from(EXIT_SIGINT),
        }
    } else {
        serve_http(&cli, pipeline, toolsets).await
    }
}

async fn serve_http(
    cli: &Cli,
    pipeline: Arc<toolbox_pipeline::Pipeline>,
    toolsets: Arc<toolbox_registry::ToolsetMap>,
) -> ExitCode {
    let state = AppState::new(pipeline, toolsets);
    state.sessions.clone().spawn_reaper(std::time::Duration::from_secs(60));

    let mut router = toolbox_server::build_router(state);
    if !cli.base_path.is_empty() {
        router = axum::Router::new().nest(&cli.base_path, router);
    }

    let addr = format!("{}:{}", cli.address, cli.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, address = %addr, "failed to bind HTTP listener");
            return ExitCode::from(EXIT_BIND_ERROR);
        }
    };
    tracing::info!(address = %addr, "toolbox listening");

    tokio::select! {
        result = axum::serve(listener, router) => {
            if let Err(err) = result {
                tracing::error!(error = %err, "HTTP server ended with an error");
                return ExitCode::from(EXIT_CONFIG_ERROR);
            }
            ExitCode::from(EXIT_OK)
        }
        _ = tokio::signal::ctrl_c() => ExitCode::from(EXIT_SIGINT),
    }
}
