//! CLI argument parsing (§6 "CLI surface").

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "toolbox", author, version, about = "Tool-dispatch runtime for AI agents", long_about = None)]
pub struct Cli {
    /// Path to the tools-file YAML document (§4.2, §6).
    #[arg(long, value_name = "PATH", conflicts_with = "prebuilt")]
    pub tools_file: Option<String>,

    /// Name of an embedded prebuilt config bundle (§4.10), instead of `--tools-file`.
    #[arg(long, value_name = "NAME", conflicts_with = "tools_file")]
    pub prebuilt: Option<String>,

    /// Address the HTTP transport binds to.
    #[arg(long, value_name = "HOST", default_value = "127.0.0.1")]
    pub address: String,

    /// Port the HTTP transport binds to.
    #[arg(long, value_name = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Prefix every REST/MCP route with this path, e.g. `/toolbox`.
    #[arg(long, value_name = "STRING", default_value = "")]
    pub base_path: String,

    /// Tracing filter, e.g. `info`, `debug`, `toolbox_pipeline=debug`.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// OTLP collector endpoint. Accepted and stored; no exporter is wired in
    /// this core (§A.1, spec.md §1 Non-goals).
    #[arg(long, value_name = "URL")]
    pub telemetry_otlp: Option<String>,

    /// Serve MCP over stdio only; disables the HTTP transport entirely (§6).
    #[arg(long)]
    pub stdio: bool,
}
