use std::env;
use std::io;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use catalog_stub::{http_server, StubOptions};
use clap::Parser;

/// Serve the stand-in catalog locally.
#[derive(Debug, Parser)]
#[command(name = "catalog-stub", version, about = "Local stand-in for the product catalog API")]
struct Args {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8089)]
    port: u16,

    #[arg(long, default_value = "emilys")]
    username: String,

    #[arg(long, default_value = "emilyspass")]
    password: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long = "log-level")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", args.host, args.port))?;
    let options = StubOptions {
        username: args.username,
        password: args.password,
        ..StubOptions::default()
    };
    http_server::serve(addr, options).await
}

fn init_tracing(args: &Args) {
    if let Some(level) = &args.log_level {
        env::set_var("RUST_LOG", level);
    }

    let builder = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(io::stderr);

    let _ = builder.try_init();
}
