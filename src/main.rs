//! PlanFloor API Server
//!
//! REST backend for flooring and renovation project management.

use clap::Parser;
use planfloor::{init_logging, PlanfloorServer, WebConfig};

/// PlanFloor API server - flooring project management backend
#[derive(Parser)]
#[command(name = "planfloor")]
#[command(about = "REST backend for flooring and renovation projects")]
#[command(version)]
struct Args {
    /// Server host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Enable development mode (diagnostic detail in error responses)
    #[arg(long)]
    dev: bool,

    /// Enable demo-mode fallbacks when the database is unreachable
    #[arg(long)]
    demo: bool,

    /// Database URL
    #[arg(long)]
    database_url: Option<String>,

    /// Directory for uploaded files
    #[arg(long)]
    upload_dir: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    std::env::set_var(
        "RUST_LOG",
        format!("planfloor={},tower_http=debug", args.log_level),
    );
    init_logging();

    // Load environment variables
    dotenvy::dotenv().ok();

    let mut config = WebConfig::from_env();

    // Override with command line arguments
    config.host = args.host;
    config.port = args.port;
    config.dev_mode = config.dev_mode || args.dev;
    config.demo_mode = config.demo_mode || args.demo;
    if let Some(database_url) = args.database_url {
        config.database_url = Some(database_url);
    }
    if let Some(upload_dir) = args.upload_dir {
        config.upload_dir = upload_dir;
    }

    println!("🚀 Starting PlanFloor API server");
    println!("📍 Server: http://{}:{}", config.host, config.port);
    println!("🔧 Demo mode: {}", config.demo_mode);

    if config.database_url.is_none() {
        println!("⚠️  Warning: DATABASE_URL is not set.");
        if config.demo_mode {
            println!("   The server will run with demo-mode fallbacks.");
        } else {
            println!("   Most endpoints will fail until a database is configured.");
        }
    }

    if config.jwt_secret == WebConfig::default().jwt_secret && !config.dev_mode {
        println!("⚠️  Warning: PLANFLOOR_JWT_SECRET is not set; using the default secret.");
        println!("   Set a strong secret before exposing this server.");
    }

    let server = match PlanfloorServer::new(config).await {
        Ok(server) => server,
        Err(e) => {
            eprintln!("❌ Failed to build server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.start().await {
        eprintln!("❌ Server failed to start: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        use clap::Parser;

        // Test default values
        let args = Args::parse_from(["planfloor"]);
        assert_eq!(args.host, "127.0.0.1");
        assert_eq!(args.port, 8080);
        assert!(!args.demo);

        // Test custom values
        let args = Args::parse_from(["planfloor", "--host", "0.0.0.0", "--port", "3000", "--demo"]);
        assert_eq!(args.host, "0.0.0.0");
        assert_eq!(args.port, 3000);
        assert!(args.demo);
    }
}
