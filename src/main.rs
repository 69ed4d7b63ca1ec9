//! EmberKV - An In-Memory Key-Value Store with Sets and Snapshots
//!
//! This is the main entry point for the EmberKV server. It parses the
//! command line, sets up logging, builds the store, starts the background
//! sweeper, and serves the HTTP transport until ctrl-c.

use emberkv::commands::CommandHandler;
use emberkv::storage::Store;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Server configuration
struct Config {
    /// Host to bind to
    host: String,
    /// Port to listen on
    port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: emberkv::DEFAULT_HOST.to_string(),
            port: emberkv::DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Parse configuration from command-line arguments
    fn from_args() -> Self {
        let mut config = Config::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--host" | "-h" => {
                    if i + 1 < args.len() {
                        config.host = args[i + 1].clone();
                        i += 2;
                    } else {
                        eprintln!("Error: --host requires a value");
                        std::process::exit(1);
                    }
                }
                "--port" | "-p" => {
                    if i + 1 < args.len() {
                        config.port = args[i + 1].parse().unwrap_or_else(|_| {
                            eprintln!("Error: invalid port number");
                            std::process::exit(1);
                        });
                        i += 2;
                    } else {
                        eprintln!("Error: --port requires a value");
                        std::process::exit(1);
                    }
                }
                "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("EmberKV version {}", emberkv::VERSION);
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                    print_help();
                    std::process::exit(1);
                }
            }
        }

        config
    }

    /// Returns the bind address as a string
    fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn print_help() {
    println!(
        r#"
EmberKV - An In-Memory Key-Value Store with Sets and Snapshots

USAGE:
    emberkv [OPTIONS]

OPTIONS:
    -h, --host <HOST>    Host to bind to (default: 127.0.0.1)
    -p, --port <PORT>    Port to listen on (default: 8080)
    -v, --version        Print version information
        --help           Print this help message

EXAMPLES:
    emberkv                        # Start on 127.0.0.1:8080
    emberkv --port 8081            # Start on port 8081
    emberkv --host 0.0.0.0         # Listen on all interfaces

CONNECTING:
    Commands go through the HTTP transport as JSON:
    $ curl -s -X POST localhost:8080/execute \
        -H 'Content-Type: application/json' \
        -d '{{"command": "SET name ember"}}'
    {{"response":["OK"]}}
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = Config::from_args();

    // Set up logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    println!(
        "EmberKV v{} - In-Memory Key-Value Store\nServer starting on {}\nUse Ctrl+C to shutdown gracefully.",
        emberkv::VERSION,
        config.bind_address()
    );

    // Create the store (shared across all request handlers)
    let store = Store::new();
    info!("store initialized");

    // Start the background expiration sweeper
    store.start_sweeper();
    info!("background expiration sweeper started");

    let handler = CommandHandler::new(store);
    let listener = TcpListener::bind(config.bind_address()).await?;

    emberkv::server::serve(listener, handler).await
}
