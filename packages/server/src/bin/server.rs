//! Streaming chat server: no client-side script, one open response per client.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kairan-server
//! cargo run --bin kairan-server -- --host 0.0.0.0 --port 3000
//! ```

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use kairan_server::{
    config::{
        BUFFER_SIZE, ConfigError, HISTORY_LIMIT, Limits, MAX_MSG_LEN, PING_RATE, ServerConfig,
    },
    infrastructure::{ConnectionRegistry, History},
    ui::{Server, page},
    usecase::{Broadcaster, StreamConnectionUseCase, SubmitMessageUseCase},
};
use kairan_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "kairan-server")]
#[command(about = "Script-free chat server streaming updates over one open response", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "KAIRAN_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "KAIRAN_PORT", default_value_t = 8080)]
    port: u16,

    /// Directory served under /static
    #[arg(long, env = "KAIRAN_STATIC_DIR", default_value = "static")]
    static_dir: PathBuf,

    /// Number of updates replayed to new connections
    #[arg(long, default_value_t = HISTORY_LIMIT)]
    history_limit: usize,

    /// Idle interval before a keep-alive space is written, in milliseconds
    #[arg(long, default_value_t = PING_RATE.as_millis() as u64)]
    ping_rate_ms: u64,

    /// Maximum message length in bytes
    #[arg(long, default_value_t = MAX_MSG_LEN)]
    max_msg_len: usize,

    /// Number of buffered fragments per connection
    #[arg(long, default_value_t = BUFFER_SIZE)]
    buffer_size: usize,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    log_level: String,
}

impl TryFrom<Args> for ServerConfig {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let limits = Limits {
            history_limit: args.history_limit,
            ping_rate: Duration::from_millis(args.ping_rate_ms),
            max_msg_len: args.max_msg_len,
            buffer_size: args.buffer_size,
        };
        limits.validate()?;

        Ok(ServerConfig {
            host: args.host,
            port: args.port,
            static_dir: args.static_dir,
            limits,
        })
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = match ServerConfig::try_from(args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize dependencies in order:
    // 1. History and connection registry
    // 2. Broadcaster
    // 3. UseCases
    // 4. Server

    // 1. Create shared state (one instance per process)
    let history = Arc::new(History::new(config.limits.history_limit));
    let registry = Arc::new(ConnectionRegistry::new());

    // 2. Create Broadcaster
    let broadcaster = Arc::new(Broadcaster::new(history, registry));

    // 3. Create UseCases
    let submit_message_usecase = Arc::new(SubmitMessageUseCase::new(
        broadcaster.clone(),
        Arc::new(SystemClock),
        config.limits.max_msg_len,
    ));
    let stream_connection_usecase = Arc::new(StreamConnectionUseCase::new(
        broadcaster.clone(),
        page::preamble(),
        &config.limits,
    ));

    // 4. Create and run the server
    let server = Server::new(
        config,
        submit_message_usecase,
        stream_connection_usecase,
        broadcaster,
    );
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
