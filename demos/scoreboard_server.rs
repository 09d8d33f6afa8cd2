//! Scoreboard server example
//!
//! Run with: cargo run --example scoreboard_server [BIND_ADDR] [RESULTS_FILE]
//!
//! Examples:
//!   cargo run --example scoreboard_server                         # binds to 0.0.0.0:4100
//!   cargo run --example scoreboard_server 127.0.0.1:4200          # binds to 127.0.0.1:4200
//!   cargo run --example scoreboard_server 0.0.0.0:4100 results.jsonl
//!
//! ## Talking to it
//!
//! Any line-oriented TCP client works, e.g. netcat:
//!
//!   nc localhost 4100
//!   {"type":"createGame","p1Name":"Ana","p2Name":"Ben","maxScore":11,"serving":1}
//!   {"type":"incrementScore","player":1}
//!   {"type":"undo"}
//!   {"type":"getWinner"}
//!
//! Every state change is pushed to all connected clients. Finished matches
//! are logged, and appended to RESULTS_FILE when one is given.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use rally_score::server::config::DEFAULT_PORT;
use rally_score::sink::{spawn_result_worker_until, JsonLinesSink, LogSink};
use rally_score::{ResultNotifier, ScoreServer, ServerConfig, SessionRegistry};

fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    if let Ok(addr) = arg.parse::<SocketAddr>() {
        return Ok(addr);
    }
    if arg == "localhost" {
        return Ok(SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)));
    }
    if let Ok(ip) = arg.parse() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    Err(format!(
        "Invalid bind address: '{}'. Expected format: IP:PORT or IP or 'localhost'",
        arg
    ))
}

fn print_usage() {
    eprintln!("Usage: scoreboard_server [BIND_ADDR] [RESULTS_FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  BIND_ADDR     Address to bind to (default: 0.0.0.0:{})", DEFAULT_PORT);
    eprintln!("  RESULTS_FILE  Append finished matches here as JSON lines");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let bind_addr = match args.get(1) {
        Some(addr_str) => match parse_bind_addr(addr_str) {
            Ok(addr) => addr,
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        },
        None => SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rally_score=debug".parse()?)
                .add_directive("scoreboard_server=debug".parse()?),
        )
        .init();

    // Results leave the scoring path through a channel drained by a worker
    let (notifier, results) = ResultNotifier::channel();
    let (stop_results, stopped) = tokio::sync::oneshot::channel::<()>();
    let stopped = async move {
        let _ = stopped.await;
    };
    let worker = match args.get(2) {
        Some(path) => {
            println!("Recording results to {}", path);
            spawn_result_worker_until(Arc::new(JsonLinesSink::new(path)), results, stopped)
        }
        None => spawn_result_worker_until(Arc::new(LogSink), results, stopped),
    };

    let registry = Arc::new(SessionRegistry::with_notifier(notifier));
    let server = ScoreServer::new(ServerConfig::with_addr(bind_addr), registry);

    println!("Starting scoreboard server on {}", server.bind_addr());

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                eprintln!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\nShutting down...");
        }
    }

    // Stop accepting commands, then let queued results reach the sink
    drop(server);
    let _ = stop_results.send(());
    match tokio::time::timeout(Duration::from_secs(5), worker).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => eprintln!("Result worker failed: {}", e),
        Err(_) => eprintln!("Timed out writing pending match results"),
    }

    Ok(())
}
