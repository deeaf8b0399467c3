use std::{
    net::{IpAddr, SocketAddr},
    process::ExitCode,
    time::Duration,
};

use backend::Server;
use clap::Parser;
use minimax::SearchBudget;
use session::CoordinatorConfig;

/// Hosts chess games between players, or against the engine, over WebSockets
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// The address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,
    /// How long to keep a room around after its game ends, in seconds
    #[arg(long, default_value_t = 60)]
    grace_secs: u64,
    /// The most positions the engine may search for one move
    #[arg(long)]
    search_nodes: Option<u64>,
    /// The most time the engine may take for one move, in milliseconds
    #[arg(long)]
    search_millis: Option<u64>,
}

impl Args {
    fn config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            grace_period: Duration::from_secs(self.grace_secs),
            search_budget: SearchBudget {
                max_nodes: self.search_nodes,
                time_limit: self.search_millis.map(Duration::from_millis),
            },
        }
    }
}

/// Completes on Ctrl-C, or on SIGTERM where there is one
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Can't listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Can't listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    log::info!("Shutting down");
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let server = Server::new(args.config());
    match server
        .serve(SocketAddr::new(args.host, args.port), shutdown_signal())
        .await
    {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
