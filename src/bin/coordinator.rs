use shardstore::config::Config;
use shardstore::coordinator::server;
use shardstore::coordinator::service::Coordinator;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut config_path = String::from("config.txt");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                config_path = args[i + 1].clone();
                i += 2;
            }
            _ => {
                eprintln!("Usage: {} [--config <path>]", args[0]);
                eprintln!("Example: {} --config config.txt", args[0]);
                std::process::exit(1);
            }
        }
    }

    let config = Arc::new(Config::load(&config_path)?);
    tracing::info!(
        "coordinating {} storage node(s), {:?} per node round-trip",
        config.shard_count(),
        config.node_timeout
    );

    let listener = TcpListener::bind((
        config.coordinator_host.as_str(),
        config.coordinator_port,
    ))
    .await?;
    tracing::info!(
        "coordinator listening on {}:{}",
        config.coordinator_host,
        config.coordinator_port
    );

    let coordinator = Arc::new(Coordinator::new(config));
    server::run(listener, coordinator).await?;

    Ok(())
}
