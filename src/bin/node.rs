use shardstore::config::Config;
use shardstore::node::server;
use shardstore::node::storage::ShardStore;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut config_path = String::from("config.txt");
    let mut port_override: Option<u16> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                config_path = args[i + 1].clone();
                i += 2;
            }
            "--port" if i + 1 < args.len() => {
                port_override = Some(args[i + 1].parse()?);
                i += 2;
            }
            _ => {
                eprintln!("Usage: {} [--config <path>] [--port <port>]", args[0]);
                eprintln!("Example: {} --config config.txt --port 9001", args[0]);
                std::process::exit(1);
            }
        }
    }

    let config = Config::load(&config_path)?;
    let port = port_override.unwrap_or(config.node_port);

    let store = Arc::new(ShardStore::open(&config.storage_path, port).await?);
    tracing::info!("shard storage root: {}", store.root().display());

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("storage node listening on port {}", port);

    server::run(listener, store).await?;

    Ok(())
}
