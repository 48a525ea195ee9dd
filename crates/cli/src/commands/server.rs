//! Server command: resolve the config path and run the HTTP front end.

use std::path::PathBuf;
use std::sync::Arc;

use orchael_config::resolve_config_path;
use orchael_dispatch::ProcessorHost;
use orchael_processors::default_registry;

pub async fn run(
    host: String,
    port: u16,
    config: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = resolve_config_path(config);

    if !config_path.exists() {
        return Err(format!("config file not found: {}", config_path.display()).into());
    }

    println!("Starting Orchael server on {host}:{port}");
    println!("Using config file: {}", config_path.display());

    // The processor itself initializes lazily on the first request.
    let processor_host = Arc::new(ProcessorHost::new(default_registry(), config_path));
    orchael_gateway::start(&host, port, processor_host).await
}
