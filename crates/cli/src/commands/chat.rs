//! One-shot chat command: load the config, resolve the processor, run a
//! single input through it (or print its history) and exit.

use std::path::PathBuf;

use tracing::debug;

use orchael_config::{apply_env, load_config};
use orchael_core::chat::ChatInput;
use orchael_loader::ExtensionRegistry;
use orchael_processors::default_registry;

pub async fn run(
    config: PathBuf,
    input: Option<String>,
    history: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    run_with_registry(default_registry(), config, input, history).await
}

async fn run_with_registry(
    mut registry: ExtensionRegistry,
    config: PathBuf,
    input: Option<String>,
    history: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config_data = load_config(&config)?;
    apply_env(&config_data);

    debug!(class = %config_data.processor_class, "Loading processor");
    let handle = registry.load_processor_class(&config_data.processor_class, &config)?;
    let processor = registry.instantiate(handle.as_ref())?;

    if history {
        println!("Chat History:");
        for (i, entry) in processor.get_history().iter().enumerate() {
            println!("{}. Input: {}", i + 1, entry.input);
            println!("   Output: {}", entry.output);
        }
        return Ok(());
    }

    let Some(input) = input else {
        return Err("--input is required unless --history is used".into());
    };

    let result = processor.process_chat(ChatInput::new(input)).await?;
    println!("Output: {}", result.output);

    Ok(())
}
