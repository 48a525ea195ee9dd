//! Dispatch façade for the Orchael SDK.
//!
//! A [`ProcessorHost`] owns the one processor slot a server process has.
//! The slot starts empty and is filled on first access by running the full
//! initialization sequence — load config, project `env`, resolve the class,
//! instantiate — under a mutex, so concurrent first requests perform exactly
//! one instantiation and all see the same instance (or the same error).
//!
//! Initialization failure leaves the slot empty: the next call retries from
//! scratch, so a config file that only appears after server start recovers
//! without a restart.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use orchael_config::{apply_env, load_config};
use orchael_core::error::ProcessorInitError;
use orchael_core::ChatProcessor;
use orchael_loader::ExtensionRegistry;

/// Process-wide holder of the active processor.
pub struct ProcessorHost {
    config_path: PathBuf,
    inner: Mutex<HostInner>,
}

struct HostInner {
    registry: ExtensionRegistry,
    slot: Option<Arc<dyn ChatProcessor>>,
}

impl ProcessorHost {
    /// Create a host with an empty slot.
    pub fn new(registry: ExtensionRegistry, config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            inner: Mutex::new(HostInner {
                registry,
                slot: None,
            }),
        }
    }

    /// The config path this host initializes from.
    pub fn config_path(&self) -> &std::path::Path {
        &self.config_path
    }

    /// Get the active processor, initializing it on first access.
    ///
    /// The mutex spans the whole load-config → instantiate sequence; it is
    /// the single critical section of the server front end.
    pub async fn get_processor(&self) -> Result<Arc<dyn ChatProcessor>, ProcessorInitError> {
        let mut inner = self.inner.lock().await;

        if let Some(processor) = &inner.slot {
            return Ok(processor.clone());
        }

        let config = load_config(&self.config_path).inspect_err(
            |e| warn!(path = %self.config_path.display(), error = %e, "Config load failed"),
        )?;

        // Env must be in place before the constructor runs
        apply_env(&config);

        let handle = inner
            .registry
            .load_processor_class(&config.processor_class, &self.config_path)?;
        let instance: Arc<dyn ChatProcessor> =
            Arc::from(inner.registry.instantiate(handle.as_ref())?);

        info!(class = %config.processor_class, "Processor initialized");
        inner.slot = Some(instance.clone());
        Ok(instance)
    }

    /// Whether the slot has been filled.
    pub async fn is_initialized(&self) -> bool {
        self.inner.lock().await.slot.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use orchael_core::chat::{ChatHistoryEntry, ChatInput, ChatOutput};
    use orchael_core::error::ProcessingError;
    use orchael_loader::{Construct, Module, symbol::ConstructError};
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Declares a no-op processor type with its own construction counter,
    /// so parallel tests never share counts.
    macro_rules! counted_processor {
        ($name:ident, $counter:ident) => {
            static $counter: AtomicUsize = AtomicUsize::new(0);

            struct $name;

            impl Construct for $name {
                fn construct() -> Result<Self, ConstructError> {
                    $counter.fetch_add(1, Ordering::SeqCst);
                    Ok(Self)
                }
            }

            #[async_trait]
            impl ChatProcessor for $name {
                async fn process_chat(
                    &self,
                    input: ChatInput,
                ) -> Result<ChatOutput, ProcessingError> {
                    Ok(ChatOutput {
                        output: input.input.clone(),
                        input: input.input,
                    })
                }

                fn get_history(&self) -> Vec<ChatHistoryEntry> {
                    Vec::new()
                }
            }
        };
    }

    counted_processor!(Counted, COUNTED_BUILDS);
    counted_processor!(Racer, RACER_BUILDS);

    fn registry_with<P>(class_name: &str) -> ExtensionRegistry
    where
        P: ChatProcessor + Construct + 'static,
    {
        let mut module = Module::new("pkg");
        module.export_processor::<P>(class_name);
        let mut registry = ExtensionRegistry::new();
        registry.register_module(module);
        registry
    }

    fn write_config(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.yaml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[tokio::test]
    async fn first_access_initializes_then_caches() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "processor_class: pkg.Echoish\n");
        let host = ProcessorHost::new(registry_with::<Counted>("Echoish"), path);

        assert!(!host.is_initialized().await);
        let first = host.get_processor().await.unwrap();
        assert!(host.is_initialized().await);
        let second = host.get_processor().await.unwrap();

        // Identical instance, not merely an equal one
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn failure_leaves_slot_empty_and_retry_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let host = ProcessorHost::new(registry_with::<Counted>("Echoish"), &path);

        // No config file yet: initialization fails, slot stays empty
        let err = host.get_processor().await.unwrap_err();
        assert!(matches!(err, ProcessorInitError::Config(_)));
        assert!(!host.is_initialized().await);

        // The config appears; the next call succeeds without a restart
        std::fs::write(&path, "processor_class: pkg.Echoish\n").unwrap();
        host.get_processor().await.unwrap();
        assert!(host.is_initialized().await);
    }

    #[tokio::test]
    async fn loader_failure_is_wrapped_and_retryable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "processor_class: pkg.Unknown\n");
        let host = ProcessorHost::new(registry_with::<Counted>("Echoish"), path);

        let err = host.get_processor().await.unwrap_err();
        assert!(matches!(err, ProcessorInitError::Loader(_)));
        assert!(!host.is_initialized().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_access_instantiates_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "processor_class: pkg.Racer\n");
        let host = Arc::new(ProcessorHost::new(registry_with::<Racer>("Racer"), path));

        assert_eq!(RACER_BUILDS.load(Ordering::SeqCst), 0);
        let mut tasks = Vec::new();
        for _ in 0..8 {
            let host = host.clone();
            tasks.push(tokio::spawn(async move { host.get_processor().await }));
        }

        let mut instances = Vec::new();
        for task in tasks {
            instances.push(task.await.unwrap().unwrap());
        }

        assert_eq!(RACER_BUILDS.load(Ordering::SeqCst), 1);
        for other in &instances[1..] {
            assert!(Arc::ptr_eq(&instances[0], other));
        }
    }

    #[tokio::test]
    async fn builtin_echo_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "processor_class: orchael_processors.EchoProcessor\n",
        );
        let host = ProcessorHost::new(orchael_processors::default_registry(), path);

        let processor = host.get_processor().await.unwrap();
        let out = processor
            .process_chat(ChatInput::new("Hi"))
            .await
            .unwrap();
        assert_eq!(out.output, "Echo: Hi");
        assert_eq!(
            processor.get_history(),
            vec![ChatHistoryEntry::new("Hi", "Echo: Hi")]
        );
    }
}
