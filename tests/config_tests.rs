//! Tests for configuration loading.

use std::io::Write;
use std::sync::{Mutex, OnceLock};

use chunkwise::config::{ProcessorConfig, StrategyConfig, STRATEGY_ENV};
use chunkwise::error::ChunkwiseError;
use chunkwise::processor::StreamProcessor;
use chunkwise::types::StreamChunk;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[test]
fn from_env_reads_strategy_string() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&[STRATEGY_ENV]);

    std::env::set_var(STRATEGY_ENV, "punctuation+batch:20");
    let config = ProcessorConfig::from_env().unwrap();
    assert_eq!(
        config.strategy,
        StrategyConfig::Composite {
            strategies: vec![StrategyConfig::Punctuation, StrategyConfig::Batch { size: 20 }],
        }
    );
}

#[test]
fn unset_env_keeps_defaults() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&[STRATEGY_ENV]);

    std::env::remove_var(STRATEGY_ENV);
    let mut config = ProcessorConfig::builder()
        .strategy(StrategyConfig::WordBoundary)
        .build();
    config.apply_env().unwrap();
    assert_eq!(config.strategy, StrategyConfig::WordBoundary);
}

#[test]
fn invalid_env_string_is_a_configuration_error() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&[STRATEGY_ENV]);

    std::env::set_var(STRATEGY_ENV, "sentence");
    let err = ProcessorConfig::from_env().unwrap_err();
    assert!(matches!(err, ChunkwiseError::Configuration(ref msg) if msg.contains("sentence")));
}

#[test]
fn from_file_loads_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[strategy]
kind = "debounce"
delay_ms = 75
"#
    )
    .unwrap();

    let config = ProcessorConfig::from_file(file.path()).unwrap();
    assert_eq!(config.strategy, StrategyConfig::Debounce { delay_ms: 75 });
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ProcessorConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ChunkwiseError::Io(_)));
}

#[test]
fn malformed_toml_is_a_configuration_error() {
    let err = ProcessorConfig::from_toml_str("[strategy]\nkind = \"teleport\"").unwrap_err();
    assert!(matches!(err, ChunkwiseError::Configuration(_)));
}

#[tokio::test]
async fn configured_processor_uses_the_configured_strategy() {
    let config = ProcessorConfig::from_toml_str(
        r#"
        [strategy]
        kind = "batch"
        size = 2
        "#,
    )
    .unwrap();

    let updates = std::sync::Arc::new(Mutex::new(Vec::new()));
    let sink = std::sync::Arc::clone(&updates);
    let handlers = chunkwise::processor::CallbackHandlers::new()
        .with_text_update(move |text| sink.lock().unwrap().push(text.to_string()));

    let chunks = futures::stream::iter(
        ["a", "b", "c"].map(|s| Ok(StreamChunk::text_delta(s))),
    );
    StreamProcessor::from_config(&config, handlers)
        .process(chunks)
        .await
        .unwrap();

    assert_eq!(*updates.lock().unwrap(), vec!["ab", "abc"]);
}
