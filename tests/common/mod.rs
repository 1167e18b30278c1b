/*!
 * Common test utilities for the bookvox test suite
 */

use std::path::PathBuf;
use std::fs;
use anyhow::Result;
use tempfile::TempDir;

use bookvox::app_config::{Config, PipelineConfig};
use bookvox::chapter_source::ChapterRecord;

/// Initializes logging for tests that want pipeline diagnostics
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &PathBuf, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a sample chapter batch file for testing
pub fn create_test_batch(dir: &PathBuf, filename: &str) -> Result<PathBuf> {
    let content = r#"[
  {
    "chapter_title": "Chapter One",
    "chapter_content": ["It was a dark night.", "The wind howled outside."]
  },
  {
    "chapter_title": "Chapter Two",
    "chapter_content": ["Morning came at last."]
  }
]"#;
    create_test_file(dir, filename, content)
}

/// Builds a chapter record from a title and content lines
pub fn chapter(title: &str, lines: &[&str]) -> ChapterRecord {
    ChapterRecord::new(title, lines.iter().map(|l| l.to_string()).collect())
}

/// Pipeline configuration without backoff delays, for fast loop tests
pub fn fast_pipeline_config() -> PipelineConfig {
    PipelineConfig {
        retry_backoff_ms: 0,
        ..PipelineConfig::default()
    }
}

/// Application configuration without backoff delays, for controller tests
pub fn fast_config() -> Config {
    Config {
        pipeline: fast_pipeline_config(),
        ..Config::default()
    }
}
