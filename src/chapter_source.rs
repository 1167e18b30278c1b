/*!
 * Chapter batch loading and handling.
 *
 * The document-extraction collaborator produces ordered chapter records and
 * persists them as a JSON batch file. This module loads those batches and
 * exposes the per-chapter text the pipeline narrates. Field names follow the
 * extraction collaborator's output (`chapter_title` / `chapter_content`).
 */

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// One extracted chapter: a title and its ordered content lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterRecord {
    /// Chapter title as extracted from the source document
    #[serde(rename = "chapter_title")]
    pub title: String,

    /// Ordered lines of chapter text
    #[serde(rename = "chapter_content", default)]
    pub content_lines: Vec<String>,
}

impl ChapterRecord {
    /// Create a chapter record.
    pub fn new(title: impl Into<String>, content_lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            content_lines,
        }
    }

    /// Whether the chapter has no narratable content.
    pub fn is_empty(&self) -> bool {
        self.content_lines.iter().all(|line| line.trim().is_empty())
    }

    /// The chapter's content lines joined into a single text.
    ///
    /// Blank lines are dropped and the rest joined with single spaces;
    /// returns an empty string for an empty chapter.
    pub fn joined_text(&self) -> String {
        self.content_lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Number of words across the chapter's content lines.
    pub fn word_count(&self) -> usize {
        self.content_lines
            .iter()
            .map(|line| line.split_whitespace().count())
            .sum()
    }
}

/// An ordered collection of chapters loaded from one batch file.
#[derive(Debug, Clone)]
pub struct ChapterBatch {
    /// The batch file the chapters were loaded from
    pub source_file: PathBuf,

    /// Chapters in document order
    pub chapters: Vec<ChapterRecord>,
}

impl ChapterBatch {
    /// Create an in-memory batch.
    pub fn new(source_file: PathBuf, chapters: Vec<ChapterRecord>) -> Self {
        Self {
            source_file,
            chapters,
        }
    }

    /// Load a chapter batch from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open chapter batch file: {:?}", path))?;

        let chapters: Vec<ChapterRecord> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse chapter batch file: {:?}", path))?;

        if chapters.is_empty() {
            return Err(anyhow!("Chapter batch file contains no chapters: {:?}", path));
        }

        Ok(Self {
            source_file: path.to_path_buf(),
            chapters,
        })
    }

    /// Write the batch to a JSON file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create chapter batch file: {:?}", path))?;

        serde_json::to_writer_pretty(BufWriter::new(file), &self.chapters)
            .with_context(|| format!("Failed to write chapter batch file: {:?}", path))?;

        Ok(())
    }

    /// Number of chapters with narratable content.
    pub fn non_empty_count(&self) -> usize {
        self.chapters.iter().filter(|c| !c.is_empty()).count()
    }

    /// Total word count across all chapters.
    pub fn total_word_count(&self) -> usize {
        self.chapters.iter().map(|c| c.word_count()).sum()
    }
}
