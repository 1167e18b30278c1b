use anyhow::{Context, Result, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::Config;
use crate::chapter_source::ChapterBatch;
use crate::export::export_audiobook;
use crate::file_utils::FileManager;
use crate::pipeline::assembler::{Narrator, plan_chapters};
use crate::providers::{self, SpeechRecognizer, SpeechSynthesizer};

// @module: Application controller for audiobook narration

/// Container extension for exported audiobooks
const AUDIOBOOK_EXTENSION: &str = "m4b";

/// Extension of serialized chapter batch files
const BATCH_EXTENSION: &str = "json";

/// Main application controller for audiobook narration
///
/// The controller owns the provider instances for the whole process run and
/// injects them by reference into the pipeline, once per document.
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Synthesis collaborator, constructed once per process
    synthesizer: Arc<dyn SpeechSynthesizer>,
    // @field: Recognition collaborator, constructed once per process
    recognizer: Arc<dyn SpeechRecognizer>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let synthesizer = providers::create_synthesizer(&config)?;
        let recognizer = providers::create_recognizer(&config)?;

        Ok(Self {
            config,
            synthesizer,
            recognizer,
        })
    }

    /// Create a controller with explicit provider instances, used by tests
    /// to substitute scripted engines.
    pub fn with_providers(
        config: Config,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        recognizer: Arc<dyn SpeechRecognizer>,
    ) -> Self {
        Self {
            config,
            synthesizer,
            recognizer,
        }
    }

    /// Run the main workflow for one chapter batch file.
    pub async fn run(
        &self,
        input_file: PathBuf,
        output_dir: PathBuf,
        force_overwrite: bool,
    ) -> Result<()> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(input_file, output_dir, &multi_progress, force_overwrite)
            .await
    }

    /// Run the controller with progress reporting.
    async fn run_with_progress(
        &self,
        input_file: PathBuf,
        output_dir: PathBuf,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<()> {
        // Start timing the process
        let start_time = std::time::Instant::now();

        // Check if the input file exists
        if !FileManager::file_exists(&input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        // Ensure the output directory exists
        FileManager::ensure_dir(&output_dir)?;

        // Check if the audiobook already exists
        let output_path =
            FileManager::generate_output_path(&input_file, &output_dir, AUDIOBOOK_EXTENSION);
        if output_path.exists() && !force_overwrite {
            warn!("Skipping file, audiobook already exists (use -f to force overwrite)");
            return Ok(());
        }

        // Load the chapter batch
        let batch = ChapterBatch::load_from_file(&input_file)?;
        info!(
            "Loaded {} chapters ({} with content, {} words) from {:?}",
            batch.chapters.len(),
            batch.non_empty_count(),
            batch.total_word_count(),
            input_file
        );

        // Size the progress bar from a segmentation pre-pass
        let plans = plan_chapters(&batch.chapters, self.config.pipeline.max_chunk_chars);
        let total_chunks: usize = plans.iter().map(|p| p.chunks.len()).sum();
        if total_chunks == 0 {
            warn!("No narratable content in {:?}, nothing to export", input_file);
            return Ok(());
        }

        // Probe both engines once before committing to a long narration
        info!(
            "Narrating with {} synthesis, verified by {}",
            self.synthesizer.name(),
            self.recognizer.name()
        );
        self.synthesizer
            .test_availability()
            .await
            .map_err(|e| anyhow!("Synthesis engine unavailable: {}", e))?;
        self.recognizer
            .test_availability()
            .await
            .map_err(|e| anyhow!("Transcription engine unavailable: {}", e))?;

        let progress_bar = multi_progress.add(ProgressBar::new(total_chunks as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));

        // Narrate all chapters into a single waveform with chapter markers
        let narrator = Narrator::new(
            self.synthesizer.as_ref(),
            self.recognizer.as_ref(),
            &self.config.pipeline,
        );
        let narration = narrator
            .narrate(&batch.chapters, Some(&progress_bar))
            .await
            .with_context(|| format!("Narration failed for {:?}", input_file))?;
        progress_bar.finish_and_clear();

        info!("Narration complete: {}", narration.stats.summary());

        // Export the chaptered container
        export_audiobook(&narration.waveform, &narration.markers, &output_path)
            .await
            .with_context(|| format!("Export failed for {:?}", output_path))?;

        info!(
            "Audiobook created in {}: {:?} ({} ms of audio)",
            Self::format_duration(start_time.elapsed()),
            output_path,
            narration.waveform.duration_ms()
        );

        Ok(())
    }

    /// Process every chapter batch file in a directory.
    ///
    /// Failures are logged per file and the batch continues; only the scan
    /// itself can fail this method.
    pub async fn run_folder(
        &self,
        input_dir: PathBuf,
        output_dir: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<()> {
        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        info!("Scanning for chapter batches in {:?}", input_dir);

        let mut batch_files = FileManager::find_files(&input_dir, BATCH_EXTENSION)?;
        batch_files.sort();

        if batch_files.is_empty() {
            warn!("No chapter batch files found in {:?}", input_dir);
            return Ok(());
        }

        let mut processed_count = 0;
        for batch_file in &batch_files {
            let target_dir = output_dir
                .clone()
                .or_else(|| batch_file.parent().map(Path::to_path_buf))
                .unwrap_or_else(|| PathBuf::from("."));

            info!("Processing batch: {:?}", batch_file);
            if let Err(e) = self
                .run(batch_file.clone(), target_dir, force_overwrite)
                .await
            {
                error!("Error processing {:?}: {:#}", batch_file, e);
            } else {
                processed_count += 1;
            }
        }

        info!(
            "Finished processing {} of {} batch files",
            processed_count,
            batch_files.len()
        );

        Ok(())
    }

    /// Segment-only dry run: report per-chapter chunk counts without calling
    /// any engine.
    pub fn plan(&self, input_file: &Path) -> Result<()> {
        let batch = ChapterBatch::load_from_file(input_file)?;
        let plans = plan_chapters(&batch.chapters, self.config.pipeline.max_chunk_chars);

        let skipped = batch.chapters.len() - plans.len();
        let mut total_chunks = 0;
        for plan in &plans {
            info!("Chapter '{}': {} chunks", plan.title, plan.chunks.len());
            total_chunks += plan.chunks.len();
        }
        info!(
            "Plan for {:?}: {} chapters to narrate ({} skipped), {} chunks at up to {} chars",
            input_file,
            plans.len(),
            skipped,
            total_chunks,
            self.config.pipeline.max_chunk_chars
        );

        Ok(())
    }

    /// Format a duration as a compact human-readable string.
    fn format_duration(duration: std::time::Duration) -> String {
        let total_secs = duration.as_secs();
        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        let seconds = total_secs % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
