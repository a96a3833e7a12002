use anyhow::{Context, Result, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::providers::Provider;
use crate::providers::openai::OpenAI;
use crate::subtitle_processor::{SubtitleCollection, SubtitleEntry};
use crate::translation::{
    BatchTranslator, ModelSettings, Retrier, TranslationModel, TranslationPromptBuilder, TranslationRun,
};

// @module: Application controller for subtitle processing

// @const: File collecting per-run issues next to the outputs
const ISSUES_LOG_FILE: &str = "srtwai.issues.log";

/// Counts reported after processing a folder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller for subtitle translation
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Chat completion client shared by every file
    provider: Arc<dyn Provider>,

    // @field: Whether to draw progress bars
    show_progress: bool,
}

impl Controller {
    // @method: Create a controller talking to the configured OpenAI-compatible endpoint
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;

        let provider = OpenAI::new(
            config.translation.api_key.clone(),
            config.translation.endpoint.clone(),
            config.translation.request_timeout(),
        );
        Ok(Self::with_provider(config, Arc::new(provider)))
    }

    // @method: Create a controller around any provider
    pub fn with_provider(config: Config, provider: Arc<dyn Provider>) -> Self {
        Self {
            config,
            provider,
            show_progress: true,
        }
    }

    /// Disable progress bars (tests, non-interactive runs)
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check that the provider accepts our credentials
    pub async fn test_connection(&self) -> Result<()> {
        let model = &self.config.translation.model;
        self.provider
            .test_connection(model)
            .await
            .with_context(|| format!("Failed to connect to {}", self.config.translation.endpoint))?;
        info!("Connected to {} with model {}", self.config.translation.endpoint, model);
        Ok(())
    }

    /// Build a translator with a fresh model session
    fn build_translator(&self) -> Result<BatchTranslator> {
        let translation = &self.config.translation;
        let source_name = language_utils::get_language_name(&self.config.source_language)?;
        let target_name = language_utils::get_language_name(&self.config.target_language)?;

        let prompts = TranslationPromptBuilder::new(&source_name, &target_name)
            .with_mode(translation.mode)
            .with_domains(&translation.domains);
        if !translation.domains.is_empty() {
            info!("Specialist domains: {}", translation.domains.join(", "));
        }

        let settings = ModelSettings {
            model: translation.model.clone(),
            temperature: translation.temperature,
            system_prompt: prompts.build_system_prompt(),
            request_timeout: Some(translation.request_timeout()),
        };
        let model = TranslationModel::new(
            Arc::clone(&self.provider),
            settings,
            translation.max_workers,
            Retrier::new(translation.retry_policy()),
        );

        Ok(BatchTranslator::new(Arc::new(model), prompts, translation.mode, translation.batch_size)
            .with_await_timeout(translation.await_timeout()))
    }

    /// Translate parsed entries, reporting progress on `multi_progress`
    pub async fn translate_entries(
        &self,
        entries: &[SubtitleEntry],
        multi_progress: &MultiProgress,
    ) -> Result<TranslationRun> {
        let translator = self.build_translator()?;

        let progress_bar = if self.show_progress {
            multi_progress.add(ProgressBar::new(0))
        } else {
            ProgressBar::hidden()
        };
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} requests ({percent}%) {msg} {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");

        let run = translator
            .translate(entries, |done, total| {
                progress_bar.set_length(total as u64);
                progress_bar.set_position(done as u64);
            })
            .await;

        progress_bar.finish_with_message("Translation complete");
        Ok(run)
    }

    /// Translate one subtitle file into `output_dir`.
    ///
    /// Returns the written path, or `None` when the output already existed and
    /// `force_overwrite` is off.
    pub async fn translate_file(
        &self,
        input_file: &Path,
        output_dir: &Path,
        force_overwrite: bool,
        multi_progress: &MultiProgress,
    ) -> Result<Option<PathBuf>> {
        if !FileManager::is_subtitle_file(input_file)? {
            return Err(anyhow!("Not an SRT subtitle file: {}", input_file.display()));
        }

        let output_path = FileManager::generate_output_path(input_file, output_dir, &self.config.target_language);
        if output_path.exists() && !force_overwrite {
            warn!(
                "Skipping {}, translation already exists (use -f to force overwrite)",
                input_file.display()
            );
            return Ok(None);
        }

        let subtitles = SubtitleCollection::from_file(input_file)?;
        if subtitles.entries.is_empty() {
            warn!("No subtitle entries found in {}", input_file.display());
        }

        let run = self.translate_entries(&subtitles.entries, multi_progress).await?;
        subtitles.write_translated(&run.results, &output_path)?;

        info!(
            "Translated {}/{} lines of {} in {} requests, {}",
            run.translated_count(),
            run.results.len(),
            input_file.display(),
            run.batch_count,
            Self::format_duration(run.elapsed)
        );
        info!("{}", run.usage.summary());

        if !run.fallback_lines.is_empty() {
            self.record_issues(output_dir, input_file, &run);
        }

        Ok(Some(output_path))
    }

    /// Run the main workflow on a subtitle file or a folder of subtitle files
    pub async fn run(&self, input_path: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<()> {
        if input_path.is_dir() {
            let summary = self.run_folder(&input_path, &output_dir, force_overwrite).await?;
            if summary.failed > 0 {
                return Err(anyhow!("{} file(s) failed to translate", summary.failed));
            }
            return Ok(());
        }

        if !input_path.exists() {
            return Err(anyhow!("Input file does not exist: {:?}", input_path));
        }

        let start_time = Instant::now();
        let multi_progress = MultiProgress::new();
        if let Some(path) = self
            .translate_file(&input_path, &output_dir, force_overwrite, &multi_progress)
            .await?
        {
            info!(
                "Wrote {} in {}",
                path.display(),
                Self::format_duration(start_time.elapsed())
            );
        }
        Ok(())
    }

    /// Translate every `.srt` file below `input_dir`, one file at a time
    pub async fn run_folder(&self, input_dir: &Path, output_dir: &Path, force_overwrite: bool) -> Result<FolderSummary> {
        let start_time = Instant::now();
        if !input_dir.is_dir() {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let output_dir_abs = output_dir.canonicalize().ok();
        let subtitle_files: Vec<PathBuf> = FileManager::find_files(input_dir, "srt")?
            .into_iter()
            .filter(|file| {
                // Files already in the output folder are previous outputs
                output_dir_abs.is_none() || file.parent().and_then(|p| p.canonicalize().ok()) != output_dir_abs
            })
            .collect();
        if subtitle_files.is_empty() {
            return Err(anyhow!("No subtitle files found in directory: {:?}", input_dir));
        }
        info!("Found {} subtitle files in {}", subtitle_files.len(), input_dir.display());

        let multi_progress = MultiProgress::new();
        let folder_pb = if self.show_progress {
            multi_progress.add(ProgressBar::new(subtitle_files.len() as u64))
        } else {
            ProgressBar::hidden()
        };
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(style.progress_chars("█▓▒░"));

        let mut summary = FolderSummary::default();
        for file in &subtitle_files {
            let file_name = file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            match self.translate_file(file, output_dir, force_overwrite, &multi_progress).await {
                Ok(Some(_)) => summary.processed += 1,
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    summary.failed += 1;
                }
            }
            folder_pb.inc(1);
        }
        folder_pb.finish_with_message("Folder processing complete");

        let message = format!(
            "Folder processing completed: {} processed, {} skipped, {} errors - Duration: {}",
            summary.processed,
            summary.skipped,
            summary.failed,
            Self::format_duration(start_time.elapsed())
        );
        info!("{}", message);
        self.append_issue(output_dir, &message);

        Ok(summary)
    }

    fn record_issues(&self, output_dir: &Path, input_file: &Path, run: &TranslationRun) {
        let numbers: Vec<String> = run.fallback_lines.iter().map(usize::to_string).collect();
        let message = format!(
            "{}: {} line(s) kept the original text: {}",
            input_file.display(),
            run.fallback_lines.len(),
            numbers.join(", ")
        );
        self.append_issue(output_dir, &message);
    }

    fn append_issue(&self, output_dir: &Path, message: &str) {
        let path = output_dir.join(ISSUES_LOG_FILE);
        let line = format!("[{}] {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"), message);
        match FileManager::ensure_dir(output_dir).and_then(|_| FileManager::append_line(&path, &line)) {
            Ok(()) => debug!("Recorded issue in {}", path.display()),
            Err(e) => warn!("Failed to write issues log: {:#}", e),
        }
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
