//! Analyze command implementation
//!
//! Full pipeline over the configured dataset:
//! 1. Validate the subset/class folder structure
//! 2. Collect per-subset class counts
//! 3. Compute class weights
//! 4. Sample image properties
//! 5. Render the chart and write the JSON report
//! 6. Print ML recommendations and a summary

use super::check_structure_gate;
use crate::config::AuditConfig;
use crate::dataset::{
    ClassWeightCalculator, ImagePropertySampler, StatisticsCollector, StructureValidator,
};
use crate::models::{AnalysisReport, ImageProperties};
use crate::reporters::{chart, json, text::TextReporter, OutputFormat};
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{debug, error, info};

/// Options for the analyze command beyond the configuration itself
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub format: OutputFormat,
    pub no_chart: bool,
    pub fail_on_invalid: bool,
    pub no_emoji: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            no_chart: false,
            fail_on_invalid: false,
            no_emoji: false,
        }
    }
}

/// Run the analyze command.
///
/// With `--format json` the console sections are replaced by the report JSON
/// on stdout; the chart and report files are written either way.
pub fn run(config: &AuditConfig, options: &AnalyzeOptions) -> Result<()> {
    let root = config.dataset.path.as_path();
    let quiet = options.format == OutputFormat::Json;
    let reporter = TextReporter::new(config, options.no_emoji);
    let say = |section: String| {
        if !quiet {
            print!("{}", section);
        }
    };

    info!("Starting analysis of {}", root.display());
    if config.dataset.has_sampling_gap() {
        debug!(
            "Sampling extensions {:?} differ from counting extensions {:?}",
            config.dataset.sample_extensions, config.dataset.count_extensions
        );
    }
    say(reporter.header());

    // Analysis phase
    let validation = StructureValidator::new(&config.dataset, &config.thresholds)
        .validate(root)
        .inspect_err(|e| error!("Structure validation failed: {}", e))
        .context("Structure validation failed")?;
    say(reporter.validation(&validation));

    let stats = StatisticsCollector::new(&config.dataset)
        .collect(root)
        .inspect_err(|e| error!("Statistics collection failed: {}", e))
        .context("Statistics collection failed")?;
    say(reporter.statistics(&stats));

    let weights = ClassWeightCalculator::new(&config.dataset.classes).compute(&stats);
    info!("Class weights: {:?}", weights.named(&config.dataset.classes));
    say(reporter.weights(&weights));

    let props = sample_with_spinner(config, root, quiet)
        .inspect_err(|e| error!("Image sampling failed: {}", e))
        .context("Image sampling failed")?;
    say(reporter.properties(&props));

    // Visualization phase
    let chart_path = if options.no_chart {
        debug!("Chart skipped (--no-chart)");
        None
    } else {
        let path = config.output.chart_path();
        chart::render_dashboard(config, &stats, &props, &path)
            .inspect_err(|e| error!("Chart rendering failed: {:#}", e))
            .context("Chart rendering failed")?;
        Some(path)
    };

    // Report phase
    let report = AnalysisReport::new(
        &config.project,
        chrono::Local::now().to_rfc3339(),
        &stats,
        &props,
    );
    let report_path = config.output.report_path();
    json::write_report(&report, &report_path)
        .inspect_err(|e| error!("Report writing failed: {:#}", e))?;

    say(reporter.ml_recommendations(&stats, &props));
    say(reporter.summary(stats.total_dataset, chart_path.as_deref(), &report_path));

    if quiet {
        println!("{}", json::render(&report)?);
    }
    info!(
        "Analysis finished: {} images, structure {}",
        stats.total_dataset,
        if validation.structure_valid { "valid" } else { "invalid" }
    );

    check_structure_gate(options.fail_on_invalid, validation.structure_valid);
    Ok(())
}

/// Sample image properties behind a spinner (hidden in quiet mode)
pub(super) fn sample_with_spinner(
    config: &AuditConfig,
    root: &Path,
    quiet: bool,
) -> Result<ImageProperties> {
    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    spinner.set_message("Sampling image properties...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let sampler = ImagePropertySampler::new(&config.dataset, config.sampling.sample_size);
    let mut seen = 0usize;
    let props = sampler.sample_with_progress(root, |file| {
        seen += 1;
        if let Some(name) = file.file_name() {
            spinner.set_message(format!(
                "Sampling image properties... {} ({})",
                seen,
                name.to_string_lossy()
            ));
        }
    })?;

    spinner.finish_with_message(format!(
        "{}Sampled {} of {} images",
        style("✓ ").green(),
        style(props.len()).cyan(),
        seen
    ));
    info!("Image properties read for {} of {} sampled files", props.len(), seen);
    Ok(props)
}
