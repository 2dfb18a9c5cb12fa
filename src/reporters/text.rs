//! Text (terminal) reporter with colors and formatting
//!
//! Each method renders one console section and returns it as a string;
//! the caller decides when to print.

use crate::config::AuditConfig;
use crate::models::{ClassWeights, DatasetStatistics, ImageProperties, ValidationResult};
use console::style;
use std::fmt::Write as _;
use std::path::Path;

const RULE_WIDTH: usize = 80;

pub struct TextReporter<'a> {
    config: &'a AuditConfig,
    no_emoji: bool,
}

impl<'a> TextReporter<'a> {
    pub fn new(config: &'a AuditConfig, no_emoji: bool) -> Self {
        Self { config, no_emoji }
    }

    /// Emoji prefix, or the plain fallback with `--no-emoji`
    fn icon(&self, emoji: &'static str, plain: &'static str) -> &'static str {
        if self.no_emoji {
            plain
        } else {
            emoji
        }
    }

    fn section(&self, out: &mut String, icon: &str, title: &str) {
        let _ = writeln!(out, "\n{}{}", icon, style(title).bold());
        let _ = writeln!(out, "{}", style("-".repeat(60)).dim());
    }

    pub fn header(&self) -> String {
        let p = &self.config.project;
        let rule = "=".repeat(RULE_WIDTH);
        let mut out = String::new();
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "  {}", style(&p.name).bold());
        let _ = writeln!(out, "{}", rule);
        if let Some(author) = &p.author {
            let _ = writeln!(out, "Author: {}", author);
        }
        if let Some(email) = &p.email {
            let _ = writeln!(out, "Email: {}", email);
        }
        if let Some(location) = &p.location {
            let _ = writeln!(out, "Location: {}", location);
        }
        let _ = writeln!(out, "Version: {}", p.version);
        if let Some(description) = &p.description {
            let _ = writeln!(out, "Description: {}", description);
        }
        let _ = writeln!(out, "{}", rule);
        out
    }

    pub fn validation(&self, result: &ValidationResult) -> String {
        let mut out = String::new();
        self.section(&mut out, self.icon("🔍 ", ""), "DATASET STRUCTURE VALIDATION");

        if result.structure_valid {
            let _ = writeln!(
                out,
                "{}{}",
                self.icon("✅ ", "[OK] "),
                style("Dataset structure is valid").green()
            );
        } else {
            let _ = writeln!(
                out,
                "{}{}",
                self.icon("❌ ", "[!!] "),
                style("Problems found in the dataset structure:").red()
            );
            for issue in &result.issues {
                let _ = writeln!(out, "  - {}", issue);
            }
        }

        if !result.warnings.is_empty() {
            let _ = writeln!(out, "\n{}{}", self.icon("⚠️ ", "[WARN] "), style("Warnings:").yellow());
            for warning in &result.warnings {
                let _ = writeln!(out, "  - {}", warning);
            }
        }

        if !result.recommendations.is_empty() {
            let _ = writeln!(out, "\n{}{}", self.icon("💡 ", "[TIP] "), style("Recommendations:").cyan());
            for rec in &result.recommendations {
                let _ = writeln!(out, "  - {}", rec);
            }
        }
        out
    }

    pub fn statistics(&self, stats: &DatasetStatistics) -> String {
        let mut out = String::new();
        self.section(&mut out, self.icon("📊 ", ""), "DATASET STATISTICS");

        for (subset, s) in stats.present_subsets() {
            let _ = writeln!(
                out,
                "\n{}Subset {}:",
                self.icon("📁 ", ""),
                style(subset.to_uppercase()).bold()
            );
            for class_name in &self.config.dataset.classes {
                let _ = writeln!(
                    out,
                    "  {}: {} images ({:.1}%)",
                    class_name,
                    thousands(s.count(class_name)),
                    s.percentage(class_name)
                );
            }
            let _ = writeln!(out, "  Total: {} images", thousands(s.total));
        }
        for subset in stats.absent_subsets() {
            let _ = writeln!(out, "\n  {} {}", style(subset.to_uppercase()).dim(), style("(missing)").dim());
        }

        let _ = writeln!(
            out,
            "\n{}Total dataset: {} images",
            self.icon("📈 ", ""),
            style(thousands(stats.total_dataset)).cyan()
        );
        out
    }

    pub fn weights(&self, weights: &ClassWeights) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\n{}Computed class weights:", self.icon("⚖️ ", ""));
        for (name, weight) in weights.named(&self.config.dataset.classes) {
            let _ = writeln!(out, "  {}: {:.3}", name, weight);
        }
        out
    }

    pub fn properties(&self, props: &ImageProperties) -> String {
        let mut out = String::new();
        self.section(&mut out, self.icon("🖼️ ", ""), "IMAGE PROPERTIES");

        let Some(d) = props.dimension_stats() else {
            let _ = writeln!(out, "No images could be sampled.");
            return out;
        };
        let summary = props.summary();

        let _ = writeln!(out, "Images analyzed: {}", thousands(summary.total_analyzed));
        let _ = writeln!(
            out,
            "Mean width: {:.0} px (min: {:.0}, max: {:.0})",
            d.width.mean, d.width.min, d.width.max
        );
        let _ = writeln!(
            out,
            "Mean height: {:.0} px (min: {:.0}, max: {:.0})",
            d.height.mean, d.height.min, d.height.max
        );
        let _ = writeln!(
            out,
            "Mean aspect ratio (W/H): {:.2} (std: {:.2})",
            d.aspect_mean, d.aspect_std
        );
        let _ = writeln!(
            out,
            "Mean size: {:.2} MB (min: {:.2}, max: {:.2})",
            d.size_mb.mean, d.size_mb.min, d.size_mb.max
        );
        let _ = writeln!(out, "Formats detected: {}", summary.unique_formats.join(", "));
        let _ = writeln!(out, "Color modes: {}", summary.unique_color_modes.join(", "));
        out
    }

    /// Advice for model training derived from the statistics and sample
    pub fn ml_recommendations(&self, stats: &DatasetStatistics, props: &ImageProperties) -> String {
        let cfg = self.config;
        let classes = &cfg.dataset.classes;
        let mut out = String::new();
        let rule = "=".repeat(RULE_WIDTH);
        let _ = writeln!(out, "\n{}", rule);
        let _ = writeln!(out, "{}", style("MACHINE LEARNING RECOMMENDATIONS").bold());
        let _ = writeln!(out, "{}", rule);

        if let Some((majority, minority, ratio)) = stats.overall_imbalance(classes) {
            let _ = writeln!(out, "\n{}{}", self.icon("🚨 ", "[!!] "), style("CLASS IMBALANCE").red().bold());
            let _ = writeln!(out, "   Ratio {}:{} = {:.2}:1", majority, minority, ratio);
            let _ = writeln!(out, "   Impact: high risk of bias toward the majority class");
            let weights = crate::dataset::ClassWeightCalculator::new(classes).compute(stats);
            let suggested: Vec<String> = weights
                .named(classes)
                .iter()
                .enumerate()
                .map(|(i, (_, w))| format!("{}: {:.2}", i, w))
                .collect();
            let _ = writeln!(out, "\n{}Suggested remedies:", self.icon("🔧 ", ""));
            let _ = writeln!(out, "   1. Class weighting: class_weight={{{}}}", suggested.join(", "));
            let _ = writeln!(out, "   2. Oversampling (e.g. SMOTE) of the {} class", minority);
            let _ = writeln!(out, "   3. Targeted data augmentation on {}", minority);
            let _ = writeln!(out, "   4. Careful undersampling of {}", majority);
            let _ = writeln!(out, "   5. Focal loss to handle the imbalance");
        }

        let _ = writeln!(out, "\n{}DATASET SIZE", self.icon("📊 ", ""));
        let _ = writeln!(out, "   Total: {} images", thousands(stats.total_dataset));
        if let Some(val) = stats.subset(&cfg.dataset.validation_subset) {
            if val.total < cfg.thresholds.min_validation_images {
                let _ = writeln!(
                    out,
                    "   {}Very small validation set: {} images",
                    self.icon("⚠️ ", "[WARN] "),
                    val.total
                );
                let _ = writeln!(out, "   Recommendation: redistribute as 70% train, 20% test, 10% val");
            }
        }

        if let Some(d) = props.dimension_stats() {
            let (w, h) = cfg.preprocessing.image_size;
            let _ = writeln!(out, "\n{}IMAGE PREPARATION", self.icon("🖼️ ", ""));
            let _ = writeln!(
                out,
                "   Current dimensions: {:.0}x{:.0} to {:.0}x{:.0}",
                d.width.min, d.height.min, d.width.max, d.height.max
            );
            let _ = writeln!(out, "   Recommendation: resize to {}x{}", w, h);
            let _ = writeln!(out, "   Normalization: divide by 255.0 or z-score standardization");
        }

        let _ = writeln!(out, "\n{}RECOMMENDED MODEL ARCHITECTURE", self.icon("🏗️ ", ""));
        let _ = writeln!(out, "   1. Transfer learning from ResNet50 or EfficientNet");
        let _ = writeln!(out, "   2. Progressive fine-tuning (gradual unfreezing)");
        let _ = writeln!(out, "   3. Dropout (0.3-0.5) against overfitting");
        let _ = writeln!(out, "   4. Batch normalization after each convolutional layer");
        let _ = writeln!(out, "   5. Learning rate scheduling (reduce on plateau)");

        let _ = writeln!(out, "\n{}CRITICAL EVALUATION METRICS", self.icon("📈 ", ""));
        let _ = writeln!(out, "   Primary: sensitivity (recall) > 90% on the positive class");
        let _ = writeln!(out, "   Secondary: specificity > 80%, F1-score > 85%");
        let _ = writeln!(out, "   Global: ROC-AUC > 0.95, balanced precision");
        let _ = writeln!(out, "   Avoid: plain accuracy (biased by the imbalance)");

        let aug = &cfg.augmentation;
        let target = stats
            .overall_imbalance(classes)
            .map(|(_, minority, _)| minority.to_string())
            .unwrap_or_else(|| "all classes".to_string());
        let _ = writeln!(out, "\n{}DATA AUGMENTATION STRATEGY", self.icon("🔄 ", ""));
        let _ = writeln!(out, "   For {}:", target);
        let _ = writeln!(out, "   - Rotation: ±{}°", aug.rotation_range);
        let _ = writeln!(
            out,
            "   - Translation: ±{}% x ±{}%",
            aug.width_shift_range * 100.0,
            aug.height_shift_range * 100.0
        );
        let _ = writeln!(out, "   - Zoom: ±{}%", aug.zoom_range * 100.0);
        let _ = writeln!(out, "   - Horizontal flip: {}", aug.horizontal_flip);
        let _ = writeln!(out, "   - Contrast and brightness adjustments");
        out
    }

    pub fn summary(&self, total_images: usize, chart: Option<&Path>, report: &Path) -> String {
        let mut out = String::new();
        let rule = "=".repeat(RULE_WIDTH);
        let ok = self.icon("✅ ", "[OK] ");
        let _ = writeln!(out, "\n{}", rule);
        let _ = writeln!(out, "{}", style("ANALYSIS SUMMARY").bold());
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "{}Dataset analyzed: {} images", ok, thousands(total_images));
        if let Some(chart) = chart {
            let _ = writeln!(out, "{}Charts generated: {}", ok, chart.display());
        }
        let _ = writeln!(out, "{}JSON report saved: {}", ok, report.display());
        let _ = writeln!(
            out,
            "{}Detailed logs available in: {}",
            ok,
            self.config.output.logs_dir.display()
        );
        out
    }
}

/// 1234567 -> "1,234,567"
pub fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
