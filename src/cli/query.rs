//! Single-step commands: validate, stats, weights, sample

use super::{analyze::sample_with_spinner, check_structure_gate};
use crate::config::AuditConfig;
use crate::dataset::{ClassWeightCalculator, StatisticsCollector, StructureValidator};
use crate::reporters::{json, text::TextReporter};
use anyhow::{Context, Result};
use indexmap::IndexMap;

pub fn validate(config: &AuditConfig, as_json: bool, fail_on_invalid: bool, no_emoji: bool) -> Result<()> {
    let result = StructureValidator::new(&config.dataset, &config.thresholds)
        .validate(&config.dataset.path)
        .context("Structure validation failed")?;

    if as_json {
        println!("{}", json::render(&result)?);
    } else {
        print!("{}", TextReporter::new(config, no_emoji).validation(&result));
    }

    check_structure_gate(fail_on_invalid, result.structure_valid);
    Ok(())
}

pub fn stats(config: &AuditConfig, as_json: bool, no_emoji: bool) -> Result<()> {
    let stats = StatisticsCollector::new(&config.dataset)
        .collect(&config.dataset.path)
        .context("Statistics collection failed")?;

    if as_json {
        println!("{}", json::render(&stats)?);
    } else {
        print!("{}", TextReporter::new(config, no_emoji).statistics(&stats));
    }
    Ok(())
}

/// JSON output is keyed by class name, in configured class order
pub fn weights(config: &AuditConfig, as_json: bool, no_emoji: bool) -> Result<()> {
    let classes = &config.dataset.classes;
    let stats = StatisticsCollector::new(&config.dataset)
        .collect(&config.dataset.path)
        .context("Statistics collection failed")?;
    let weights = ClassWeightCalculator::new(classes).compute(&stats);

    if as_json {
        let named: IndexMap<&str, f64> = weights.named(classes).into_iter().collect();
        println!("{}", json::render(&named)?);
    } else {
        print!("{}", TextReporter::new(config, no_emoji).weights(&weights));
    }
    Ok(())
}

pub fn sample(config: &AuditConfig, as_json: bool, no_emoji: bool) -> Result<()> {
    let props = sample_with_spinner(config, &config.dataset.path, as_json)
        .context("Image sampling failed")?;

    if as_json {
        println!("{}", json::render(&props.summary())?);
    } else {
        print!("{}", TextReporter::new(config, no_emoji).properties(&props));
    }
    Ok(())
}
