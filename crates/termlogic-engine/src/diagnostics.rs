//! Diagnostic dumps
//!
//! Debug aids, not part of the classification contract: write the current
//! axiom set and the symbol tables to line-oriented text files, and a
//! completed run's results to JSON, for offline inspection.

use crate::results::ClassificationResults;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use termlogic_axioms::AxiomRepository;

/// Write `axioms.txt`, `concepts.txt`, and `roles.txt` under `dir`.
pub fn dump_repository(dir: &Path, repo: &AxiomRepository) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut axioms: Vec<String> = repo
        .aggregate_axioms()
        .iter()
        .map(|axiom| axiom.render(repo.symbols()))
        .collect();
    axioms.sort_unstable();
    write_lines(&dir.join("axioms.txt"), &axioms)?;

    let mut concepts = repo.symbols().classes();
    concepts.sort_unstable();
    let concept_lines: Vec<String> = concepts
        .iter()
        .map(|(nid, sym)| {
            format!(
                "{nid}\t{}",
                repo.symbols().class_iri(*sym).unwrap_or_default()
            )
        })
        .collect();
    write_lines(&dir.join("concepts.txt"), &concept_lines)?;

    let mut roles = repo.symbols().properties();
    roles.sort_unstable();
    let role_lines: Vec<String> = roles
        .iter()
        .map(|(nid, sym)| {
            format!(
                "{nid}\t{}",
                repo.symbols().prop_iri(*sym).unwrap_or_default()
            )
        })
        .collect();
    write_lines(&dir.join("roles.txt"), &role_lines)?;

    Ok(())
}

/// Write a completed run's results as `results.json` under `dir`.
pub fn dump_results(dir: &Path, results: &ClassificationResults) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let json = serde_json::to_string_pretty(results).context("serializing results")?;
    fs::write(dir.join("results.json"), json).context("writing results.json")?;
    Ok(())
}

fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let mut body = lines.join("\n");
    body.push('\n');
    fs::write(path, body).with_context(|| format!("writing {}", path.display()))
}
