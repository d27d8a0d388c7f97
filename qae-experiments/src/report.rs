//! Markdown summary of logged results.

use std::fs;
use std::path::Path;

use qae_core::RunReport;
use rustc_hash::FxHashMap;

use crate::error::Result;

/// Renders every record plus a best-fidelity-per-method table.
pub fn generate_markdown_report(records: &[RunReport]) -> String {
    let mut report = String::new();

    report.push_str("# Quantum Autoencoder Results\n\n");
    report.push_str(&format!(
        "**Generated:** {}\n\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if records.is_empty() {
        report.push_str("_No results logged._\n");
        return report;
    }

    report.push_str("## Runs\n\n");
    report.push_str("| Method | Qubits | Latent | Fidelity | Time (s) | Status |\n");
    report.push_str("|--------|--------|--------|----------|----------|--------|\n");
    for r in records {
        let status = if r.status.is_empty() { "-" } else { r.status.as_str() };
        report.push_str(&format!(
            "| {} | {} | {} | {:.6} | {:.3} | {} |\n",
            r.method, r.qubits, r.latent, r.fidelity, r.training_time, status
        ));
    }
    report.push('\n');

    report.push_str("## Best Fidelity by Method\n\n");
    report.push_str("| Method | Runs | Best Fidelity | Qubits |\n");
    report.push_str("|--------|------|---------------|--------|\n");
    for (method, runs, best) in best_by_method(records) {
        report.push_str(&format!(
            "| {} | {} | {:.6} | {} |\n",
            method, runs, best.fidelity, best.qubits
        ));
    }

    report
}

/// `(method, run count, best record)` sorted by method name.
fn best_by_method(records: &[RunReport]) -> Vec<(&str, usize, &RunReport)> {
    let mut groups: FxHashMap<&str, (usize, &RunReport)> = FxHashMap::default();
    for r in records {
        let entry = groups.entry(r.method.as_str()).or_insert((0, r));
        entry.0 += 1;
        if r.fidelity > entry.1.fidelity {
            entry.1 = r;
        }
    }
    let mut rows: Vec<_> = groups
        .into_iter()
        .map(|(method, (runs, best))| (method, runs, best))
        .collect();
    rows.sort_by(|a, b| a.0.cmp(b.0));
    rows
}

pub fn save_markdown_report(records: &[RunReport], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, generate_markdown_report(records))?;
    Ok(())
}
