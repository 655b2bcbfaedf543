//! Terminal output formatting with colors.

use colored::Colorize;

use crate::result::{PredictionSource, RunReport};

/// Format a run report for human-readable terminal output.
pub fn format_report(report: &RunReport) -> String {
    let mut output = String::new();
    let sep = "\u{2500}".repeat(62);

    output.push_str("motion-oracle\n");
    output.push_str(&sep);
    output.push('\n');
    output.push('\n');

    output.push_str(&format!(
        "  Training: {} windows, {} pooled samples\n",
        report.metadata.train_windows, report.metadata.train_samples
    ));
    output.push_str(&format!(
        "  Test:     {} windows\n",
        report.metadata.test_windows
    ));
    output.push_str(&format!(
        "  Pipeline: {} features -> {} components ({})\n",
        report.metadata.feature_width, report.metadata.n_components, report.metadata.decomposer
    ));
    if report.metadata.dropped_samples > 0 || report.metadata.repaired_samples > 0 {
        output.push_str(&format!(
            "  Cleaning: {} dropped, {} repaired\n",
            report.metadata.dropped_samples, report.metadata.repaired_samples
        ));
    }
    output.push('\n');

    output.push_str(&format!(
        "  {}\n",
        format!(
            "Training accuracy: {:.1}% (alpha = {})",
            report.train_accuracy * 100.0,
            report.chosen_alpha
        )
        .bold()
    ));

    if let Some(cv) = &report.cross_validation {
        output.push_str(&format!(
            "  Cross-validation: {} mean over {} folds\n",
            format_accuracy(cv.mean_accuracy),
            cv.fold_accuracies.len()
        ));
        for (fold, accuracy) in cv.fold_accuracies.iter().enumerate() {
            output.push_str(&format!(
                "    fold {}: {}\n",
                fold,
                format_accuracy(*accuracy)
            ));
        }
    }
    output.push('\n');

    let fallbacks = report
        .predictions
        .iter()
        .filter(|p| p.source == PredictionSource::EmptyWindowFallback)
        .count();
    if fallbacks > 0 {
        output.push_str(&format!(
            "  {}\n\n",
            format!(
                "\u{26A0} {} empty window(s) fell back to the uniform distribution",
                fallbacks
            )
            .yellow()
        ));
    }

    output.push_str(&sep);
    output.push('\n');
    output.push_str(&format!(
        "{} predictions ready; top subjects: {}\n",
        report.predictions.len(),
        summarize_top_subjects(report)
    ));

    output
}

/// Color an accuracy by how far above chance it lands.
fn format_accuracy(accuracy: f64) -> String {
    let text = format!("{:.1}%", accuracy * 100.0);
    if accuracy >= 0.8 {
        text.green().to_string()
    } else if accuracy >= 0.5 {
        text.yellow().to_string()
    } else {
        text.red().to_string()
    }
}

/// Short preview of the first few top subjects.
fn summarize_top_subjects(report: &RunReport) -> String {
    let mut parts: Vec<String> = report
        .predictions
        .iter()
        .take(8)
        .map(|p| p.top_subject().to_string())
        .collect();
    if report.predictions.len() > 8 {
        parts.push("...".to_string());
    }
    parts.join(", ")
}
