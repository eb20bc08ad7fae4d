//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{HashlearnArgs, OutputFormat};
use crate::error::Result;
use crate::pipeline::ClassificationReport;
use crate::stream::runner::StreamSummary;

/// Result structure for classifier training.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainingResult {
    pub model_path: Option<String>,
    pub duration_ms: u64,
    pub report: ClassificationReport,
}

/// The predicted category of one file.
#[derive(Debug, Serialize, Deserialize)]
pub struct FileClassification {
    pub file: String,
    pub category: String,
    pub probability: f64,
}

/// Result structure for classification.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClassificationResults {
    pub classifications: Vec<FileClassification>,
}

/// Result structure for a finished streaming run.
#[derive(Debug, Serialize, Deserialize)]
pub struct StreamResult {
    pub summary: StreamSummary,
    pub weights: Vec<f64>,
    pub intercept: f64,
    pub model_path: Option<String>,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &HashlearnArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &HashlearnArgs) -> Result<()> {
    if args.verbosity() > 0 && !message.is_empty() {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;

    match result {
        _ if std::any::type_name::<T>().contains("TrainingResult") => {
            output_training_human(&value, args)
        }
        _ if std::any::type_name::<T>().contains("ClassificationResults") => {
            output_classifications_human(&value, args)
        }
        _ if std::any::type_name::<T>().contains("BatchReport") => {
            output_batch_report_human(&value, args)
        }
        _ => output_generic_human(&value, args),
    }
}

/// Output a training report in human format.
fn output_training_human(value: &serde_json::Value, _args: &HashlearnArgs) -> Result<()> {
    let Some(report) = value.get("report").and_then(|r| r.as_object()) else {
        return output_generic_human(value, _args);
    };

    println!("Evaluation:");
    println!("═══════════");
    for key in ["train_documents", "test_documents", "num_classes"] {
        if let Some(count) = report.get(key).and_then(|c| c.as_u64()) {
            println!("{}: {count}", key.replace('_', " "));
        }
    }
    for key in [
        "accuracy",
        "weighted_precision",
        "weighted_recall",
        "weighted_f_measure",
    ] {
        if let Some(metric) = report.get(key).and_then(|m| m.as_f64()) {
            println!("{}: {metric:.4}", key.replace('_', " "));
        }
    }

    if let Some(classes) = report.get("per_class").and_then(|c| c.as_array()) {
        println!();
        println!("{:<32} {:>9} {:>9} {:>9} {:>8}", "class", "precision", "recall", "f1", "support");
        println!("{}", "─".repeat(71));
        for class in classes {
            let metric = |key: &str| class.get(key).and_then(|m| m.as_f64()).unwrap_or(0.0);
            println!(
                "{:<32} {:>9.4} {:>9.4} {:>9.4} {:>8}",
                class.get("label").and_then(|l| l.as_str()).unwrap_or("unknown"),
                metric("precision"),
                metric("recall"),
                metric("f1"),
                class.get("support").and_then(|s| s.as_u64()).unwrap_or(0)
            );
        }
    }

    println!();
    if let Some(path) = value.get("model_path").and_then(|p| p.as_str()) {
        println!("Model written to: {path}");
    }
    if let Some(duration) = value.get("duration_ms").and_then(|d| d.as_u64()) {
        println!("Training time: {duration}ms");
    }
    Ok(())
}

/// Output classifications in human format.
fn output_classifications_human(value: &serde_json::Value, _args: &HashlearnArgs) -> Result<()> {
    if let Some(items) = value.get("classifications").and_then(|c| c.as_array()) {
        for item in items {
            println!(
                "{}\t{}\t{:.4}",
                item.get("file").and_then(|f| f.as_str()).unwrap_or(""),
                item.get("category").and_then(|c| c.as_str()).unwrap_or(""),
                item.get("probability").and_then(|p| p.as_f64()).unwrap_or(0.0)
            );
        }
    }
    Ok(())
}

/// Output one streaming batch report in human format.
fn output_batch_report_human(value: &serde_json::Value, _args: &HashlearnArgs) -> Result<()> {
    let batch_id = value.get("batch_id").and_then(|b| b.as_u64()).unwrap_or(0);
    let size = value.get("size").and_then(|s| s.as_u64()).unwrap_or(0);
    let status = value.get("status").and_then(|s| s.as_str()).unwrap_or("unknown");

    let mut line = format!("batch {batch_id}: {status}, {size} records");
    if let Some(rmse) = value
        .get("prequential")
        .and_then(|p| p.get("root_mean_squared_error"))
        .and_then(|r| r.as_f64())
    {
        line.push_str(&format!(", rmse {rmse:.6}"));
    }
    if let Some(error) = value.get("error").and_then(|e| e.as_str()) {
        line.push_str(&format!(" ({error})"));
    }
    println!("{line}");
    Ok(())
}

/// Output generic data in human format.
fn output_generic_human(value: &serde_json::Value, _args: &HashlearnArgs) -> Result<()> {
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                let formatted_val = format_value(val);
                println!("{key}: {formatted_val}");
            }
        }
        _ => {
            let formatted_value = format_value(value);
            println!("{formatted_value}");
        }
    }
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &HashlearnArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Format a JSON value for display.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(obj) => {
            let formatted_values = obj
                .iter()
                .map(|(key, val)| format!("{key}={}", format_value(val)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{{formatted_values}}}")
        }
        serde_json::Value::Null => "null".to_string(),
    }
}
