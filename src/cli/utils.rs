use serde_json::{json, Value};

use crate::adaptor::{FetchResult, ReadOutcome};
use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(target)) = (data, response.as_object_mut()) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print a grid read; text mode shows one compact JSON line per record
pub fn output_read(output_format: &OutputFormat, label: &str, outcome: ReadOutcome<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let body = match outcome {
                ReadOutcome::Busy => json!({ "success": true, "data": null, "busy": true }),
                ReadOutcome::Ready(result) => json!({ "success": true, "data": result, "degraded": false }),
                ReadOutcome::Degraded { result, error } => json!({
                    "success": true,
                    "data": result,
                    "degraded": true,
                    "error": error.to_string(),
                }),
            };
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Text => match outcome {
            ReadOutcome::Busy => println!("{}: a read is already in flight, try again", label),
            ReadOutcome::Ready(result) => print_records(label, &result),
            ReadOutcome::Degraded { result, error } => {
                eprintln!("Warning: {} read failed: {}", label, error);
                print_records(label, &result);
            }
        },
    }
    Ok(())
}

fn print_records(label: &str, result: &FetchResult<Value>) {
    match result.count() {
        Some(count) => println!("{}: {} of {} records", label, result.records().len(), count),
        None => println!("{}: {} records", label, result.records().len()),
    }
    for record in result.records() {
        println!("  {}", record);
    }
}
