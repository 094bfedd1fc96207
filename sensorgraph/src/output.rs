use sensorgraph_core::{FieldStats, InsufficientReason, PipelineResult, RenderableSeries};

pub fn print_info(message: &str) {
    println!("[sensorgraph][INFO] {message}");
}

pub fn print_error(message: &str) {
    eprintln!("[sensorgraph][ERROR]: {message}");
}

pub fn print_json(result: &PipelineResult) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

pub fn describe_reason(reason: &InsufficientReason) -> String {
    match reason {
        InsufficientReason::NotEnoughData { found, required } => {
            format!("{reason} ({found} of {required} readings)")
        }
        InsufficientReason::FetchFailed { message } => format!("{reason}: {message}"),
        InsufficientReason::Cancelled => reason.to_string(),
    }
}

pub fn print_summary(result: &PipelineResult) {
    match result {
        PipelineResult::Ready(series) => print_series(series),
        PipelineResult::Insufficient { reason } => {
            print_info(&format!("Insufficient data: {}", describe_reason(reason)))
        }
    }
}

fn print_series(series: &RenderableSeries) {
    print_info(&format!(
        "{} reading(s) between {} and {}",
        series.reading_count, series.first_time, series.last_time
    ));
    if let Some(average) = series.average_temperature_f {
        println!("Average temperature: {average:.1} F");
    }
    println!("Statistics:");
    for (field, stats) in &series.stats {
        match stats {
            FieldStats::Empty => println!("\t{field}: no data"),
            FieldStats::Range {
                min,
                max,
                mean,
                count,
            } => println!("\t{field}: min {min:.2} max {max:.2} mean {mean:.2} ({count} values)"),
        }
    }
    println!("Series:");
    if series.series.is_empty() {
        println!("\t(none)");
    }
    for (field, points) in &series.series {
        println!("\t{field}: {} point(s)", points.len());
    }
}
