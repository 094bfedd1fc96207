use reading::SensorReading;

/// Flattens per-source batches into one sequence ordered by `time`.
///
/// The sort is stable: readings sharing a timestamp keep the order they had
/// across the input batches. Duplicate timestamps are independent samples and
/// are all kept.
pub fn aggregate(batches: Vec<Vec<SensorReading>>) -> Vec<SensorReading> {
    let total = batches.iter().map(Vec::len).sum();
    let mut merged = Vec::with_capacity(total);
    for batch in batches {
        merged.extend(batch);
    }
    merged.sort_by_key(|reading| reading.time);
    merged
}
