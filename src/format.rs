use crate::system::snapshot::SystemSnapshot;

pub fn format_temperature(celsius: Option<f64>) -> String {
    match celsius {
        Some(c) => format!("{c:.1}°C"),
        None => "--".to_string(),
    }
}

pub fn format_gb(gb: f64) -> String {
    format!("{gb:.2} GB")
}

/// One-line human summary of a snapshot.
pub fn summary_line(snapshot: &SystemSnapshot) -> String {
    if snapshot.is_empty() {
        return "no snapshot collected yet".to_string();
    }

    let cores = snapshot
        .cpu_utilization
        .cores()
        .iter()
        .map(|pct| format!("{pct:.1}"))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "#{seq} cpu avg {avg:.1}% [{cores}] mem {used}/{total} ({free} free) core {core} ambient {ambient}",
        seq = snapshot.sequence,
        avg = snapshot.cpu_utilization.average(),
        used = format_gb(snapshot.memory.used_gb),
        total = format_gb(snapshot.memory.total_gb),
        free = format_gb(snapshot.memory.free_gb),
        core = format_temperature(snapshot.core_temperature_c),
        ambient = format_temperature(snapshot.ambient_temperature_c),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperatures_render_one_decimal() {
        assert_eq!(format_temperature(Some(45.0)), "45.0°C");
        assert_eq!(format_temperature(Some(-3.24)), "-3.2°C");
        assert_eq!(format_temperature(None), "--");
    }

    #[test]
    fn empty_snapshot_has_placeholder() {
        assert_eq!(
            summary_line(&SystemSnapshot::default()),
            "no snapshot collected yet"
        );
    }
}
