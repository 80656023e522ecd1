use chrono::{Duration, NaiveDate};

/// Expands sparse `(day, value)` rows into one entry per day from `start`
/// through `end` inclusive, filling gaps with `V::default()`.
pub fn fill_daily_series<V: Copy + Default>(
    start: NaiveDate,
    end: NaiveDate,
    rows: &[(NaiveDate, V)],
) -> Vec<(NaiveDate, V)> {
    let mut series = Vec::new();
    let mut day = start;
    while day <= end {
        let value = rows
            .iter()
            .find(|(d, _)| *d == day)
            .map(|(_, v)| *v)
            .unwrap_or_default();
        series.push((day, value));
        day += Duration::days(1);
    }
    series
}
