use chrono::NaiveDate;

/// Trailing rolling mean with a minimum of one observation.
///
/// Position `i` averages the non-missing values in `i + 1 - window ..= i`
/// (clipped at the start of the series), so the first `window - 1` outputs
/// use however many points exist. A span with no values yields `None`.
/// The output is aligned with the input. A `window` of 0 behaves as 1.
pub fn rolling_mean(
    series: &[(NaiveDate, Option<f64>)],
    window: usize,
) -> Vec<(NaiveDate, Option<f64>)> {
    let window = window.max(1);

    series
        .iter()
        .enumerate()
        .map(|(i, (date, _))| {
            let start = (i + 1).saturating_sub(window);
            let (sum, count) = series[start..=i]
                .iter()
                .filter_map(|(_, v)| *v)
                .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
            let mean = (count > 0).then(|| sum / count as f64);
            (*date, mean)
        })
        .collect()
}
