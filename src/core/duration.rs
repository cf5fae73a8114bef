use chrono::NaiveTime;

const SECONDS_PER_DAY: u64 = 86_400;

/// Formats a number of elapsed seconds as `"HHh, MMm, SSs"`.
///
/// The value is read as a time of day, so the hour field wraps
/// modulo 24 for inputs of one day or more.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
#[tracing::instrument(level = "trace")]
pub fn format_duration(total_seconds: u64) -> String {
    let seconds_of_day = (total_seconds % SECONDS_PER_DAY) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds_of_day, 0)
        .unwrap_or(NaiveTime::MIN)
        .format("%Hh, %Mm, %Ss")
        .to_string()
}
