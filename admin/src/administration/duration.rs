//! ISO-8601 durations as the management API writes them (`PT1M`,
//! `P14DT12H30M5.5S`).
//!
//! The service represents "never" with the largest .NET `TimeSpan`,
//! `P10675199DT2H48M5.4775807S`; it maps to [`MAX_DURATION`] in both
//! directions.

use super::errors::{AdministrationError, AdministrationResult};
use serde::Serializer;
use std::time::Duration;

/// `TimeSpan.MaxValue`, the service's sentinel for an unbounded duration.
pub const MAX_DURATION: Duration = Duration::new(922_337_203_685, 477_580_700);

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3_600;
const SECONDS_PER_DAY: u64 = 86_400;

pub fn format_duration(duration: Duration) -> String {
    if duration >= MAX_DURATION {
        return "P10675199DT2H48M5.4775807S".to_string();
    }

    let total = duration.as_secs();
    let days = total / SECONDS_PER_DAY;
    let hours = (total % SECONDS_PER_DAY) / SECONDS_PER_HOUR;
    let minutes = (total % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let seconds = total % SECONDS_PER_MINUTE;
    let nanos = duration.subsec_nanos();

    let mut out = String::from("P");
    if days > 0 {
        out.push_str(&format!("{days}D"));
    }

    let has_time = hours > 0 || minutes > 0 || seconds > 0 || nanos > 0;
    if has_time || days == 0 {
        out.push('T');
    }
    if hours > 0 {
        out.push_str(&format!("{hours}H"));
    }
    if minutes > 0 {
        out.push_str(&format!("{minutes}M"));
    }
    if nanos > 0 {
        let fraction = format!("{nanos:09}");
        out.push_str(&format!("{seconds}.{}S", fraction.trim_end_matches('0')));
    } else if seconds > 0 || (!has_time && days == 0) {
        out.push_str(&format!("{seconds}S"));
    }
    out
}

pub fn parse_duration(value: &str) -> AdministrationResult<Duration> {
    let invalid = || AdministrationError::malformed(format!("invalid ISO-8601 duration '{value}'"));

    let rest = value.trim().strip_prefix('P').ok_or_else(invalid)?;
    if rest.is_empty() {
        return Err(invalid());
    }

    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };

    let mut seconds: u64 = 0;
    let mut nanos: u32 = 0;

    for (amount, unit) in components(date_part).ok_or_else(invalid)? {
        let amount: u64 = amount.parse().map_err(|_| invalid())?;
        let factor = match unit {
            'W' => 7 * SECONDS_PER_DAY,
            'D' => SECONDS_PER_DAY,
            _ => return Err(invalid()),
        };
        seconds = amount
            .checked_mul(factor)
            .and_then(|s| seconds.checked_add(s))
            .ok_or_else(invalid)?;
    }

    if let Some(time_part) = time_part {
        if time_part.is_empty() {
            return Err(invalid());
        }
        for (amount, unit) in components(time_part).ok_or_else(invalid)? {
            match unit {
                'H' | 'M' => {
                    let amount: u64 = amount.parse().map_err(|_| invalid())?;
                    let factor = if unit == 'H' {
                        SECONDS_PER_HOUR
                    } else {
                        SECONDS_PER_MINUTE
                    };
                    seconds = amount
                        .checked_mul(factor)
                        .and_then(|s| seconds.checked_add(s))
                        .ok_or_else(invalid)?;
                }
                'S' => {
                    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
                    let whole: u64 = whole.parse().map_err(|_| invalid())?;
                    seconds = seconds.checked_add(whole).ok_or_else(invalid)?;
                    if !fraction.is_empty() {
                        if !fraction.chars().all(|c| c.is_ascii_digit()) {
                            return Err(invalid());
                        }
                        let digits: String = fraction.chars().take(9).collect();
                        nanos = format!("{digits:0<9}").parse().map_err(|_| invalid())?;
                    }
                }
                _ => return Err(invalid()),
            }
        }
    }

    Ok(Duration::new(seconds, nanos).min(MAX_DURATION))
}

/// Split `12D3H` style segments into `(amount, unit)` pairs.
fn components(segment: &str) -> Option<Vec<(&str, char)>> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (idx, ch) in segment.char_indices() {
        if ch.is_ascii_alphabetic() {
            let amount = &segment[start..idx];
            if amount.is_empty() {
                return None;
            }
            parts.push((amount, ch));
            start = idx + ch.len_utf8();
        }
    }
    if start != segment.len() {
        return None;
    }
    Some(parts)
}

/// `serialize_with` helper so models print durations the way the wire does.
pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_duration(*duration))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_common_values() {
        assert_eq!(format_duration(Duration::from_secs(60)), "PT1M");
        assert_eq!(format_duration(Duration::from_secs(30)), "PT30S");
        assert_eq!(format_duration(Duration::from_secs(600)), "PT10M");
        assert_eq!(format_duration(Duration::from_secs(14 * 86_400)), "P14D");
        assert_eq!(format_duration(Duration::ZERO), "PT0S");
        assert_eq!(
            format_duration(Duration::from_millis(90_061_500)),
            "P1DT1H1M1.5S"
        );
    }

    #[test]
    fn infinite_sentinel_round_trips() {
        let parsed = parse_duration("P10675199DT2H48M5.4775807S").unwrap();
        assert_eq!(parsed, MAX_DURATION);
        assert_eq!(format_duration(parsed), "P10675199DT2H48M5.4775807S");
        assert_eq!(
            format_duration(Duration::from_secs(u64::MAX)),
            "P10675199DT2H48M5.4775807S"
        );
    }

    #[test]
    fn parses_service_values() {
        assert_eq!(parse_duration("PT1M").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_duration("PT0.5S").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("P1W").unwrap(), Duration::from_secs(604_800));
        assert_eq!(
            parse_duration("P2DT3H").unwrap(),
            Duration::from_secs(2 * 86_400 + 3 * 3_600)
        );
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "P", "PT", "1M", "PTM", "P1Y", "PT1.xS", "PT5"] {
            assert!(parse_duration(bad).is_err(), "{bad} should not parse");
        }
    }
}
