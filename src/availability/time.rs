//! HAPI time strings.
//!
//! Accepted forms (restricted ISO 8601, trailing `Z` optional):
//! `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, `YYYY-DOY`, each optionally followed by
//! `Thh`, `Thh:mm`, `Thh:mm:ss` or `Thh:mm:ss.f...`.

use anyhow::{Context, anyhow, bail};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

static HAPI_TIME: LazyLock<Regex> = LazyLock::new(|| {
    // 1) year 2) day of year 3) month 4) day 5) hour 6) minute 7) second 8) fraction
    Regex::new(
        r"^(\d{4})(?:-(\d{3})|-(\d{2})(?:-(\d{2}))?)?(?:T(\d{2})(?::(\d{2})(?::(\d{2})(?:\.(\d{0,9})\d*)?)?)?)?Z?$",
    )
    .expect("static regex")
});

pub fn parse_hapi_time(s: &str) -> anyhow::Result<NaiveDateTime> {
    let s = s.trim();
    let caps = HAPI_TIME
        .captures(s)
        .ok_or_else(|| anyhow!("not a HAPI time: {:?}", s))?;

    let num = |i: usize, default: u32| -> anyhow::Result<u32> {
        match caps.get(i) {
            Some(m) => m
                .as_str()
                .parse()
                .with_context(|| format!("bad field in {:?}", s)),
            None => Ok(default),
        }
    };

    let year = num(1, 0)? as i32;
    let date = match caps.get(2) {
        Some(_) => NaiveDate::from_yo_opt(year, num(2, 1)?),
        None => NaiveDate::from_ymd_opt(year, num(3, 1)?, num(4, 1)?),
    };
    let Some(date) = date else {
        bail!("date out of range: {:?}", s);
    };

    let nanos = match caps.get(8) {
        Some(m) if !m.as_str().is_empty() => {
            let digits = m.as_str();
            digits.parse::<u32>()? * 10u32.pow(9 - digits.len() as u32)
        }
        _ => 0,
    };
    let time = NaiveTime::from_hms_nano_opt(num(5, 0)?, num(6, 0)?, num(7, 0)?, nanos)
        .ok_or_else(|| anyhow!("time out of range: {:?}", s))?;

    Ok(date.and_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").unwrap()
    }

    #[test]
    fn calendar_forms() {
        assert_eq!(parse_hapi_time("1997").unwrap(), dt("1997-01-01 00:00:00"));
        assert_eq!(parse_hapi_time("1997-09").unwrap(), dt("1997-09-01 00:00:00"));
        assert_eq!(parse_hapi_time("1997-09-02Z").unwrap(), dt("1997-09-02 00:00:00"));
        assert_eq!(
            parse_hapi_time("1997-09-02T00:00:12Z").unwrap(),
            dt("1997-09-02 00:00:12")
        );
        assert_eq!(parse_hapi_time("1997-09-02T05").unwrap(), dt("1997-09-02 05:00:00"));
    }

    #[test]
    fn day_of_year_forms() {
        assert_eq!(parse_hapi_time("2020-060").unwrap(), dt("2020-02-29 00:00:00"));
        assert_eq!(
            parse_hapi_time("2021-365T23:59Z").unwrap(),
            dt("2021-12-31 23:59:00")
        );
    }

    #[test]
    fn fractional_seconds() {
        assert_eq!(
            parse_hapi_time("2000-01-01T00:00:00.5Z").unwrap(),
            dt("2000-01-01 00:00:00.5")
        );
        assert_eq!(
            parse_hapi_time("2000-01-01T00:00:00.123456789999Z").unwrap(),
            dt("2000-01-01 00:00:00.123456789")
        );
    }

    #[test]
    fn rejects_garbage_and_out_of_range() {
        assert!(parse_hapi_time("").is_err());
        assert!(parse_hapi_time("lastday-P1D").is_err());
        assert!(parse_hapi_time("2021-366").is_err());
        assert!(parse_hapi_time("2021-13-01").is_err());
        assert!(parse_hapi_time("2021-01-01T25:00Z").is_err());
    }
}
