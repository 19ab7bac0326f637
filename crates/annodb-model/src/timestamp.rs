//! Tick-based time stamps.
//!
//! A time stamp is a tick count at a given tick rate (ticks per second). Two
//! time stamps are only comparable when their tick rates agree; the ordered
//! comparisons report a `TickRate` error otherwise.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SystemError};

/// Smallest legal tick rate.
pub const MIN_TPS: u32 = 1;
/// Largest legal tick rate.
pub const MAX_TPS: u32 = 1000;
/// Tick rate used when nothing else is configured.
pub const DEFAULT_TPS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeStamp {
    tps: u32,
    ticks: i64,
}

fn check_tps(context: &'static str, tps: u32) -> Result<()> {
    if (MIN_TPS..=MAX_TPS).contains(&tps) {
        Ok(())
    } else {
        Err(SystemError::tick_rate(
            context,
            format!("tps {tps} out of range [{MIN_TPS}, {MAX_TPS}]"),
        ))
    }
}

fn check_ticks(context: &'static str, ticks: i64) -> Result<()> {
    if ticks < 0 {
        Err(SystemError::invariant(context, format!("ticks {ticks} < 0")))
    } else {
        Ok(())
    }
}

impl TimeStamp {
    pub fn new(tps: u32, ticks: i64) -> Result<Self> {
        check_tps("TimeStamp::new()", tps)?;
        check_ticks("TimeStamp::new()", ticks)?;
        Ok(Self { tps, ticks })
    }

    /// Time zero at `tps`.
    pub fn zero(tps: u32) -> Result<Self> {
        Self::new(tps, 0)
    }

    /// Parses `HH:MM:SS:mmm` into a time stamp at 1000 ticks per second.
    pub fn parse_hmsm(text: &str) -> Result<Self> {
        const CONTEXT: &str = "TimeStamp::parse_hmsm()";
        let parts: Vec<&str> = text.trim().split(':').collect();
        if parts.len() != 4 {
            return Err(SystemError::invariant(
                CONTEXT,
                format!("expected HH:MM:SS:mmm, got {text:?}"),
            ));
        }
        let mut fields = [0i64; 4];
        for (slot, part) in fields.iter_mut().zip(&parts) {
            *slot = part.parse::<i64>().map_err(|_| {
                SystemError::invariant(CONTEXT, format!("bad time field {part:?} in {text:?}"))
            })?;
            if *slot < 0 {
                return Err(SystemError::invariant(
                    CONTEXT,
                    format!("negative time field in {text:?}"),
                ));
            }
        }
        let [hh, mm, ss, ms] = fields;
        if mm >= 60 || ss >= 60 || ms >= 1000 {
            return Err(SystemError::invariant(
                CONTEXT,
                format!("time field out of range in {text:?}"),
            ));
        }
        let ticks = hh
            .checked_mul(3_600_000)
            .and_then(|t| t.checked_add(mm * 60_000 + ss * 1000 + ms))
            .ok_or_else(|| SystemError::invariant(CONTEXT, format!("{text:?} overflows")))?;
        Self::new(MAX_TPS, ticks)
    }

    pub fn tps(&self) -> u32 {
        self.tps
    }

    pub fn ticks(&self) -> i64 {
        self.ticks
    }

    pub fn set_ticks(&mut self, ticks: i64) -> Result<()> {
        check_ticks("TimeStamp::set_ticks()", ticks)?;
        self.ticks = ticks;
        Ok(())
    }

    /// Changes the tick rate, rounding the tick count to the nearest tick.
    pub fn set_tps(&mut self, tps: u32) -> Result<()> {
        check_tps("TimeStamp::set_tps()", tps)?;
        self.ticks = convert_ticks(self.ticks, self.tps, tps);
        self.tps = tps;
        Ok(())
    }

    /// Copy of `self` expressed at another tick rate.
    pub fn at_tps(&self, tps: u32) -> Result<Self> {
        let mut converted = *self;
        converted.set_tps(tps)?;
        Ok(converted)
    }

    pub fn hours(&self) -> i64 {
        (self.ticks / i64::from(self.tps)) / 3600
    }

    pub fn minutes(&self) -> i64 {
        ((self.ticks / i64::from(self.tps)) % 3600) / 60
    }

    pub fn seconds(&self) -> i64 {
        (self.ticks / i64::from(self.tps)) % 60
    }

    /// Ticks past the last whole second.
    pub fn frames(&self) -> i64 {
        self.ticks % i64::from(self.tps)
    }

    /// `HH:MM:SS:FFF`
    pub fn to_hmsf_string(&self) -> String {
        format!(
            "{:02}:{:02}:{:02}:{:03}",
            self.hours(),
            self.minutes(),
            self.seconds(),
            self.frames()
        )
    }

    /// `(tps,HH:MM:SS:FFF)`
    pub fn to_db_string(&self) -> String {
        format!("({},{})", self.tps, self.to_hmsf_string())
    }

    fn same_rate(&self, other: &TimeStamp, context: &'static str) -> Result<()> {
        if self.tps == other.tps {
            Ok(())
        } else {
            Err(SystemError::tick_rate(
                context,
                format!("tps mismatch ({} vs {})", self.tps, other.tps),
            ))
        }
    }

    pub fn eq_ts(&self, other: &TimeStamp) -> Result<bool> {
        self.same_rate(other, "TimeStamp::eq()")?;
        Ok(self.ticks == other.ticks)
    }

    pub fn ne_ts(&self, other: &TimeStamp) -> Result<bool> {
        self.same_rate(other, "TimeStamp::ne()")?;
        Ok(self.ticks != other.ticks)
    }

    pub fn lt(&self, other: &TimeStamp) -> Result<bool> {
        self.same_rate(other, "TimeStamp::lt()")?;
        Ok(self.ticks < other.ticks)
    }

    pub fn le(&self, other: &TimeStamp) -> Result<bool> {
        self.same_rate(other, "TimeStamp::le()")?;
        Ok(self.ticks <= other.ticks)
    }

    pub fn gt(&self, other: &TimeStamp) -> Result<bool> {
        self.same_rate(other, "TimeStamp::gt()")?;
        Ok(self.ticks > other.ticks)
    }

    pub fn ge(&self, other: &TimeStamp) -> Result<bool> {
        self.same_rate(other, "TimeStamp::ge()")?;
        Ok(self.ticks >= other.ticks)
    }
}

/// Converts a tick count between tick rates, rounding half away from zero.
pub fn convert_ticks(ticks: i64, from_tps: u32, to_tps: u32) -> i64 {
    if from_tps == to_tps {
        return ticks;
    }
    ((ticks as f64 * f64::from(to_tps)) / f64::from(from_tps)).round() as i64
}

impl fmt::Display for TimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hmsf_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hmsf_rendering() {
        let ts = TimeStamp::new(60, 60 * 3661 + 7).unwrap();
        assert_eq!(ts.to_hmsf_string(), "01:01:01:007");
        assert_eq!(ts.to_db_string(), "(60,01:01:01:007)");
        assert_eq!(TimeStamp::zero(60).unwrap().to_string(), "00:00:00:000");
    }

    #[test]
    fn tps_bounds() {
        assert!(TimeStamp::new(0, 0).is_err());
        assert!(TimeStamp::new(1001, 0).is_err());
        assert!(TimeStamp::new(60, -1).is_err());
    }

    #[test]
    fn set_tps_rounds() {
        let mut ts = TimeStamp::new(30, 333).unwrap();
        ts.set_tps(60).unwrap();
        assert_eq!(ts.ticks(), 666);
        ts.set_tps(25).unwrap();
        assert_eq!(ts.ticks(), 278);
    }

    #[test]
    fn comparisons_need_matching_rates() {
        let a = TimeStamp::new(60, 10).unwrap();
        let b = TimeStamp::new(60, 20).unwrap();
        let c = TimeStamp::new(30, 20).unwrap();
        assert!(a.lt(&b).unwrap());
        assert!(b.ge(&a).unwrap());
        assert!(!a.eq_ts(&b).unwrap());
        assert!(matches!(a.lt(&c), Err(SystemError::TickRate { .. })));
    }

    #[test]
    fn parse_hmsm() {
        let ts = TimeStamp::parse_hmsm("00:01:02:500").unwrap();
        assert_eq!(ts.tps(), 1000);
        assert_eq!(ts.ticks(), 62_500);
        assert!(TimeStamp::parse_hmsm("1:2:3").is_err());
        assert!(TimeStamp::parse_hmsm("00:61:00:000").is_err());
    }

    #[test]
    fn parse_hmsm_rejects_hours_that_overflow() {
        let err = TimeStamp::parse_hmsm("9999999999999999:00:00:000").unwrap_err();
        assert!(matches!(err, SystemError::Invariant { .. }));
        assert!(TimeStamp::parse_hmsm(&format!("{}:00:00:000", i64::MAX)).is_err());
        let big = TimeStamp::parse_hmsm("2562047788:00:00:000").unwrap();
        assert_eq!(big.ticks(), 2_562_047_788 * 3_600_000);
    }
}
