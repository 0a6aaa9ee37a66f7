use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

/// A human duration such as `1d12h` or `2w`, as typed into commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Duration {
    pub years: i64,
    pub months: i64,
    pub weeks: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub string: String,
}

impl Duration {
    /// Returns `None` when no unit could be recognised.
    pub fn parse(string: &str) -> Option<Duration> {
        debug!("Parsing duration: {}", string);
        let lowered = string.to_lowercase();
        let mut duration = Duration {
            string: lowered.clone(),
            ..Duration::default()
        };

        lazy_static! {
            static ref DURATION_REGEX: Regex = Regex::new(r"(\d+)\s*(y|mo|w|d|h|m|s)").unwrap();
        }

        let mut matched = false;
        for capture in DURATION_REGEX.captures_iter(&lowered) {
            let value = capture.get(1)?.as_str().parse::<i64>().ok()?;
            let unit = capture.get(2)?.as_str();

            match unit {
                "y" => duration.years = value,
                "mo" => duration.months = value,
                "w" => duration.weeks = value,
                "d" => duration.days = value,
                "h" => duration.hours = value,
                "m" => duration.minutes = value,
                "s" => duration.seconds = value,
                _ => continue,
            }
            matched = true;
        }

        debug!("Parsed duration: {:?}", duration);
        matched.then_some(duration)
    }

    pub fn total_seconds(&self) -> Option<i64> {
        [
            (self.seconds, 1),
            (self.minutes, 60),
            (self.hours, 60 * 60),
            (self.days, 60 * 60 * 24),
            (self.weeks, 60 * 60 * 24 * 7),
            (self.months, 60 * 60 * 24 * 30),
            (self.years, 60 * 60 * 24 * 365),
        ]
        .into_iter()
        .try_fold(0i64, |total, (value, unit)| {
            total.checked_add(value.checked_mul(unit)?)
        })
    }

    /// Whole minutes, rounding leftover seconds up. Never less than one.
    pub fn to_minutes(&self) -> Option<u32> {
        let seconds = self.total_seconds()?;
        let minutes = seconds.checked_add(59)? / 60;
        u32::try_from(minutes.max(1)).ok()
    }
}
