use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    /// Start of the hour this price applies to
    pub starts_at: DateTime<FixedOffset>,
    /// Total price including taxes, in currency per kWh
    pub total: f64,
}

impl PricePoint {
    /// Returns true if `now` falls within the hour starting at `starts_at`.
    pub fn contains<TZ: TimeZone>(&self, now: &DateTime<TZ>) -> bool {
        let now = now.with_timezone(&self.starts_at.timezone());
        self.starts_at <= now && now < self.starts_at + Duration::hours(1)
    }
}

/// Hourly prices of today and, once published, tomorrow.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyPrices {
    pub today: Vec<PricePoint>,
    pub tomorrow: Option<Vec<PricePoint>>,
}

impl DailyPrices {
    /// Iterates all days with prices, today first.
    pub fn days(&self) -> impl Iterator<Item = (DayLabel, &[PricePoint])> {
        std::iter::once((DayLabel::Today, self.today.as_slice())).chain(
            self.tomorrow
                .as_deref()
                .map(|points| (DayLabel::Tomorrow, points)),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayLabel {
    Today,
    Tomorrow,
}

impl DayLabel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DayLabel::Today => "heute",
            DayLabel::Tomorrow => "morgen",
        }
    }
}

impl fmt::Display for DayLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowest and highest price used to normalize the colour scale of a chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBounds {
    pub min: f64,
    pub max: f64,
}

impl PriceBounds {
    /// Returns `None` for an empty set of points.
    pub fn of<'a>(points: impl IntoIterator<Item = &'a PricePoint>) -> Option<Self> {
        points.into_iter().fold(None, |bounds, point| {
            Some(match bounds {
                None => PriceBounds {
                    min: point.total,
                    max: point.total,
                },
                Some(PriceBounds { min, max }) => PriceBounds {
                    min: min.min(point.total),
                    max: max.max(point.total),
                },
            })
        })
    }

    /// Relative position of `price` within the bounds, clamped to `0.0..=1.0`.
    pub fn position(&self, price: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((price - self.min) / span).clamp(0.0, 1.0)
    }
}

/// Which prices the colour scale of a chart is normalized against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleStrategy {
    /// One scale spanning today and tomorrow, so equal prices share a colour
    #[default]
    Combined,
    /// Each day is scaled against its own extremes
    PerDay,
}
