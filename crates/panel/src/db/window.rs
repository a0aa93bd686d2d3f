use time::PrimitiveDateTime;
#[cfg(test)]
use time::Duration;

use super::{StationId, TimeRange};

/// Which stations a query window covers
#[derive(Debug, Clone, PartialEq)]
pub enum WindowScope {
    Station(StationId),
    /// Every station whose identifier starts with `prefix`, minus `excluded`
    Prefix {
        prefix: &'static str,
        excluded: &'static [&'static str],
    },
}

impl WindowScope {
    #[cfg(test)]
    pub fn includes(&self, station_id: &StationId) -> bool {
        match self {
            WindowScope::Station(id) => id == station_id,
            WindowScope::Prefix { prefix, excluded } => {
                station_id.starts_with(prefix) && !excluded.contains(&station_id.as_str())
            }
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("window start {start} is after window end {end}")]
pub struct InvertedWindow {
    pub start: PrimitiveDateTime,
    pub end: PrimitiveDateTime,
}

/// A closed time interval over a station or a station prefix. Both ends are
/// inclusive when fetching.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryWindow {
    scope: WindowScope,
    start: PrimitiveDateTime,
    end: PrimitiveDateTime,
}

impl QueryWindow {
    pub fn new(
        scope: WindowScope,
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
    ) -> Result<Self, InvertedWindow> {
        if start > end {
            return Err(InvertedWindow { start, end });
        }
        Ok(QueryWindow { scope, start, end })
    }

    pub fn scope(&self) -> &WindowScope {
        &self.scope
    }

    pub fn start(&self) -> PrimitiveDateTime {
        self.start
    }

    pub fn end(&self) -> PrimitiveDateTime {
        self.end
    }

    #[cfg(test)]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    #[cfg(test)]
    pub fn contains(&self, at: PrimitiveDateTime) -> bool {
        self.start <= at && at <= self.end
    }
}

impl From<&QueryWindow> for TimeRange {
    fn from(window: &QueryWindow) -> Self {
        TimeRange {
            start: window.start,
            end: window.end,
        }
    }
}
