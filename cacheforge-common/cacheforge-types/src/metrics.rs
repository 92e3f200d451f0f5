use serde::{Deserialize, Serialize};

/// The six actuator meters the monitor scrapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterName {
    Hits,
    Misses,
    Expired,
    Latency,
    Created,
    Updated,
}

impl CounterName {
    pub const ALL: [CounterName; 6] = [
        CounterName::Hits,
        CounterName::Misses,
        CounterName::Expired,
        CounterName::Latency,
        CounterName::Created,
        CounterName::Updated,
    ];

    /// Meter name as registered by the service.
    pub fn metric_name(&self) -> &'static str {
        match self {
            CounterName::Hits => "cacheforge.cache.hits",
            CounterName::Misses => "cacheforge.cache.misses",
            CounterName::Expired => "cacheforge.cache.expired",
            CounterName::Latency => "cacheforge.cache.latency",
            CounterName::Created => "cacheforge.cache.set.created",
            CounterName::Updated => "cacheforge.cache.set.updated",
        }
    }

    /// Position of the sample to read in the `measurements` array.
    ///
    /// Timers report `COUNT, TOTAL_TIME, MAX`; latency reads slot 2.
    pub fn measurement_index(&self) -> usize {
        match self {
            CounterName::Latency => 2,
            _ => 0,
        }
    }
}

impl std::fmt::Display for CounterName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.metric_name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRecord {
    pub hits: u64,
    pub misses: u64,
    pub expired: u64,
    pub created: u64,
    pub updated: u64,
    pub latency_seconds: f64,
}

impl MetricsRecord {
    /// Field value as a float, for uniform handling across counters.
    pub fn get(&self, counter: CounterName) -> f64 {
        match counter {
            CounterName::Hits => self.hits as f64,
            CounterName::Misses => self.misses as f64,
            CounterName::Expired => self.expired as f64,
            CounterName::Created => self.created as f64,
            CounterName::Updated => self.updated as f64,
            CounterName::Latency => self.latency_seconds,
        }
    }

    /// Integral counters are rounded; callers reject negative values first.
    pub fn set(&mut self, counter: CounterName, value: f64) {
        let count = value.max(0.0).round() as u64;
        match counter {
            CounterName::Hits => self.hits = count,
            CounterName::Misses => self.misses = count,
            CounterName::Expired => self.expired = count,
            CounterName::Created => self.created = count,
            CounterName::Updated => self.updated = count,
            CounterName::Latency => self.latency_seconds = value.max(0.0),
        }
    }

    pub fn latency_millis(&self) -> f64 {
        self.latency_seconds * 1000.0
    }

    pub fn total_lookups(&self) -> u64 {
        self.hits + self.misses
    }

    pub fn hit_ratio(&self) -> f64 {
        match self.total_lookups() {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }
}
