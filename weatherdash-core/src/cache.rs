//! Time-boxed memoization of provider responses.
//!
//! Each operation gets its own [`TtlCache`], keyed by the exact call
//! arguments. Entries are never refreshed in place: a stale entry is evicted
//! on the lookup that notices it, and the caller fetches again.

use std::{
    collections::HashMap,
    fmt::Debug,
    hash::Hash,
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use tracing::debug;

use crate::model::{CurrentWeather, ForecastObservation};

pub const CURRENT_TTL: Duration = Duration::from_secs(600);
pub const FORECAST_TTL: Duration = Duration::from_secs(3600);

/// Source of monotonic time for expiry checks.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { origin: Instant::now(), elapsed: Mutex::new(Duration::ZERO) }
    }

    pub fn advance(&self, by: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(PoisonError::into_inner);
        *elapsed += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.elapsed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Map from key to value with a fixed time-to-live per entry.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    name: &'static str,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Debug,
    V: Clone,
{
    pub fn new(name: &'static str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { name, ttl, clock, entries: Mutex::new(HashMap::new()) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a copy of the live value for `key`, evicting it if it has expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        let live = entries.get(key).map(|entry| (now < entry.expires_at).then(|| entry.value.clone()));

        match live {
            Some(Some(value)) => {
                debug!(cache = self.name, ?key, "Cache hit");
                Some(value)
            }
            Some(None) => {
                entries.remove(key);
                debug!(cache = self.name, ?key, "Cache entry expired");
                None
            }
            None => {
                debug!(cache = self.name, ?key, "Cache miss");
                None
            }
        }
    }

    pub fn insert(&self, key: K, value: V) {
        let expires_at = self.clock.now() + self.ttl;
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(cache = self.name, ?key, ttl_secs = self.ttl.as_secs(), "Cache set");
        entries.insert(key, Entry { value, expires_at });
    }

    /// Number of stored entries, stale ones included until they are looked up.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub type ForecastKey = (String, u8);

/// The two response caches used by the weather client.
#[derive(Debug)]
pub struct WeatherCache {
    pub current: TtlCache<String, CurrentWeather>,
    pub forecast: TtlCache<ForecastKey, Vec<ForecastObservation>>,
}

impl WeatherCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            current: TtlCache::new("current", CURRENT_TTL, Arc::clone(&clock)),
            forecast: TtlCache::new("forecast", FORECAST_TTL, clock),
        }
    }
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self::new()
    }
}
