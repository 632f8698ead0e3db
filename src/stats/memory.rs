//! In-memory stats engine
//!
//! Counters are kept in one bucket per hour. Buckets that fall out of the
//! retention window are evicted lazily whenever the engine is written to or
//! read from, so a reconfigure never has to walk the data itself.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::data::{StatsData, TopEntry};
use super::{Entry, ResultKind, StatsEngine, TimeUnit};

const HOURS_PER_DAY: u32 = 24;
// Longest retention accepted from callers, keeps the window and snapshot arrays bounded
const MAX_RETENTION_DAYS: u32 = 366;

const fn window_hours(interval_days: u32) -> u32 {
    let days = if interval_days == 0 {
        1
    } else if interval_days > MAX_RETENTION_DAYS {
        MAX_RETENTION_DAYS
    } else {
        interval_days
    };
    days * HOURS_PER_DAY
}

/// Hour id (hours since the unix epoch) of the current wall clock time.
pub fn current_hour() -> u32 {
    let secs = chrono::Utc::now().timestamp().max(0);
    u32::try_from(secs / 3600).unwrap_or(u32::MAX)
}

/// Counters for a single hour
#[derive(Debug, Default)]
struct Unit {
    id: u32,
    results: [u64; ResultKind::COUNT],
    total: u64,
    time_sum_us: u64,
    domains: HashMap<String, u64>,
    blocked_domains: HashMap<String, u64>,
    clients: HashMap<String, u64>,
}

impl Unit {
    fn new(id: u32) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    fn add(&mut self, entry: Entry) {
        self.results[entry.result.index()] += 1;
        self.total += 1;
        self.time_sum_us = self
            .time_sum_us
            .saturating_add(u64::try_from(entry.elapsed.as_micros()).unwrap_or(u64::MAX));

        if entry.result.is_blocked() {
            *self.blocked_domains.entry(entry.domain.clone()).or_default() += 1;
        }
        *self.domains.entry(entry.domain).or_default() += 1;
        *self.clients.entry(entry.client).or_default() += 1;
    }
}

#[derive(Debug)]
struct Inner {
    limit_hours: u32,
    // Sorted by id, oldest first
    units: VecDeque<Unit>,
}

impl Inner {
    /// Drop buckets older than the window ending at `now`.
    fn evict(&mut self, now: u32) {
        let oldest_kept = now.saturating_add(1).saturating_sub(self.limit_hours);
        while self.units.front().is_some_and(|u| u.id < oldest_kept) {
            self.units.pop_front();
        }
    }

    fn unit_for(&mut self, hour: u32) -> &mut Unit {
        match self.units.back() {
            Some(last) if last.id == hour => {}
            Some(last) if last.id > hour => {
                // Late entry for an older hour
                let pos = self.units.partition_point(|u| u.id < hour);
                if self.units.get(pos).map(|u| u.id) != Some(hour) {
                    self.units.insert(pos, Unit::new(hour));
                }
                return &mut self.units[pos];
            }
            _ => self.units.push_back(Unit::new(hour)),
        }
        let last = self.units.len() - 1;
        &mut self.units[last]
    }
}

/// Thread-safe stats engine keeping everything in memory
#[derive(Debug)]
pub struct MemoryStats {
    inner: Mutex<Inner>,
    top_limit: usize,
}

impl MemoryStats {
    pub fn new(interval_days: u32, top_limit: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                limit_hours: window_hours(interval_days),
                units: VecDeque::new(),
            }),
            top_limit,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current retention window in hours
    pub fn limit_hours(&self) -> u32 {
        self.lock().limit_hours
    }

    /// Account `entry` in the bucket of `hour`.
    pub fn record_at(&self, hour: u32, entry: Entry) {
        let mut inner = self.lock();
        let now = inner.units.back().map_or(hour, |u| u.id.max(hour));
        inner.evict(now);
        if hour.saturating_add(inner.limit_hours) <= now {
            return;
        }
        inner.unit_for(hour).add(entry);
    }

    /// Snapshot of the window ending at `now`.
    pub fn data_at(&self, now: u32, unit: TimeUnit) -> StatsData {
        let mut inner = self.lock();
        inner.evict(now);

        let limit = inner.limit_hours;
        let slots = match unit {
            TimeUnit::Hours => limit as usize,
            TimeUnit::Days => (limit / HOURS_PER_DAY).max(1) as usize,
        };
        // Bucket index of an hour id, None when outside the window
        let slot_of = |id: u32| -> Option<usize> {
            if id > now {
                return None;
            }
            let (id, now) = match unit {
                TimeUnit::Hours => (id, now),
                TimeUnit::Days => (id / HOURS_PER_DAY, now / HOURS_PER_DAY),
            };
            let back = (now - id) as usize;
            (back < slots).then(|| slots - 1 - back)
        };

        let mut per_slot = vec![[0_u64; ResultKind::COUNT]; slots];
        let mut dns_queries = vec![0_u64; slots];
        let mut results = [0_u64; ResultKind::COUNT];
        let mut total = 0_u64;
        let mut time_sum_us = 0_u64;
        let mut domains: HashMap<&str, u64> = HashMap::new();
        let mut blocked: HashMap<&str, u64> = HashMap::new();
        let mut clients: HashMap<&str, u64> = HashMap::new();

        for u in inner.units.iter().filter(|u| u.id <= now) {
            if let Some(slot) = slot_of(u.id) {
                dns_queries[slot] += u.total;
                for (acc, n) in per_slot[slot].iter_mut().zip(u.results) {
                    *acc += n;
                }
            }
            for (acc, n) in results.iter_mut().zip(u.results) {
                *acc += n;
            }
            total += u.total;
            time_sum_us = time_sum_us.saturating_add(u.time_sum_us);
            merge_counts(&mut domains, &u.domains);
            merge_counts(&mut blocked, &u.blocked_domains);
            merge_counts(&mut clients, &u.clients);
        }

        let column = |kind: ResultKind| -> Vec<u64> {
            per_slot.iter().map(|r| r[kind.index()]).collect()
        };

        #[allow(clippy::cast_precision_loss)]
        let avg_processing_time = if total == 0 {
            0.0
        } else {
            time_sum_us as f64 / total as f64 / 1_000_000.0
        };

        StatsData {
            time_units: unit,
            num_dns_queries: total,
            num_blocked_filtering: results[ResultKind::Filtered.index()],
            num_replaced_safebrowsing: results[ResultKind::SafeBrowsing.index()],
            num_replaced_safesearch: results[ResultKind::SafeSearch.index()],
            num_replaced_parental: results[ResultKind::Parental.index()],
            avg_processing_time,
            dns_queries,
            blocked_filtering: column(ResultKind::Filtered),
            replaced_safebrowsing: column(ResultKind::SafeBrowsing),
            replaced_parental: column(ResultKind::Parental),
            top_queried_domains: top_entries(domains, self.top_limit),
            top_blocked_domains: top_entries(blocked, self.top_limit),
            top_clients: top_entries(clients, self.top_limit),
        }
    }
}

fn merge_counts<'a>(acc: &mut HashMap<&'a str, u64>, counts: &'a HashMap<String, u64>) {
    for (name, n) in counts {
        *acc.entry(name.as_str()).or_default() += n;
    }
}

/// Highest counts first, ties broken by name
fn top_entries(counts: HashMap<&str, u64>, limit: usize) -> Vec<TopEntry> {
    let mut entries: Vec<TopEntry> = counts
        .into_iter()
        .map(|(name, count)| TopEntry {
            name: name.to_string(),
            count,
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    entries.truncate(limit);
    entries
}

impl StatsEngine for MemoryStats {
    fn configure(&self, interval_days: u32) {
        self.lock().limit_hours = window_hours(interval_days);
    }

    fn get_data(&self, unit: TimeUnit) -> StatsData {
        self.data_at(current_hour(), unit)
    }

    fn clear(&self) {
        self.lock().units.clear();
    }

    fn record(&self, entry: Entry) {
        self.record_at(current_hour(), entry);
    }
}
