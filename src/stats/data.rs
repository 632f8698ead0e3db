// Snapshot types returned by the stats engine

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::TimeUnit;

/// Aggregated statistics snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsData {
    pub time_units: TimeUnit,

    pub num_dns_queries: u64,
    pub num_blocked_filtering: u64,
    pub num_replaced_safebrowsing: u64,
    pub num_replaced_safesearch: u64,
    pub num_replaced_parental: u64,
    /// Mean processing time in seconds
    pub avg_processing_time: f64,

    // One element per bucket, oldest first
    pub dns_queries: Vec<u64>,
    pub blocked_filtering: Vec<u64>,
    pub replaced_safebrowsing: Vec<u64>,
    pub replaced_parental: Vec<u64>,

    pub top_queried_domains: Vec<TopEntry>,
    pub top_blocked_domains: Vec<TopEntry>,
    pub top_clients: Vec<TopEntry>,
}

/// `{name: count}` pair in a top list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopEntry {
    pub name: String,
    pub count: u64,
}

impl Serialize for TopEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.count)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_entry_is_single_key_object() {
        let entry = TopEntry {
            name: "example.org".to_string(),
            count: 12,
        };
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            serde_json::json!({"example.org": 12})
        );
    }
}
