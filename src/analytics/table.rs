//! Paginated visit table

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::pagination::Pagination;
use crate::tracker::{AnalyticsBackend, AnalyticsRecord};

/// Shown when a page could not be loaded or has no rows
pub const EMPTY_STATE: &str = "No analytics data available for this script.";

/// A visit formatted for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordView {
    pub ip_address: String,
    pub local_time: String,
    pub user_agent: String,
    pub city: String,
    /// Formatted here so zero values still render
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub page_views: Option<String>,
}

impl From<&AnalyticsRecord> for RecordView {
    fn from(record: &AnalyticsRecord) -> Self {
        Self {
            ip_address: record.ip_address.clone(),
            local_time: record.local_time(),
            user_agent: record.user_agent.clone(),
            city: record.city_label().to_string(),
            latitude: record.latitude.map(|v| v.to_string()),
            longitude: record.longitude.map(|v| v.to_string()),
            page_views: record.page_views.map(|v| v.to_string()),
        }
    }
}

#[derive(Debug, Default)]
struct TableState {
    page: u32,
    /// Token of the latest page request
    request: u64,
    total: u64,
    records: Vec<AnalyticsRecord>,
    loading: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableSnapshot {
    pub records: Vec<RecordView>,
    pub page: u32,
    pub total_pages: u32,
    pub total: u64,
    pub has_prev: bool,
    pub has_next: bool,
    pub loading: bool,
    /// Set when there is nothing to show
    pub empty_message: Option<&'static str>,
}

pub struct AnalyticsTable {
    tracker: Arc<dyn AnalyticsBackend>,
    script_id: String,
    page_size: u32,
    state: RwLock<TableState>,
}

impl AnalyticsTable {
    pub fn new(tracker: Arc<dyn AnalyticsBackend>, script_id: impl Into<String>, page_size: u32) -> Self {
        Self {
            tracker,
            script_id: script_id.into(),
            page_size: page_size.max(1),
            state: RwLock::new(TableState {
                page: 1,
                ..Default::default()
            }),
        }
    }

    /// Fetch one page. A failed fetch empties the table. A response that
    /// arrives after a newer request was issued is dropped.
    pub async fn load_page(&self, page: u32) -> TableSnapshot {
        let page = page.max(1);
        let token = {
            let mut state = self.state.write().await;
            state.page = page;
            state.loading = true;
            state.request += 1;
            state.request
        };

        let result = self
            .tracker
            .fetch_analytics(&self.script_id, page, self.page_size)
            .await;

        {
            let mut state = self.state.write().await;
            if state.request != token {
                tracing::debug!(script_id = %self.script_id, page, "Dropping stale analytics page");
                drop(state);
                return self.snapshot().await;
            }

            state.loading = false;
            match result {
                Ok(data) => {
                    tracing::debug!(
                        script_id = %self.script_id,
                        page,
                        total = data.total,
                        "Loaded analytics page"
                    );
                    state.records = data.documents;
                    state.total = data.total;
                }
                Err(e) => {
                    tracing::warn!(script_id = %self.script_id, page, error = %e, "Failed to fetch analytics");
                    state.records.clear();
                    state.total = 0;
                }
            }
        }

        self.snapshot().await
    }

    /// Move forward one page; a no-op on the last page
    pub async fn next(&self) -> TableSnapshot {
        let pagination = self.pagination().await;
        if pagination.has_next() {
            self.load_page(pagination.page + 1).await
        } else {
            self.snapshot().await
        }
    }

    /// Move back one page; a no-op on the first page
    pub async fn prev(&self) -> TableSnapshot {
        let pagination = self.pagination().await;
        if pagination.has_prev() {
            self.load_page(pagination.page - 1).await
        } else {
            self.snapshot().await
        }
    }

    pub async fn snapshot(&self) -> TableSnapshot {
        let state = self.state.read().await;
        let pagination = Pagination::new(state.page, self.page_size, state.total);

        TableSnapshot {
            records: state.records.iter().map(RecordView::from).collect(),
            page: pagination.page,
            total_pages: pagination.total_pages(),
            total: state.total,
            has_prev: pagination.has_prev(),
            has_next: pagination.has_next(),
            loading: state.loading,
            empty_message: if state.records.is_empty() && !state.loading {
                Some(EMPTY_STATE)
            } else {
                None
            },
        }
    }

    async fn pagination(&self) -> Pagination {
        let state = self.state.read().await;
        Pagination::new(state.page, self.page_size, state.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTracker;

    #[tokio::test]
    async fn test_load_page_reports_pagination() {
        let tracker = Arc::new(FakeTracker::new().with_records(95));
        let table = AnalyticsTable::new(tracker.clone(), "s-1", 10);

        let snapshot = table.load_page(1).await;
        assert_eq!(snapshot.records.len(), 10);
        assert_eq!(snapshot.total_pages, 10);
        assert!(!snapshot.has_prev);
        assert!(snapshot.has_next);
        assert!(snapshot.empty_message.is_none());
        assert_eq!(snapshot.records[0].city, "N/A");
        assert_eq!(tracker.calls(), vec!["analytics:s-1:1:10"]);
    }

    #[tokio::test]
    async fn test_next_stops_on_last_page() {
        let tracker = Arc::new(FakeTracker::new().with_records(95));
        let table = AnalyticsTable::new(tracker.clone(), "s-1", 10);

        let snapshot = table.load_page(10).await;
        assert_eq!(snapshot.records.len(), 5);
        assert!(!snapshot.has_next);

        let snapshot = table.next().await;
        assert_eq!(snapshot.page, 10);
        assert_eq!(tracker.calls().len(), 1);

        let snapshot = table.prev().await;
        assert_eq!(snapshot.page, 9);
        assert_eq!(tracker.calls().last().unwrap(), "analytics:s-1:9:10");
    }

    #[tokio::test]
    async fn test_prev_on_first_page_is_noop() {
        let tracker = Arc::new(FakeTracker::new().with_records(3));
        let table = AnalyticsTable::new(tracker.clone(), "s-1", 10);
        table.load_page(1).await;

        let snapshot = table.prev().await;
        assert_eq!(snapshot.page, 1);
        assert_eq!(tracker.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_stale_page_is_discarded() {
        let tracker = Arc::new(FakeTracker::new().with_records(25));
        let release = tracker.gate_page(2);
        let table = Arc::new(AnalyticsTable::new(tracker.clone(), "s-1", 10));

        let pending = {
            let table = Arc::clone(&table);
            tokio::spawn(async move { table.load_page(2).await })
        };
        while !tracker.calls().contains(&"analytics:s-1:2:10".to_string()) {
            tokio::task::yield_now().await;
        }

        let snapshot = table.load_page(3).await;
        assert_eq!(snapshot.records[0].ip_address, "203.0.113.20");

        release.send(()).unwrap();
        pending.await.unwrap();

        let snapshot = table.snapshot().await;
        assert_eq!(snapshot.page, 3);
        assert_eq!(snapshot.records.len(), 5);
        assert_eq!(snapshot.records[0].ip_address, "203.0.113.20");
        assert!(!snapshot.loading);
    }

    #[test]
    fn test_zero_values_are_shown() {
        let record = AnalyticsRecord {
            script_id: None,
            ip_address: "198.51.100.1".to_string(),
            timestamp: "2025-03-04T10:00:00Z".to_string(),
            user_agent: "curl/8.0".to_string(),
            city: None,
            latitude: Some(0.0),
            longitude: Some(-0.5),
            page_views: Some(0),
        };

        let view = RecordView::from(&record);
        assert_eq!(view.latitude.as_deref(), Some("0"));
        assert_eq!(view.longitude.as_deref(), Some("-0.5"));
        assert_eq!(view.page_views.as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn test_failure_shows_empty_state() {
        let tracker = Arc::new(FakeTracker::new().with_records(20));
        let table = AnalyticsTable::new(tracker.clone(), "s-1", 10);
        table.load_page(1).await;

        tracker.set_failing(true);
        let snapshot = table.load_page(2).await;

        assert!(snapshot.records.is_empty());
        assert_eq!(snapshot.empty_message, Some(EMPTY_STATE));
        assert_eq!(snapshot.total_pages, 1);
        assert!(!snapshot.loading);
    }
}
