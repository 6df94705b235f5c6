//! Analytics View
//!
//! Paginated visit table and visits-over-time graph for one script.

mod graph;
mod pagination;
mod table;

pub use graph::{
    ChartPoint, ChartSeries, DayWindow, GraphSnapshot, GraphView, WindowOption, CHART_HEIGHT,
    CHART_WIDTH,
};
pub use pagination::{total_pages, Pagination};
pub use table::{AnalyticsTable, RecordView, TableSnapshot, EMPTY_STATE};

use std::sync::Arc;

use crate::tracker::AnalyticsBackend;

/// Table and graph for one script
pub struct AnalyticsView {
    pub script_id: String,
    pub table: AnalyticsTable,
    pub graph: GraphView,
}

impl AnalyticsView {
    pub fn new(tracker: Arc<dyn AnalyticsBackend>, script_id: &str, page_size: u32) -> Self {
        Self {
            script_id: script_id.to_string(),
            table: AnalyticsTable::new(Arc::clone(&tracker), script_id, page_size),
            graph: GraphView::new(tracker, script_id),
        }
    }
}
