//! Visits-over-time graph
//!
//! Each window selection takes a new request token. A response is applied
//! only if its token is still current, so a slow answer for an old window
//! never replaces the data for a newer one.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::tracker::{AnalyticsBackend, GraphPoint};

/// Trailing-day window offered by the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum DayWindow {
    Three,
    #[default]
    Five,
    Ten,
    Thirty,
    Year,
}

impl DayWindow {
    pub const ALL: [DayWindow; 5] = [
        DayWindow::Three,
        DayWindow::Five,
        DayWindow::Ten,
        DayWindow::Thirty,
        DayWindow::Year,
    ];

    pub fn days(self) -> u32 {
        match self {
            DayWindow::Three => 3,
            DayWindow::Five => 5,
            DayWindow::Ten => 10,
            DayWindow::Thirty => 30,
            DayWindow::Year => 365,
        }
    }

    pub fn from_days(days: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.days() == days)
    }

    pub fn label(self) -> &'static str {
        match self {
            DayWindow::Three => "Last 3 days",
            DayWindow::Five => "Last 5 days",
            DayWindow::Ten => "Last 10 days",
            DayWindow::Thirty => "Last 30 days",
            DayWindow::Year => "Last 365 days",
        }
    }
}

/// One plotted point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub count: u64,
    pub x: f64,
    pub y: f64,
}

/// Graph points scaled into a `width` x `height` box
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub width: u32,
    pub height: u32,
    pub max: u64,
    pub points: Vec<ChartPoint>,
    /// `points` attribute of an SVG `<polyline>`
    pub polyline: String,
}

impl ChartSeries {
    pub fn from_points(points: &[GraphPoint], width: u32, height: u32) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let max = points.iter().map(|p| p.count).max().unwrap_or(0);
        let step = if points.len() > 1 {
            f64::from(width) / (points.len() - 1) as f64
        } else {
            0.0
        };

        let points: Vec<ChartPoint> = points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let ratio = if max == 0 { 0.0 } else { p.count as f64 / max as f64 };
                ChartPoint {
                    label: p.label(),
                    count: p.count,
                    x: i as f64 * step,
                    y: f64::from(height) * (1.0 - ratio),
                }
            })
            .collect();

        let polyline = points
            .iter()
            .map(|p| format!("{:.1},{:.1}", p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ");

        Some(Self {
            width,
            height,
            max,
            points,
            polyline,
        })
    }

    /// Horizontal bar per point, scaled to `width` characters
    pub fn ascii_bars(&self, width: usize) -> Vec<String> {
        let label_width = self.points.iter().map(|p| p.label.len()).max().unwrap_or(0);
        self.points
            .iter()
            .map(|p| {
                let len = if self.max == 0 {
                    0
                } else {
                    ((p.count as f64 / self.max as f64) * width as f64).round() as usize
                };
                format!(
                    "{:>lw$} | {} {}",
                    p.label,
                    "#".repeat(len),
                    p.count,
                    lw = label_width
                )
            })
            .collect()
    }
}

#[derive(Debug, Default)]
struct GraphState {
    window: DayWindow,
    token: u64,
    points: Vec<GraphPoint>,
    loading: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct WindowOption {
    pub days: u32,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphSnapshot {
    pub days: u32,
    pub windows: Vec<WindowOption>,
    pub loading: bool,
    pub series: Option<ChartSeries>,
}

pub const CHART_WIDTH: u32 = 600;
pub const CHART_HEIGHT: u32 = 200;

pub struct GraphView {
    tracker: Arc<dyn AnalyticsBackend>,
    script_id: String,
    state: RwLock<GraphState>,
}

impl GraphView {
    pub fn new(tracker: Arc<dyn AnalyticsBackend>, script_id: impl Into<String>) -> Self {
        Self {
            tracker,
            script_id: script_id.into(),
            state: RwLock::new(GraphState::default()),
        }
    }

    /// Switch windows and take a new request token
    pub async fn select_window(&self, window: DayWindow) -> u64 {
        let mut state = self.state.write().await;
        state.window = window;
        state.token += 1;
        state.points.clear();
        state.loading = true;
        state.token
    }

    /// Fetch the current window for `token`.
    ///
    /// Returns false when the response was discarded because a newer
    /// selection superseded it.
    pub async fn fetch(&self, token: u64) -> bool {
        let window = {
            let state = self.state.read().await;
            if state.token != token {
                return false;
            }
            state.window
        };

        let result = self.tracker.fetch_graph(&self.script_id, window.days()).await;

        let mut state = self.state.write().await;
        if state.token != token {
            tracing::debug!(
                script_id = %self.script_id,
                days = window.days(),
                "Discarding stale graph response"
            );
            return false;
        }

        state.loading = false;
        match result {
            Ok(points) => state.points = points,
            Err(e) => {
                // Rendered as an empty graph
                tracing::warn!(script_id = %self.script_id, days = window.days(), error = %e, "Failed to fetch graph data");
                state.points.clear();
            }
        }
        true
    }

    /// Select `window` and fetch it
    pub async fn load(&self, window: DayWindow) -> bool {
        let token = self.select_window(window).await;
        self.fetch(token).await
    }

    pub async fn points(&self) -> Vec<GraphPoint> {
        self.state.read().await.points.clone()
    }

    pub async fn snapshot(&self) -> GraphSnapshot {
        let state = self.state.read().await;
        GraphSnapshot {
            days: state.window.days(),
            windows: DayWindow::ALL
                .into_iter()
                .map(|w| WindowOption {
                    days: w.days(),
                    label: w.label(),
                    selected: w == state.window,
                })
                .collect(),
            loading: state.loading,
            series: ChartSeries::from_points(&state.points, CHART_WIDTH, CHART_HEIGHT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTracker;
    use serde_json::json;

    #[test]
    fn test_day_windows() {
        assert_eq!(DayWindow::default().days(), 5);
        assert_eq!(DayWindow::from_days(365), Some(DayWindow::Year));
        assert_eq!(DayWindow::from_days(7), None);
    }

    #[test]
    fn test_chart_series_scaling() {
        let points = vec![
            GraphPoint { date: "2025-01-01".to_string(), count: 0 },
            GraphPoint { date: "2025-01-02".to_string(), count: 5 },
            GraphPoint { date: "2025-01-03".to_string(), count: 10 },
        ];
        let series = ChartSeries::from_points(&points, 100, 50).unwrap();

        assert_eq!(series.max, 10);
        assert_eq!(series.polyline, "0.0,50.0 50.0,25.0 100.0,0.0");
        assert_eq!(series.points[1].label, "1/2/2025");

        let bars = series.ascii_bars(10);
        assert_eq!(bars[2], "1/3/2025 | ########## 10");
        assert_eq!(bars[0], "1/1/2025 |  0");
    }

    #[test]
    fn test_empty_series_renders_nothing() {
        assert!(ChartSeries::from_points(&[], 100, 50).is_none());
    }

    #[tokio::test]
    async fn test_load_default_window() {
        let tracker = Arc::new(FakeTracker::new().with_graph(
            5,
            json!({ "graphData": [{ "date": "2025-01-01", "count": 3 }] }),
        ));
        let view = GraphView::new(tracker.clone(), "s-1");

        assert!(view.load(DayWindow::default()).await);
        let snapshot = view.snapshot().await;
        assert_eq!(snapshot.days, 5);
        assert!(!snapshot.loading);
        assert_eq!(snapshot.series.unwrap().max, 3);
        assert!(snapshot.windows.iter().any(|w| w.days == 5 && w.selected));
    }

    #[tokio::test]
    async fn test_malformed_response_renders_nothing() {
        let tracker = Arc::new(FakeTracker::new().with_graph(5, json!({ "graphData": "oops" })));
        let view = GraphView::new(tracker, "s-1");

        assert!(view.load(DayWindow::Five).await);
        let snapshot = view.snapshot().await;
        assert!(snapshot.series.is_none());
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let tracker = Arc::new(
            FakeTracker::new()
                .with_graph(5, json!({ "graphData": [{ "date": "2025-01-01", "count": 5 }] }))
                .with_graph(30, json!({ "graphData": [{ "date": "2025-01-01", "count": 30 }] })),
        );
        let release = tracker.gate(5);
        let view = Arc::new(GraphView::new(tracker.clone(), "s-1"));

        let token = view.select_window(DayWindow::Five).await;
        let pending = {
            let view = Arc::clone(&view);
            tokio::spawn(async move { view.fetch(token).await })
        };
        while !tracker.calls().contains(&"graph:s-1:5".to_string()) {
            tokio::task::yield_now().await;
        }

        assert!(view.load(DayWindow::Thirty).await);
        release.send(()).unwrap();
        assert!(!pending.await.unwrap());

        let snapshot = view.snapshot().await;
        assert_eq!(snapshot.days, 30);
        assert_eq!(snapshot.series.unwrap().max, 30);
        assert_eq!(tracker.calls(), vec!["graph:s-1:5", "graph:s-1:30"]);
    }
}
