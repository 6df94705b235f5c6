//! Analytics backend data types
//!
//! Wire names follow the analytics backend (`userId`, `scriptName`,
//! `script`); the descriptive names are accepted as aliases.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A named tracking configuration owned by one identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    #[serde(rename = "scriptId")]
    pub script_id: String,
    #[serde(rename = "scriptName", alias = "name", default)]
    pub name: String,
    /// Embeddable snippet generated by the backend
    #[serde(rename = "script", alias = "snippet", default)]
    pub snippet: Option<String>,
    #[serde(rename = "userId", alias = "ownerId")]
    pub owner_id: String,
}

/// Response of `POST /script`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedScript {
    #[serde(rename = "scriptId")]
    pub script_id: String,
    #[serde(rename = "script", alias = "snippet", default)]
    pub snippet: Option<String>,
    #[serde(rename = "userId", alias = "ownerId", default)]
    pub owner_id: String,
}

/// A single recorded visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRecord {
    #[serde(default)]
    pub script_id: Option<String>,
    #[serde(default)]
    pub ip_address: String,
    /// ISO-8601 timestamp as sent by the tracking snippet
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub page_views: Option<u64>,
}

impl AnalyticsRecord {
    /// Timestamp rendered in local time, or as received if unparseable
    pub fn local_time(&self) -> String {
        match DateTime::parse_from_rfc3339(&self.timestamp) {
            Ok(dt) => dt
                .with_timezone(&Local)
                .format("%-m/%-d/%Y, %-I:%M:%S %p")
                .to_string(),
            Err(_) => self.timestamp.clone(),
        }
    }

    /// City name, or "N/A" when geolocation found none
    pub fn city_label(&self) -> &str {
        match self.city.as_deref() {
            Some(city) if !city.trim().is_empty() => city,
            _ => "N/A",
        }
    }
}

/// One page of visit records
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnalyticsPage {
    #[serde(default)]
    pub documents: Vec<AnalyticsRecord>,
    #[serde(default)]
    pub total: u64,
}

/// Visits on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphPoint {
    pub date: String,
    pub count: u64,
}

impl GraphPoint {
    /// Short date label (e.g., "3/14/2025")
    pub fn label(&self) -> String {
        if let Ok(date) = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d") {
            return date.format("%-m/%-d/%Y").to_string();
        }
        match DateTime::parse_from_rfc3339(&self.date) {
            Ok(dt) => dt.with_timezone(&Utc).format("%-m/%-d/%Y").to_string(),
            Err(_) => self.date.clone(),
        }
    }
}

/// Body posted to `/track` by an embedded snippet
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEvent {
    pub script_id: String,
    #[serde(rename = "userId")]
    pub owner_id: String,
    pub ip_address: String,
    pub timestamp: String,
    pub user_agent: String,
}

impl TrackEvent {
    /// Event stamped with the current time
    pub fn now(
        script_id: impl Into<String>,
        owner_id: impl Into<String>,
        ip_address: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            script_id: script_id.into(),
            owner_id: owner_id.into(),
            ip_address: ip_address.into(),
            timestamp: Utc::now().to_rfc3339(),
            user_agent: user_agent.into(),
        }
    }
}
