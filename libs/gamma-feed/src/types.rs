use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Market from Gamma API
///
/// Only the fields the ingest pipeline consumes are modelled; the API
/// returns many more.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GammaMarket {
    pub id: String,

    pub condition_id: Option<String>,

    pub question: String,

    pub description: Option<String>,

    pub slug: Option<String>,

    pub image: Option<String>,

    pub icon: Option<String>,

    /// Raw outcomes field. The API is inconsistent: sometimes a JSON array,
    /// sometimes a JSON-encoded string containing the array.
    pub outcomes: Option<OutcomesField>,

    pub category: Option<String>,

    pub end_date: Option<String>,

    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub archived: bool,

    #[serde(default)]
    pub events: Vec<GammaEvent>,
}

impl GammaMarket {
    /// Decoded outcome labels, `None` when the field is missing or malformed
    pub fn outcome_list(&self) -> Option<Vec<String>> {
        self.outcomes.as_ref().and_then(OutcomesField::decode)
    }

    /// Parse end date as DateTime
    pub fn end_datetime(&self) -> Option<DateTime<Utc>> {
        let raw = self.end_date.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Expiry as epoch milliseconds, the representation deployment consumes
    pub fn expiry_ms(&self) -> Option<i64> {
        self.end_datetime().map(|dt| dt.timestamp_millis())
    }

    /// First event reference, if the source attached any
    pub fn event_ref(&self) -> Option<&GammaEvent> {
        self.events.first()
    }
}

/// Outcomes as delivered by the API: a literal array or a JSON-encoded string
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutcomesField {
    List(Vec<String>),
    Encoded(String),
}

impl OutcomesField {
    /// Normalize into a plain list of outcome labels
    ///
    /// Handles both single-encoded (`["Yes","No"]`) and double-encoded
    /// (`"[\"Yes\", \"No\"]"`) string payloads. Returns `None` when the
    /// string cannot be decoded into a string array.
    pub fn decode(&self) -> Option<Vec<String>> {
        match self {
            OutcomesField::List(list) => Some(list.clone()),
            OutcomesField::Encoded(raw) => {
                if let Ok(inner) = serde_json::from_str::<String>(raw) {
                    if let Ok(list) = serde_json::from_str::<Vec<String>>(&inner) {
                        return Some(list);
                    }
                }
                serde_json::from_str::<Vec<String>>(raw).ok()
            }
        }
    }
}

/// Event from Gamma API, attached to markets that belong to a larger group
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GammaEvent {
    pub id: Option<String>,

    pub title: Option<String>,

    pub image: Option<String>,

    pub icon: Option<String>,

    pub category: Option<String>,

    pub active: Option<bool>,

    pub closed: Option<bool>,

    pub archived: Option<bool>,
}

impl GammaEvent {
    /// An event is usable for grouping while the source still lists it live
    pub fn is_live(&self) -> bool {
        self.active.unwrap_or(true) && !self.closed.unwrap_or(false)
    }
}

/// Filters for querying Gamma API
#[derive(Debug, Clone, Default)]
pub struct GammaFilters {
    pub active: Option<bool>,
    pub closed: Option<bool>,
    pub archived: Option<bool>,
    pub end_date_min: Option<DateTime<Utc>>,
    pub end_date_max: Option<DateTime<Utc>>,
    pub liquidity_min: Option<f64>,
    pub volume_min: Option<f64>,
}

impl GammaFilters {
    /// Build query parameters for HTTP request
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(active) = self.active {
            params.push(("active".to_string(), active.to_string()));
        }

        if let Some(closed) = self.closed {
            params.push(("closed".to_string(), closed.to_string()));
        }

        if let Some(archived) = self.archived {
            params.push(("archived".to_string(), archived.to_string()));
        }

        if let Some(end_date_min) = self.end_date_min {
            params.push(("end_date_min".to_string(), end_date_min.to_rfc3339()));
        }

        if let Some(end_date_max) = self.end_date_max {
            params.push(("end_date_max".to_string(), end_date_max.to_rfc3339()));
        }

        if let Some(liquidity_min) = self.liquidity_min {
            params.push(("liquidity_num_min".to_string(), liquidity_min.to_string()));
        }

        if let Some(volume_min) = self.volume_min {
            params.push(("volume_num_min".to_string(), volume_min.to_string()));
        }

        params
    }
}
