//! Request and response DTOs.
//!
//! Request DTOs decode under the strict codec rules: unknown keys are
//! rejected, missing keys fall back to zero values so the validator can
//! report them as "must be provided". Response types are the per-endpoint
//! envelopes; every success body is one of these.

use serde::{Deserialize, Serialize};

use cinelog_catalog::{Title, TitleDraft};
use cinelog_observability::MetricsSnapshot;
use cinelog_store::{PoolStats, TitleFilter};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /v1/titles`. An `id` key here is unknown and rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateTitleRequest {
    pub title_type: String,
    pub title: String,
    pub director: String,
    pub country: String,
    pub release_year: i32,
}

impl CreateTitleRequest {
    pub fn into_draft(self) -> TitleDraft {
        TitleDraft {
            title_type: self.title_type,
            title: self.title,
            director: self.director,
            country: self.country,
            release_year: self.release_year,
        }
    }
}

/// Body of `PUT /v1/titles/:id`.
///
/// Unlike create, this one tolerates an `id` key so that clients may echo
/// a previously fetched title back unmodified; the value is ignored in
/// favor of the path parameter.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReplaceTitleRequest {
    pub id: Option<i64>,
    pub title_type: String,
    pub title: String,
    pub director: String,
    pub country: String,
    pub release_year: i32,
}

impl ReplaceTitleRequest {
    pub fn into_draft(self) -> TitleDraft {
        TitleDraft {
            title_type: self.title_type,
            title: self.title,
            director: self.director,
            country: self.country,
            release_year: self.release_year,
        }
    }
}

/// Query string of `GET /v1/titles`; absent parameters mean "match all".
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListTitlesQuery {
    pub title_type: String,
    pub title: String,
    pub director: String,
    pub country: String,
}

impl ListTitlesQuery {
    pub fn into_filter(self) -> TitleFilter {
        TitleFilter {
            title: self.title,
            country: self.country,
            title_type: self.title_type,
            director: self.director,
        }
    }
}

// -------------------------
// Response envelopes
// -------------------------

#[derive(Debug, Serialize)]
pub struct TitleEnvelope {
    pub title: Title,
}

#[derive(Debug, Serialize)]
pub struct TitlesEnvelope {
    pub titles: Vec<Title>,
}

#[derive(Debug, Serialize)]
pub struct MessageEnvelope {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthcheckEnvelope {
    pub status: &'static str,
    pub system_info: SystemInfo,
}

#[derive(Debug, Serialize)]
pub struct SystemInfo {
    pub environment: String,
    pub version: &'static str,
}

/// Body of `GET /debug/vars`: process facts plus the request counters.
#[derive(Debug, Serialize)]
pub struct DebugVars {
    pub version: &'static str,
    pub timestamp: i64,
    pub database: PoolStats,
    #[serde(flatten)]
    pub metrics: MetricsSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_defaults_missing_fields_to_zero_values() {
        let req: CreateTitleRequest = serde_json::from_str(r#"{"title": "Arrival"}"#).unwrap();
        assert_eq!(req.title, "Arrival");
        assert_eq!(req.title_type, "");
        assert_eq!(req.release_year, 0);
    }

    #[test]
    fn create_request_rejects_an_id_key() {
        let result = serde_json::from_str::<CreateTitleRequest>(r#"{"id": 7, "title": "x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn replace_request_tolerates_an_echoed_id() {
        let req: ReplaceTitleRequest =
            serde_json::from_str(r#"{"id": 7, "title": "Arrival", "release_year": 2016}"#).unwrap();
        assert_eq!(req.id, Some(7));
        assert_eq!(req.into_draft().release_year, 2016);
    }

    #[test]
    fn list_query_maps_onto_the_store_filter() {
        let query = ListTitlesQuery {
            title_type: "Movie".to_string(),
            ..ListTitlesQuery::default()
        };
        let filter = query.into_filter();
        assert_eq!(filter.title_type, "Movie");
        assert_eq!(filter.title, "");
    }

    #[test]
    fn debug_vars_flatten_the_counter_names() {
        let vars = DebugVars {
            version: "1.0.0",
            timestamp: 0,
            database: PoolStats::default(),
            metrics: MetricsSnapshot {
                total_requests_received: 3,
                total_responses_sent: 2,
                total_processing_time_microseconds: 40,
                total_responses_sent_by_status: Default::default(),
            },
        };
        let json = serde_json::to_value(&vars).unwrap();
        assert_eq!(json["total_requests_received"], 3);
        assert_eq!(json["database"]["open_connections"], 0);
    }
}
