use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::validate::Validator;

/// Earliest admissible release year (the year of the first film).
pub const EARLIEST_RELEASE_YEAR: i32 = 1888;

/// A persisted catalog entry: one film or series title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title {
    pub id: i64,
    pub title_type: String,
    pub title: String,
    pub director: String,
    pub country: String,
    pub release_year: i32,
}

/// The writable fields of a title, before an id has been assigned.
///
/// Request input decodes into this shape (via the API's DTOs) and both
/// insert and full-replacement update consume it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleDraft {
    pub title_type: String,
    pub title: String,
    pub director: String,
    pub country: String,
    pub release_year: i32,
}

impl Title {
    /// The draft view of a stored title: every writable field, no id.
    /// Echoing this back through `update` is a no-op replacement.
    pub fn to_draft(&self) -> TitleDraft {
        TitleDraft {
            title_type: self.title_type.clone(),
            title: self.title.clone(),
            director: self.director.clone(),
            country: self.country.clone(),
            release_year: self.release_year,
        }
    }
}

/// Run the full rule set for a title draft against `v`.
///
/// Rules run in a fixed order and the validator keeps the first failure
/// per field, so a zero release year reports "must be provided" rather
/// than the range message.
pub fn validate_title(v: &mut Validator, draft: &TitleDraft) {
    v.check(!draft.title_type.is_empty(), "title_type", "must be provided");
    v.check(!draft.title.is_empty(), "title", "must be provided");
    v.check(!draft.director.is_empty(), "director", "must be provided");
    v.check(!draft.country.is_empty(), "country", "must be provided");

    v.check(draft.release_year != 0, "release_year", "must be provided");
    v.check(
        draft.release_year >= EARLIEST_RELEASE_YEAR,
        "release_year",
        "must be greater than 1888",
    );
    v.check(
        draft.release_year <= current_year(),
        "release_year",
        "must not be in the future",
    );
}

fn current_year() -> i32 {
    Utc::now().year()
}
