//! Places dataset loading.
//!
//! The dataset is read fresh per request; edits to `places.json` show
//! up on the next call without a restart. A missing or malformed file
//! degrades to an empty dataset, never a request failure.

use crate::models::place::PlaceRecord;
use std::path::Path;

pub async fn load_places(path: &Path) -> Vec<PlaceRecord> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read places dataset");
            return Vec::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(places) => places,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to parse places dataset");
            Vec::new()
        }
    }
}
