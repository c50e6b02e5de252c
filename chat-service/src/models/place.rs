use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One entry of the places dataset.
///
/// The dataset is hand-maintained JSON: any field may be missing, and
/// `id`/`century` appear both as strings and as bare numbers. Unknown
/// keys (coordinates for the map page, etc.) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceRecord {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub cat: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub century: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
