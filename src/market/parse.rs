use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::entity::{Entity, normalize_category, normalize_size};

#[derive(Clone, Debug, Default, Deserialize)]
pub(super) struct RawEntity {
    #[serde(default)]
    pub(super) id: Option<i64>,
    #[serde(default)]
    pub(super) name: Option<String>,
    #[serde(default)]
    pub(super) symbol: Option<String>,
    #[serde(default, alias = "sector")]
    pub(super) category: Option<String>,
    #[serde(default, alias = "sizeMetric", alias = "val")]
    pub(super) size_metric: Option<f64>,
    #[serde(default)]
    pub(super) prediction: Option<f32>,
}

impl RawEntity {
    pub(super) fn into_entity(self, index: usize) -> Entity {
        Entity {
            id: self.id.unwrap_or(index as i64),
            name: self.name.unwrap_or_default(),
            symbol: self.symbol.unwrap_or_default(),
            category: normalize_category(self.category),
            size_metric: normalize_size(self.size_metric),
            prediction: self.prediction.filter(|value| value.is_finite()),
        }
    }
}

/// Parses a JSON array of entity records. Records that are not objects, or
/// whose fields have the wrong type, degrade to sentinel values instead of
/// failing the whole snapshot.
pub(super) fn parse_entities(raw: &str) -> Result<Vec<Entity>> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in entity list")?;
    let records = match parsed {
        Value::Array(records) => records,
        Value::Object(mut object) => match object.remove("entities") {
            Some(Value::Array(records)) => records,
            _ => return Err(anyhow!("expected a JSON array of entities")),
        },
        _ => return Err(anyhow!("expected a JSON array of entities")),
    };

    let mut degraded = 0usize;
    let entities = records
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let raw = RawEntity::deserialize(&value).unwrap_or_else(|_| {
                degraded += 1;
                lenient_record(&value)
            });
            raw.into_entity(index)
        })
        .collect::<Vec<_>>();

    if degraded > 0 {
        warn!(degraded, "entity records with malformed fields were read leniently");
    }

    Ok(entities)
}

fn lenient_record(value: &Value) -> RawEntity {
    let Some(object) = value.as_object() else {
        return RawEntity::default();
    };

    let text = |keys: &[&str]| {
        keys.iter()
            .find_map(|key| object.get(*key).and_then(Value::as_str))
            .map(str::to_owned)
    };
    let number = |keys: &[&str]| {
        keys.iter()
            .find_map(|key| object.get(*key).and_then(Value::as_f64))
    };

    RawEntity {
        id: object.get("id").and_then(Value::as_i64),
        name: text(&["name"]),
        symbol: text(&["symbol"]),
        category: text(&["category", "sector"]),
        size_metric: number(&["size_metric", "sizeMetric", "val"]),
        prediction: number(&["prediction"]).map(|value| value as f32),
    }
}
