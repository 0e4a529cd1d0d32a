pub const UNCATEGORIZED: &str = "uncategorized";

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: i64,
    pub name: String,
    pub symbol: String,
    pub category: String,
    pub size_metric: f64,
    pub prediction: Option<f32>,
}

impl Entity {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        symbol: impl Into<String>,
        category: impl Into<String>,
        size_metric: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            symbol: symbol.into(),
            category: normalize_category(Some(category.into())),
            size_metric: normalize_size(Some(size_metric)),
            prediction: None,
        }
    }

    pub fn with_prediction(mut self, prediction: f32) -> Self {
        self.prediction = prediction.is_finite().then_some(prediction);
        self
    }
}

pub(crate) fn normalize_category(category: Option<String>) -> String {
    match category {
        Some(value) if !value.trim().is_empty() => value.trim().to_owned(),
        _ => UNCATEGORIZED.to_owned(),
    }
}

pub(crate) fn normalize_size(size: Option<f64>) -> f64 {
    match size {
        Some(value) if value.is_finite() && value >= 0.0 => value,
        _ => 0.0,
    }
}

#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub revision: u64,
    pub entities: Vec<Entity>,
}

impl Snapshot {
    pub fn new(revision: u64, entities: Vec<Entity>) -> Self {
        Self { revision, entities }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }
}
