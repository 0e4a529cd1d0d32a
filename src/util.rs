use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn format_size(value: f64) -> String {
    const UNITS: [&str; 4] = ["", "K", "M", "B"];

    let mut scaled = value.max(0.0);
    let mut unit = 0usize;
    while scaled >= 1000.0 && unit < UNITS.len() - 1 {
        scaled /= 1000.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{scaled:.2}")
    } else {
        format!("{scaled:.2}{}", UNITS[unit])
    }
}

pub fn short_symbol(symbol: &str) -> &str {
    symbol
        .rsplit_once('.')
        .map(|(base, _exchange)| base)
        .filter(|base| !base.is_empty())
        .unwrap_or(symbol)
}

/// Maps a key to a stable value in `[0, 1)`.
pub fn stable_unit<T: Hash + ?Sized>(key: &T) -> f32 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    let hash = hasher.finish();

    ((hash >> 40) as f64 / (1u64 << 24) as f64) as f32
}
