use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::Rng;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use super::entity::Entity;
use super::parse::parse_entities;

/// Source of entity snapshots. Implementations may block; callers run them
/// off the frame loop.
pub trait EntityProvider: Send {
    fn describe(&self) -> String;

    fn fetch(&mut self) -> Result<Vec<Entity>>;
}

// (symbol, name, sector)
const TRACKED_INSTRUMENTS: [(&str, &str, &str); 50] = [
    ("RELIANCE.NS", "Reliance Industries", "Energy"),
    ("TCS.NS", "Tata Consultancy Services", "Technology"),
    ("HDFCBANK.NS", "HDFC Bank", "Finance"),
    ("INFY.NS", "Infosys", "Technology"),
    ("ICICIBANK.NS", "ICICI Bank", "Finance"),
    ("HINDUNILVR.NS", "Hindustan Unilever", "Consumer Goods"),
    ("ITC.NS", "ITC Limited", "Consumer Goods"),
    ("SBIN.NS", "State Bank of India", "Finance"),
    ("BHARTIARTL.NS", "Bharti Airtel", "Telecom"),
    ("KOTAKBANK.NS", "Kotak Mahindra Bank", "Finance"),
    ("LT.NS", "Larsen & Toubro", "Infrastructure"),
    ("AXISBANK.NS", "Axis Bank", "Finance"),
    ("ASIANPAINT.NS", "Asian Paints", "Materials"),
    ("MARUTI.NS", "Maruti Suzuki", "Automotive"),
    ("BAJFINANCE.NS", "Bajaj Finance", "Finance"),
    ("HCLTECH.NS", "HCL Technologies", "Technology"),
    ("WIPRO.NS", "Wipro", "Technology"),
    ("ULTRACEMCO.NS", "UltraTech Cement", "Materials"),
    ("TITAN.NS", "Titan Company", "Consumer Goods"),
    ("SUNPHARMA.NS", "Sun Pharmaceutical", "Pharma"),
    ("TECHM.NS", "Tech Mahindra", "Technology"),
    ("NESTLEIND.NS", "Nestle India", "Consumer Goods"),
    ("NTPC.NS", "NTPC", "Energy"),
    ("POWERGRID.NS", "Power Grid Corporation", "Energy"),
    ("M&M.NS", "Mahindra & Mahindra", "Automotive"),
    ("TATAMOTORS.NS", "Tata Motors", "Automotive"),
    ("BAJAJFINSV.NS", "Bajaj Finserv", "Finance"),
    ("ONGC.NS", "Oil & Natural Gas Corporation", "Energy"),
    ("COALINDIA.NS", "Coal India", "Energy"),
    ("DRREDDY.NS", "Dr. Reddy's Laboratories", "Pharma"),
    ("DIVISLAB.NS", "Divi's Laboratories", "Pharma"),
    ("ADANIPORTS.NS", "Adani Ports", "Infrastructure"),
    ("CIPLA.NS", "Cipla", "Pharma"),
    ("BRITANNIA.NS", "Britannia Industries", "Consumer Goods"),
    ("INDUSINDBK.NS", "IndusInd Bank", "Finance"),
    ("JSWSTEEL.NS", "JSW Steel", "Materials"),
    ("TATASTEEL.NS", "Tata Steel", "Materials"),
    ("HINDALCO.NS", "Hindalco Industries", "Materials"),
    ("GRASIM.NS", "Grasim Industries", "Materials"),
    ("APOLLOHOSP.NS", "Apollo Hospitals", "Healthcare"),
    ("EICHERMOT.NS", "Eicher Motors", "Automotive"),
    ("HEROMOTOCO.NS", "Hero MotoCorp", "Automotive"),
    ("BAJAJ-AUTO.NS", "Bajaj Auto", "Automotive"),
    ("SHREECEM.NS", "Shree Cement", "Materials"),
    ("ADANIENT.NS", "Adani Enterprises", "Infrastructure"),
    ("BPCL.NS", "Bharat Petroleum", "Energy"),
    ("TATACONSUM.NS", "Tata Consumer Products", "Consumer Goods"),
    ("SBILIFE.NS", "SBI Life Insurance", "Finance"),
    ("HDFCLIFE.NS", "HDFC Life Insurance", "Finance"),
    ("IOC.NS", "Indian Oil Corporation", "Energy"),
];

/// Built-in list of tracked NSE instruments. Size and prediction are not
/// part of the list, so every fetch draws a size in `[5, 15)` and a bullish
/// or bearish signal.
pub struct BuiltinProvider {
    rng: StdRng,
}

impl BuiltinProvider {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl EntityProvider for BuiltinProvider {
    fn describe(&self) -> String {
        format!("builtin list ({} instruments)", TRACKED_INSTRUMENTS.len())
    }

    fn fetch(&mut self) -> Result<Vec<Entity>> {
        let entities = TRACKED_INSTRUMENTS
            .iter()
            .enumerate()
            .map(|(index, (symbol, name, sector))| {
                let size = self.rng.gen_range(5.0..15.0);
                let prediction = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                Entity::new(index as i64, *name, *symbol, *sector, size).with_prediction(prediction)
            })
            .collect();
        Ok(entities)
    }
}

pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EntityProvider for JsonFileProvider {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    fn fetch(&mut self) -> Result<Vec<Entity>> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read entity file {}", self.path.display()))?;
        let entities = parse_entities(&raw)
            .with_context(|| format!("failed to parse entity file {}", self.path.display()))?;
        info!(path = %self.path.display(), count = entities.len(), "loaded entity file");
        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn builtin_provider_is_reproducible_with_seed() {
        let first = BuiltinProvider::new(Some(7)).fetch().unwrap();
        let second = BuiltinProvider::new(Some(7)).fetch().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), TRACKED_INSTRUMENTS.len());
    }

    #[test]
    fn builtin_sizes_and_signals_stay_in_range() {
        let entities = BuiltinProvider::new(Some(11)).fetch().unwrap();
        for entity in &entities {
            assert!((5.0..15.0).contains(&entity.size_metric));
            assert!(matches!(entity.prediction, Some(value) if value == 1.0 || value == -1.0));
        }
        let symbols = entities.iter().map(|entity| entity.symbol.as_str()).collect::<HashSet<_>>();
        assert_eq!(symbols.len(), entities.len());
    }

    #[test]
    fn missing_file_reports_path() {
        let mut provider = JsonFileProvider::new("/definitely/not/here.json");
        let error = provider.fetch().unwrap_err();
        assert!(format!("{error:#}").contains("/definitely/not/here.json"));
    }
}
