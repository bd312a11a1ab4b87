// src/models.rs
use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Stock,
    MutualFund,
    Gold,
    Silver,
}

impl AssetClass {
    /// Commodity requests always project the fixed futures contract,
    /// whatever symbol the caller supplied.
    pub fn canonical_symbol<'a>(&self, requested: &'a str) -> &'a str {
        match self {
            AssetClass::Gold => "GC=F",
            AssetClass::Silver => "SI=F",
            AssetClass::Stock | AssetClass::MutualFund => requested,
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetClass::Stock => "stock",
            AssetClass::MutualFund => "mutual_fund",
            AssetClass::Gold => "gold",
            AssetClass::Silver => "silver",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRequest {
    pub asset_class: AssetClass,
    pub symbol: String,
    pub invested_amount: f64,
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    #[serde(default)]
    pub eps: Option<f64>,
    #[serde(default)]
    pub roe: Option<f64>,
    #[serde(default)]
    pub debt_to_equity: Option<f64>,
}

/// Annualized drift and volatility, cached independently of any one
/// projection so a single estimation serves every invested amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    pub mu: f64,
    pub sigma: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HorizonOutcome {
    pub expected_value: f64,
    pub best_case: f64,
    pub worst_case: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub params: ModelParameters,
    /// Horizon in years -> projected outcome. JSON keys are "1".."10".
    pub projection: BTreeMap<u32, HorizonOutcome>,
    /// True when the result did not derive from real fetched history.
    pub is_simulated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceQuote {
    pub symbol: String,
    /// Current (latest) closing price.
    pub c: f64,
    /// Previous closing price.
    pub pc: f64,
}

/// Company financial ratios used as heuristic drift/volatility
/// adjustments. Every field is best-effort; a total lookup failure
/// serializes as `{}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fundamentals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pe_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roe: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt_to_equity: Option<f64>,
}

impl Fundamentals {
    /// Fill any missing ratios from a secondary source. Values already
    /// present always win.
    pub fn or_else_from(mut self, fallback: &Fundamentals) -> Fundamentals {
        self.pe_ratio = self.pe_ratio.or(fallback.pe_ratio);
        self.eps = self.eps.or(fallback.eps);
        self.roe = self.roe.or(fallback.roe);
        self.debt_to_equity = self.debt_to_equity.or(fallback.debt_to_equity);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commodity_symbols_are_canonicalized() {
        assert_eq!(AssetClass::Gold.canonical_symbol("ANY_GOLD_NAME"), "GC=F");
        assert_eq!(AssetClass::Silver.canonical_symbol("XAG"), "SI=F");
        assert_eq!(AssetClass::Stock.canonical_symbol("AAPL"), "AAPL");
        assert_eq!(AssetClass::MutualFund.canonical_symbol("VFIAX"), "VFIAX");
    }

    #[test]
    fn asset_class_deserializes_from_snake_case() {
        let parsed: AssetClass = serde_json::from_str("\"mutual_fund\"").unwrap();
        assert_eq!(parsed, AssetClass::MutualFund);
        assert_eq!(parsed.to_string(), "mutual_fund");
    }

    #[test]
    fn empty_fundamentals_serialize_as_empty_object() {
        let body = serde_json::to_string(&Fundamentals::default()).unwrap();
        assert_eq!(body, "{}");
    }

    #[test]
    fn supplied_fundamentals_win_over_fetched() {
        let supplied = Fundamentals {
            pe_ratio: Some(12.0),
            ..Default::default()
        };
        let fetched = Fundamentals {
            pe_ratio: Some(90.0),
            roe: Some(0.3),
            ..Default::default()
        };
        let merged = supplied.or_else_from(&fetched);
        assert_eq!(merged.pe_ratio, Some(12.0));
        assert_eq!(merged.roe, Some(0.3));
        assert_eq!(merged.eps, None);
    }
}
