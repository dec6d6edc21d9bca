//! Deal context assembly
//!
//! Extracts a property address from free-form deal text and assembles the
//! structured context (property, loan, tenant roll, market comps) that the
//! prompt feeds to the model. Data access goes through [`DealDataSource`]
//! so the backing store is swappable; an in-memory store is provided for
//! demos and tests.
//!
//! Lookup misses and source failures are folded into an `{"error": ...}`
//! JSON payload instead of aborting the analysis — the prompt instructs
//! the model to acknowledge missing data rather than invent it.

use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::error::AnalysisResult;

/// Street-address pattern: house number, street name, a recognized street
/// suffix, then an optional city/state tail (letters only, so trailing zip
/// codes are excluded).
const ADDRESS_PATTERN: &str =
    r"(?i)(\d+\s+[A-Za-z0-9\s,]+?(?:Ave|St|Blvd|Rd|Way|Ln|Dr|Ct)\b[A-Za-z\s,]*)";

fn address_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ADDRESS_PATTERN).expect("address pattern is valid"))
}

/// Extract a potential property address from the user's text input.
pub fn extract_address(input: &str) -> Option<String> {
    let caps = address_regex().captures(input)?;
    let raw = caps.get(1)?.as_str();
    let trimmed = raw.trim().trim_end_matches([',', ' ']);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Subject property record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub property_id: i64,
    pub address: String,
    pub city: String,
    pub state: String,
    pub property_type: String,
    pub year_built: i32,
    pub square_footage: f64,
}

/// Existing loan terms for a property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRecord {
    pub loan_id: i64,
    pub property_id: i64,
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub term_months: u32,
    pub origination_date: NaiveDate,
}

/// One tenant on the rent roll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantRecord {
    pub tenant_id: i64,
    pub property_id: i64,
    pub tenant_name: String,
    pub leased_sqft: f64,
    pub lease_end_date: NaiveDate,
}

/// Comparable sale used for the sales-comparison valuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketComp {
    pub comp_id: i64,
    pub address: String,
    pub state: String,
    pub property_type: String,
    pub sale_price: f64,
    pub square_footage: f64,
    pub price_per_sqft: f64,
}

/// Read access to deal records, keyed the way the context assembly needs
/// them: property by address, then related records by property id.
#[async_trait]
pub trait DealDataSource: Send + Sync {
    async fn property_by_address(&self, address: &str)
        -> AnalysisResult<Option<PropertyRecord>>;
    async fn loan_for_property(&self, property_id: i64) -> AnalysisResult<Option<LoanRecord>>;
    async fn tenants_for_property(&self, property_id: i64) -> AnalysisResult<Vec<TenantRecord>>;
    async fn comps_for_market(
        &self,
        state: &str,
        property_type: &str,
    ) -> AnalysisResult<Vec<MarketComp>>;
}

/// Maximum comps included in a context.
const MAX_COMPS: usize = 5;

/// Assemble the structured deal context for `address` as a JSON string.
///
/// Never fails: any lookup problem becomes an `{"error": ...}` payload so
/// the downstream prompt can acknowledge the gap.
pub async fn build_deal_context(source: &dyn DealDataSource, address: Option<&str>) -> String {
    let address = match address {
        Some(a) if !a.is_empty() => a,
        _ => {
            return json!({ "error": "No address could be extracted from the user input." })
                .to_string();
        }
    };

    let property = match source.property_by_address(address).await {
        Ok(Some(p)) => p,
        Ok(None) => {
            debug!(%address, "no property on record");
            return json!({
                "error": format!("No property found for address like '{}'.", address)
            })
            .to_string();
        }
        Err(e) => {
            warn!(%address, error = %e, "property lookup failed");
            return json!({
                "error": format!("Error accessing deal records. Details: {}", e)
            })
            .to_string();
        }
    };

    let property_id = property.property_id;

    // Related records are best-effort: a failed lookup leaves its slot
    // empty rather than sinking the whole context.
    let loan = source
        .loan_for_property(property_id)
        .await
        .unwrap_or_else(|e| {
            warn!(property_id, error = %e, "loan lookup failed");
            None
        });
    let tenants = source
        .tenants_for_property(property_id)
        .await
        .unwrap_or_else(|e| {
            warn!(property_id, error = %e, "tenant roll lookup failed");
            Vec::new()
        });
    let mut comps = source
        .comps_for_market(&property.state, &property.property_type)
        .await
        .unwrap_or_else(|e| {
            warn!(property_id, error = %e, "market comps lookup failed");
            Vec::new()
        });
    comps.truncate(MAX_COMPS);

    json!({
        "property_details": property,
        "loan_details": loan,
        "tenant_roll": tenants,
        "market_comps": comps,
    })
    .to_string()
}

/// In-memory [`DealDataSource`] backed by plain vectors.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDealStore {
    properties: Vec<PropertyRecord>,
    loans: Vec<LoanRecord>,
    tenants: Vec<TenantRecord>,
    comps: Vec<MarketComp>,
}

impl InMemoryDealStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, property: PropertyRecord) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_loan(mut self, loan: LoanRecord) -> Self {
        self.loans.push(loan);
        self
    }

    pub fn with_tenant(mut self, tenant: TenantRecord) -> Self {
        self.tenants.push(tenant);
        self
    }

    pub fn with_comp(mut self, comp: MarketComp) -> Self {
        self.comps.push(comp);
        self
    }

    /// A small seeded store matching the bundled sample deal text.
    pub fn with_sample_data() -> Self {
        Self::new()
            .with_property(PropertyRecord {
                property_id: 101,
                address: "440 N Wabash Ave".to_string(),
                city: "Chicago".to_string(),
                state: "IL".to_string(),
                property_type: "Office".to_string(),
                year_built: 1998,
                square_footage: 120_000.0,
            })
            .with_loan(LoanRecord {
                loan_id: 201,
                property_id: 101,
                loan_amount: 18_000_000.0,
                interest_rate: 0.0525,
                term_months: 120,
                origination_date: NaiveDate::from_ymd_opt(2019, 6, 1)
                    .expect("valid seed date"),
            })
            .with_tenant(TenantRecord {
                tenant_id: 301,
                property_id: 101,
                tenant_name: "Smith & Jones Law".to_string(),
                leased_sqft: 45_000.0,
                lease_end_date: NaiveDate::from_ymd_opt(2027, 12, 31)
                    .expect("valid seed date"),
            })
            .with_tenant(TenantRecord {
                tenant_id: 302,
                property_id: 101,
                tenant_name: "Lakeshore Dental Group".to_string(),
                leased_sqft: 30_000.0,
                lease_end_date: NaiveDate::from_ymd_opt(2026, 3, 31)
                    .expect("valid seed date"),
            })
            .with_comp(MarketComp {
                comp_id: 401,
                address: "225 W Randolph St".to_string(),
                state: "IL".to_string(),
                property_type: "Office".to_string(),
                sale_price: 30_000_000.0,
                square_footage: 110_000.0,
                price_per_sqft: 272.7,
            })
            .with_comp(MarketComp {
                comp_id: 402,
                address: "500 W Monroe St".to_string(),
                state: "IL".to_string(),
                property_type: "Office".to_string(),
                sale_price: 41_500_000.0,
                square_footage: 155_000.0,
                price_per_sqft: 267.7,
            })
    }
}

#[async_trait]
impl DealDataSource for InMemoryDealStore {
    async fn property_by_address(
        &self,
        address: &str,
    ) -> AnalysisResult<Option<PropertyRecord>> {
        let needle = address.to_lowercase();
        Ok(self
            .properties
            .iter()
            .find(|p| {
                let hay = p.address.to_lowercase();
                hay.contains(&needle) || needle.contains(&hay)
            })
            .cloned())
    }

    async fn loan_for_property(&self, property_id: i64) -> AnalysisResult<Option<LoanRecord>> {
        Ok(self
            .loans
            .iter()
            .find(|l| l.property_id == property_id)
            .cloned())
    }

    async fn tenants_for_property(
        &self,
        property_id: i64,
    ) -> AnalysisResult<Vec<TenantRecord>> {
        Ok(self
            .tenants
            .iter()
            .filter(|t| t.property_id == property_id)
            .cloned()
            .collect())
    }

    async fn comps_for_market(
        &self,
        state: &str,
        property_type: &str,
    ) -> AnalysisResult<Vec<MarketComp>> {
        Ok(self
            .comps
            .iter()
            .filter(|c| c.state == state && c.property_type == property_type)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_address_full() {
        let content = "Please analyze the property at 440 N Wabash Ave, Chicago, IL 60611.";
        assert_eq!(
            extract_address(content).as_deref(),
            Some("440 N Wabash Ave, Chicago, IL")
        );
    }

    #[test]
    fn extract_address_simple() {
        assert_eq!(
            extract_address("Info for 123 Main St").as_deref(),
            Some("123 Main St")
        );
    }

    #[test]
    fn extract_address_none() {
        assert_eq!(extract_address("A building in Chicago."), None);
    }

    #[test]
    fn extract_address_case_insensitive() {
        assert_eq!(
            extract_address("deal at 77 king blvd please").as_deref(),
            Some("77 king blvd please")
        );
    }

    #[tokio::test]
    async fn context_without_address_is_error_payload() {
        let store = InMemoryDealStore::new();
        let out = build_deal_context(&store, None).await;
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(v["error"]
            .as_str()
            .unwrap()
            .contains("No address could be extracted"));
    }

    #[tokio::test]
    async fn context_for_unknown_property_is_error_payload() {
        let store = InMemoryDealStore::with_sample_data();
        let out = build_deal_context(&store, Some("999 Fake St")).await;
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(v["error"].as_str().unwrap().contains("No property found"));
    }

    #[tokio::test]
    async fn context_assembles_related_records_by_property_id() {
        let store = InMemoryDealStore::with_sample_data();
        let out = build_deal_context(&store, Some("440 N Wabash Ave")).await;
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(v["property_details"]["property_id"], 101);
        assert_eq!(v["loan_details"]["loan_id"], 201);
        assert_eq!(v["tenant_roll"].as_array().unwrap().len(), 2);
        assert_eq!(v["tenant_roll"][0]["tenant_id"], 301);
        assert_eq!(v["market_comps"].as_array().unwrap().len(), 2);
        assert_eq!(v["market_comps"][0]["comp_id"], 401);
    }

    #[tokio::test]
    async fn missing_loan_leaves_slot_null() {
        let store = InMemoryDealStore::new().with_property(PropertyRecord {
            property_id: 7,
            address: "1 Elm St".to_string(),
            city: "Springfield".to_string(),
            state: "MA".to_string(),
            property_type: "Retail".to_string(),
            year_built: 1975,
            square_footage: 8_000.0,
        });
        let out = build_deal_context(&store, Some("1 Elm St")).await;
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(v["loan_details"].is_null());
        assert_eq!(v["tenant_roll"].as_array().unwrap().len(), 0);
    }
}
