//! nav data provider contract and a de-duplicating cache in front of it

pub mod cache;

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::errors::{FetchResult, Result};
use crate::nav::{NavData, NavHistory};
use crate::types::SchemeCode;

pub use cache::RequestCache;

/// mutual fund scheme as listed by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutualFundScheme {
    pub scheme_code: SchemeCode,
    pub scheme_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fund_house: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isin_growth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isin_div_reinvestment: Option<String>,
    /// latest nav, decimal string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav: Option<String>,
    /// date of `nav`, `DD-MM-YYYY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl MutualFundScheme {
    pub fn new(scheme_code: SchemeCode, scheme_name: impl Into<String>) -> Self {
        Self {
            scheme_code,
            scheme_name: scheme_name.into(),
            fund_house: None,
            scheme_type: None,
            scheme_category: None,
            isin_growth: None,
            isin_div_reinvestment: None,
            nav: None,
            date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub scheme_code: SchemeCode,
    pub scheme_name: String,
}

/// scheme metadata of a history response, snake_case on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeMeta {
    pub scheme_code: SchemeCode,
    pub scheme_name: String,
    #[serde(default)]
    pub fund_house: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isin_growth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isin_div_reinvestment: Option<String>,
}

/// nav history response, records ascending by date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeHistory {
    pub meta: SchemeMeta,
    pub data: Vec<NavData>,
}

impl SchemeHistory {
    pub fn nav_history(&self) -> NavHistory {
        NavHistory::from_records(&self.data)
    }

    /// scheme listing built from the metadata and the newest record
    pub fn scheme(&self) -> MutualFundScheme {
        let latest = self.data.last();
        MutualFundScheme {
            scheme_code: self.meta.scheme_code,
            scheme_name: self.meta.scheme_name.clone(),
            fund_house: Some(self.meta.fund_house.clone()).filter(|h| !h.is_empty()),
            scheme_type: self.meta.scheme_type.clone(),
            scheme_category: self.meta.scheme_category.clone(),
            isin_growth: self.meta.isin_growth.clone(),
            isin_div_reinvestment: self.meta.isin_div_reinvestment.clone(),
            nav: latest.map(|r| r.nav.clone()),
            date: latest.map(|r| r.date.clone()),
        }
    }
}

/// external source of scheme listings and nav histories
#[async_trait]
pub trait NavDataSource: Send + Sync {
    async fn fetch_latest_nav(&self, limit: usize, offset: usize) -> FetchResult<Vec<MutualFundScheme>>;

    async fn search_mutual_funds(&self, query: &str) -> FetchResult<Vec<SearchResult>>;

    /// the last `days` days of nav history
    async fn fetch_scheme_history(
        &self,
        scheme_code: SchemeCode,
        days: u32,
    ) -> FetchResult<SchemeHistory>;

    async fn fetch_scheme_details(&self, scheme_code: SchemeCode) -> FetchResult<MutualFundScheme>;
}

/// source wrapper memoizing histories and scheme details
///
/// concurrent requests for the same history or scheme share one call to the
/// inner source. listings and searches always reach the source.
pub struct CachedNavSource<S> {
    source: Arc<S>,
    histories: RequestCache<(SchemeCode, u32), SchemeHistory>,
    details: RequestCache<SchemeCode, MutualFundScheme>,
}

impl<S: NavDataSource + 'static> CachedNavSource<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            histories: RequestCache::new(),
            details: RequestCache::new(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.source
    }

    /// forget everything cached for `scheme_code`'s details and the given history window
    pub fn invalidate(&self, scheme_code: SchemeCode, days: u32) {
        self.histories.invalidate(&(scheme_code, days));
        self.details.invalidate(&scheme_code);
    }
}

#[async_trait]
impl<S: NavDataSource + 'static> NavDataSource for CachedNavSource<S> {
    async fn fetch_latest_nav(&self, limit: usize, offset: usize) -> FetchResult<Vec<MutualFundScheme>> {
        self.source.fetch_latest_nav(limit, offset).await
    }

    async fn search_mutual_funds(&self, query: &str) -> FetchResult<Vec<SearchResult>> {
        self.source.search_mutual_funds(query).await
    }

    async fn fetch_scheme_history(
        &self,
        scheme_code: SchemeCode,
        days: u32,
    ) -> FetchResult<SchemeHistory> {
        let source = Arc::clone(&self.source);
        self.histories
            .get_or_fetch((scheme_code, days), move || async move {
                debug!("fetching {} days of nav history for scheme {}", days, scheme_code);
                source.fetch_scheme_history(scheme_code, days).await
            })
            .await
    }

    async fn fetch_scheme_details(&self, scheme_code: SchemeCode) -> FetchResult<MutualFundScheme> {
        let source = Arc::clone(&self.source);
        self.details
            .get_or_fetch(scheme_code, move || async move {
                debug!("fetching details for scheme {}", scheme_code);
                source.fetch_scheme_details(scheme_code).await
            })
            .await
    }
}

/// fetch and parse a scheme's nav history, surfacing fetch failures unchanged
pub async fn load_nav_history<S: NavDataSource + ?Sized>(
    source: &S,
    scheme_code: SchemeCode,
    days: u32,
) -> Result<NavHistory> {
    let history = source.fetch_scheme_history(scheme_code, days).await?;
    Ok(history.nav_history())
}
