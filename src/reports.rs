//! Report query parameters kept in session-scoped storage

use crate::error::{Error, Result};
use crate::storage::KeyValueStore;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Regulatory liquidity reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Liquidity Coverage Ratio
    Lcr,
    /// Net Stable Funding Ratio
    Nsfr,
    /// Net Cumulative Cash Flow
    Nccf,
    /// Internal Liquidity Stress Test
    Ilst,
}

impl ReportKind {
    pub const ALL: [ReportKind; 4] = [
        ReportKind::Lcr,
        ReportKind::Nsfr,
        ReportKind::Nccf,
        ReportKind::Ilst,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Lcr => "lcr",
            ReportKind::Nsfr => "nsfr",
            ReportKind::Nccf => "nccf",
            ReportKind::Ilst => "ilst",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::Lcr => "LCR",
            ReportKind::Nsfr => "NSFR",
            ReportKind::Nccf => "NCCF",
            ReportKind::Ilst => "ILST",
        }
    }

    pub fn path(&self) -> String {
        format!("/reports/{}", self.as_str())
    }

    /// Session storage key of the last used filters
    pub fn storage_key(&self) -> String {
        format!("{}_query_params", self.as_str())
    }

    pub fn from_path(path: &str) -> Option<Self> {
        path.strip_prefix("/reports/")
            .and_then(|rest| rest.trim_end_matches('/').parse().ok())
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for ReportKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        ReportKind::ALL
            .into_iter()
            .find(|k| k.as_str() == lower)
            .ok_or_else(|| Error::InvalidFilters(format!("unknown report '{}'", s)))
    }
}

/// Filter form of a report view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_date: Option<NaiveDate>,
}

impl ReportFilters {
    pub fn is_empty(&self) -> bool {
        self == &ReportFilters::default()
    }

    /// Parse a view query string; blank fields count as unset
    pub fn from_query(query: &str) -> Result<Self> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
            .map_err(|e| Error::InvalidFilters(e.to_string()))?;

        let mut filters = Self::default();
        for (key, value) in pairs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                "region" => filters.region = Some(value.to_string()),
                "segment" => filters.segment = Some(value.to_string()),
                "priorDate" | "prior_date" => filters.prior_date = Some(parse_date(&key, value)?),
                "currentDate" | "current_date" => {
                    filters.current_date = Some(parse_date(&key, value)?)
                }
                _ => {}
            }
        }
        filters.validate()?;
        Ok(filters)
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(prior), Some(current)) = (self.prior_date, self.current_date) {
            if prior > current {
                return Err(Error::InvalidFilters(format!(
                    "prior date {} is after current date {}",
                    prior, current
                )));
            }
        }
        for (name, value) in [("region", &self.region), ("segment", &self.segment)] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(Error::InvalidFilters(format!("{} must not be blank", name)));
            }
        }
        Ok(())
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    value
        .parse()
        .map_err(|_| Error::InvalidFilters(format!("{} '{}' is not a YYYY-MM-DD date", field, value)))
}

/// Last used filters per report
#[derive(Clone)]
pub struct ReportQueryStore {
    store: Arc<dyn KeyValueStore>,
    namespace: Option<String>,
}

impl ReportQueryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            namespace: None,
        }
    }

    /// Keys are prefixed with `namespace`, e.g. one namespace per user
    pub fn scoped(&self, namespace: impl Into<String>) -> Self {
        Self {
            store: Arc::clone(&self.store),
            namespace: Some(namespace.into()),
        }
    }

    fn key(&self, kind: ReportKind) -> String {
        match &self.namespace {
            Some(ns) => format!("{}:{}", ns, kind.storage_key()),
            None => kind.storage_key(),
        }
    }

    pub fn save(&self, kind: ReportKind, filters: &ReportFilters) -> Result<()> {
        filters.validate()?;
        self.store
            .set(&self.key(kind), &serde_json::to_string(filters)?)
    }

    /// Saved filters; an unreadable blob is dropped and reads as none
    pub fn load(&self, kind: ReportKind) -> Result<Option<ReportFilters>> {
        let Some(blob) = self.store.get(&self.key(kind))? else {
            return Ok(None);
        };
        match serde_json::from_str(&blob) {
            Ok(filters) => Ok(Some(filters)),
            Err(e) => {
                tracing::warn!("Dropping unreadable {} filters: {}", kind, e);
                self.store.remove(&self.key(kind))?;
                Ok(None)
            }
        }
    }

    pub fn clear(&self, kind: ReportKind) -> Result<()> {
        self.store.remove(&self.key(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_report_kind_keys_and_paths() {
        assert_eq!(ReportKind::Lcr.storage_key(), "lcr_query_params");
        assert_eq!(ReportKind::Ilst.path(), "/reports/ilst");
        assert_eq!(ReportKind::from_path("/reports/nccf"), Some(ReportKind::Nccf));
        assert_eq!(ReportKind::from_path("/dashboard"), None);
        assert_eq!("NSFR".parse::<ReportKind>().unwrap(), ReportKind::Nsfr);
    }

    #[test]
    fn test_prior_after_current_is_rejected() {
        let filters = ReportFilters {
            prior_date: Some(date("2024-06-30")),
            current_date: Some(date("2024-03-31")),
            ..Default::default()
        };
        assert!(matches!(filters.validate(), Err(Error::InvalidFilters(_))));
    }

    #[test]
    fn test_from_query() {
        let filters =
            ReportFilters::from_query("region=EMEA&segment=&priorDate=2024-03-31&current_date=2024-06-30&page=2")
                .unwrap();
        assert_eq!(filters.region.as_deref(), Some("EMEA"));
        assert_eq!(filters.segment, None);
        assert_eq!(filters.prior_date, Some(date("2024-03-31")));
        assert_eq!(filters.current_date, Some(date("2024-06-30")));

        assert!(ReportFilters::from_query("").unwrap().is_empty());
        assert!(ReportFilters::from_query("priorDate=yesterday").is_err());
        assert!(ReportFilters::from_query("priorDate=2024-06-30&currentDate=2024-01-01").is_err());
    }

    #[test]
    fn test_save_load_clear() {
        let queries = ReportQueryStore::new(Arc::new(MemoryStore::new()));
        let filters = ReportFilters {
            region: Some("EMEA".to_string()),
            segment: Some("Retail".to_string()),
            prior_date: Some(date("2024-03-31")),
            current_date: Some(date("2024-06-30")),
        };

        queries.save(ReportKind::Lcr, &filters).unwrap();
        assert_eq!(queries.load(ReportKind::Lcr).unwrap(), Some(filters));
        assert_eq!(queries.load(ReportKind::Nsfr).unwrap(), None);

        queries.clear(ReportKind::Lcr).unwrap();
        assert_eq!(queries.load(ReportKind::Lcr).unwrap(), None);
    }

    #[test]
    fn test_stored_blob_uses_camel_case() {
        let store = Arc::new(MemoryStore::new());
        let queries = ReportQueryStore::new(store.clone());
        let filters = ReportFilters {
            prior_date: Some(date("2024-03-31")),
            ..Default::default()
        };
        queries.save(ReportKind::Nccf, &filters).unwrap();
        let blob = store.get("nccf_query_params").unwrap().unwrap();
        assert_eq!(blob, r#"{"priorDate":"2024-03-31"}"#);
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let queries = ReportQueryStore::new(Arc::new(MemoryStore::new()));
        let maker = queries.scoped("maker1");
        let checker = queries.scoped("checker1");

        let filters = ReportFilters {
            region: Some("APAC".to_string()),
            ..Default::default()
        };
        maker.save(ReportKind::Ilst, &filters).unwrap();
        assert!(checker.load(ReportKind::Ilst).unwrap().is_none());
        assert!(queries.load(ReportKind::Ilst).unwrap().is_none());
        assert_eq!(maker.load(ReportKind::Ilst).unwrap(), Some(filters));
    }

    #[test]
    fn test_unreadable_blob_reads_as_none() {
        let store = Arc::new(MemoryStore::new());
        store.set("lcr_query_params", "{broken").unwrap();
        let queries = ReportQueryStore::new(store.clone());
        assert_eq!(queries.load(ReportKind::Lcr).unwrap(), None);
        assert!(store.get("lcr_query_params").unwrap().is_none());
    }
}
