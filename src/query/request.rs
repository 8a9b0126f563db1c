// src/query/request.rs

use crate::config::consts::{BASE_URL, DATASET, DEFAULT_PER_PAGE, MAX_PER_PAGE};
use crate::config::Credential;
use crate::error::{Result, ScorecardError};

use super::{FieldSpec, Filter};

/// Everything needed to compose one request URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub base: String,
    pub dataset: String,
    pub filter: Filter,
    /// Order is kept in the query string and in the resulting columns.
    pub fields: Vec<FieldSpec>,
    pub per_page: u32,
    pub page: u32,
    pub credential: Credential,
}

impl RequestDescriptor {
    /// Default endpoint, no fields, first page.
    pub fn new(filter: Filter, credential: Credential) -> Self {
        Self {
            base: s!(BASE_URL),
            dataset: s!(DATASET),
            filter,
            fields: Vec::new(),
            per_page: DEFAULT_PER_PAGE,
            page: 0,
            credential,
        }
    }

    pub fn endpoint(mut self, base: &str, dataset: &str) -> Self {
        self.base = s!(base);
        self.dataset = s!(dataset);
        self
    }

    pub fn fields<I, F>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FieldSpec>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Same descriptor, another page.
    pub fn with_page(&self, page: u32) -> Self {
        let mut next = self.clone();
        next.page = page;
        next
    }

    /// Compose the request URL. Pure string work; never fails.
    ///
    /// `base + dataset ? filter &fields=a,b &per_page=N &page=N &api_key=K`
    pub fn url(&self) -> String {
        let fields = self.fields.iter().map(|f| f.to_string()).collect::<Vec<_>>().join(",");
        format!(
            "{}{}?{}&fields={}&per_page={}&page={}&api_key={}",
            self.base,
            self.dataset,
            self.filter.to_query(),
            fields,
            self.per_page,
            self.page,
            self.credential.expose(),
        )
    }

    /// Pre-flight checks, run before anything goes on the wire.
    pub fn validate(&self) -> Result<()> {
        if !(self.base.starts_with("https://") || self.base.starts_with("http://")) {
            return Err(ScorecardError::InvalidRequest(format!(
                "base endpoint `{}` is not an http(s) URL",
                self.base
            )));
        }
        if self.dataset.trim().is_empty() {
            return Err(ScorecardError::InvalidRequest(s!("dataset path is empty")));
        }
        if self.dataset.contains('?') || self.base.contains('?') {
            return Err(ScorecardError::InvalidRequest(s!(
                "base and dataset must not carry a query string"
            )));
        }
        if self.per_page == 0 {
            return Err(ScorecardError::InvalidRequest(s!("per_page must be at least 1")));
        }
        if self.per_page > MAX_PER_PAGE {
            tracing::warn!(per_page = self.per_page, max = MAX_PER_PAGE, "per_page above server maximum; it will be clamped");
        }
        if self.fields.is_empty() {
            tracing::warn!("no fields requested; the server returns only its default columns");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc() -> RequestDescriptor {
        RequestDescriptor::new(
            "latest.student.size__range=25000..".parse().unwrap(),
            Credential::new("KEY").unwrap(),
        )
    }

    #[test]
    fn url_layout() {
        let d = desc().fields(["id", "school.name"]);
        assert_eq!(
            d.url(),
            "https://api.data.gov/ed/collegescorecard/v1/schools.json?\
             latest.student.size__range=25000..&fields=id,school.name&per_page=100&page=0&api_key=KEY"
        );
    }

    #[test]
    fn validate_rejects_bad_descriptors() {
        assert!(desc().per_page(0).validate().is_err());
        assert!(desc().endpoint("ftp://x/", "schools.json").validate().is_err());
        assert!(desc().endpoint("https://x/", " ").validate().is_err());
        assert!(desc().endpoint("https://x/", "schools.json?a=1").validate().is_err());
        assert!(desc().per_page(500).validate().is_ok());
        assert!(desc().validate().is_ok());
    }

    #[test]
    fn with_page_only_changes_page() {
        let d = desc().page(2);
        let n = d.with_page(3);
        assert_eq!(n.page, 3);
        assert_eq!(n.filter, d.filter);
    }
}
