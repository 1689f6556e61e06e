//! The project listing behind the portfolio gallery.
//!
//! The listing is a JSON array of [`Project`] records, fetched once (over HTTP
//! or from disk) and then filtered in memory.

use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::header::{self, HeaderValue};
use url::Url;

use crate::client::{DEFAULT_TIMEOUT, build_http_client, process_error_response};
use crate::error::{Error, Result};
use crate::observability::{CATALOG_ERRORS, CATALOG_LOADS};
use crate::types::Project;

/// Category name that selects every project.
pub const ALL_CATEGORIES: &str = "All";

/// An in-memory copy of the project listing.
#[derive(Debug, Clone, Default)]
pub struct ProjectCatalog {
    projects: Vec<Project>,
}

impl ProjectCatalog {
    /// Build a catalog from already-parsed projects.
    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    /// Parse a JSON array of projects.
    pub fn from_json(json: &str) -> Result<Self> {
        let projects: Vec<Project> = serde_json::from_str(json).map_err(|e| {
            Error::serialization(
                format!("Failed to parse project listing: {e}"),
                Some(Box::new(e)),
            )
        })?;
        Ok(Self::new(projects))
    }

    /// Read the listing from a local JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|err| {
            CATALOG_ERRORS.click();
            Error::io(format!("failed to read {}", path.display()), err)
        })?;
        let catalog = Self::from_json(&json).inspect_err(|_| CATALOG_ERRORS.click())?;
        CATALOG_LOADS.click();
        tracing::info!(
            path = %path.display(),
            projects = catalog.len(),
            "loaded project listing"
        );
        Ok(catalog)
    }

    /// GET the listing from `url`.
    pub async fn fetch(url: &str, timeout: Option<Duration>) -> Result<Self> {
        let url = Url::parse(url)?;
        let client = build_http_client(timeout.unwrap_or(DEFAULT_TIMEOUT))?;
        let result = async {
            let response = client
                .get(url.clone())
                .header(header::ACCEPT, HeaderValue::from_static("application/json"))
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(process_error_response(response).await);
            }
            let body = response.text().await?;
            Self::from_json(&body)
        }
        .await;
        match &result {
            Ok(catalog) => {
                CATALOG_LOADS.click();
                tracing::info!(url = %url, projects = catalog.len(), "fetched project listing");
            }
            Err(err) => {
                CATALOG_ERRORS.click();
                tracing::warn!(url = %url, error = %err, "failed to fetch project listing");
            }
        }
        result
    }

    /// Load from `source`, treating anything that parses as an http(s) URL as
    /// remote and everything else as a path.
    pub async fn open(source: &str, timeout: Option<Duration>) -> Result<Self> {
        match Url::parse(source) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                Self::fetch(source, timeout).await
            }
            _ => Self::load(source),
        }
    }

    /// Every project, in listing order.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Number of projects.
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// True when the listing is empty.
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Look a project up by id.
    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for project in &self.projects {
            if !categories
                .iter()
                .any(|c| c.eq_ignore_ascii_case(&project.category))
            {
                categories.push(&project.category);
            }
        }
        categories
    }

    /// Projects in `category`, ignoring case.  `None` or [`ALL_CATEGORIES`]
    /// selects everything.
    pub fn filter(&self, category: Option<&str>) -> Vec<&Project> {
        match category {
            None => self.projects.iter().collect(),
            Some(c) if c.eq_ignore_ascii_case(ALL_CATEGORIES) => {
                self.projects.iter().collect()
            }
            Some(c) => self
                .projects
                .iter()
                .filter(|p| p.category.eq_ignore_ascii_case(c))
                .collect(),
        }
    }

    /// Projects carrying `tag`, ignoring case.
    pub fn with_tag(&self, tag: &str) -> Vec<&Project> {
        self.projects.iter().filter(|p| p.has_tag(tag)).collect()
    }
}
