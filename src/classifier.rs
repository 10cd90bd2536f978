use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

const HOME_PATHS: &[&str] = &["/de/", "/en/", "/"];

const BLOG_PATHS: &[&str] = &[
    "/magazin",
    "/blog",
    "/news",
    "/pressemitteilungen",
    "/post",
    "/press",
];

const ABOUT_PATHS: &[&str] = &[
    "/ueber-uns",
    "/about-us",
    "/team",
    "/careers",
    "/jobs",
    "/kontakt",
    "/contact",
];

const LEGAL_PATHS: &[&str] = &["/legal", "/privacy", "/terms", "/imprint", "/compliance"];

const SERVICE_PATHS: &[&str] = &["/service/", "/support/", "/faq", "/help"];

const BUSINESS_PATHS: &[&str] = &["/b2b/", "/gewerbe", "/business"];

/// Category of a page, derived from its URL path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageCategory {
    Homepage,
    Product,
    Blog,
    About,
    Legal,
    Service,
    Business,
    Other,
}

impl PageCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageCategory::Homepage => "homepage",
            PageCategory::Product => "product",
            PageCategory::Blog => "blog",
            PageCategory::About => "about",
            PageCategory::Legal => "legal",
            PageCategory::Service => "service",
            PageCategory::Business => "business",
            PageCategory::Other => "other",
        }
    }

    pub fn is_product(&self) -> bool {
        matches!(self, PageCategory::Product)
    }
}

impl fmt::Display for PageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a URL path against a site's product-path patterns.
///
/// Rules are applied in a fixed order: exact home paths, product patterns,
/// then blog, about, legal, service and business substrings.
pub fn classify(path: &str, product_paths: &[String]) -> PageCategory {
    let path = path.to_lowercase();

    if HOME_PATHS.contains(&path.as_str()) {
        return PageCategory::Homepage;
    }

    if product_paths
        .iter()
        .any(|pattern| path.contains(&pattern.to_lowercase()))
    {
        PageCategory::Product
    } else if contains_any(&path, BLOG_PATHS) {
        PageCategory::Blog
    } else if contains_any(&path, ABOUT_PATHS) {
        PageCategory::About
    } else if contains_any(&path, LEGAL_PATHS) {
        PageCategory::Legal
    } else if contains_any(&path, SERVICE_PATHS) {
        PageCategory::Service
    } else if contains_any(&path, BUSINESS_PATHS) {
        PageCategory::Business
    } else {
        PageCategory::Other
    }
}

fn contains_any(path: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| path.contains(p))
}

/// Path component of a URL; the raw string when it does not parse
pub fn url_path(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.to_string(),
    }
}

/// A classifier bound to one site's product-path table
#[derive(Debug, Clone, Default)]
pub struct PageClassifier {
    product_paths: Vec<String>,
}

impl PageClassifier {
    pub fn new(product_paths: &[String]) -> Self {
        Self {
            product_paths: product_paths.iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    pub fn classify_path(&self, path: &str) -> PageCategory {
        classify(path, &self.product_paths)
    }

    pub fn classify_url(&self, url: &str) -> PageCategory {
        let category = self.classify_path(&url_path(url));
        ::log::debug!("Classified {} as {}", url, category);
        category
    }
}
