use crate::error::UnknownSiteError;
use serde::{Deserialize, Serialize};

/// Product-path vocabulary of one site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteProfile {
    /// Identifier, also the token searched for in the sitemap
    pub id: String,

    /// Path substrings that mark product pages (matched case-insensitively)
    pub product_paths: Vec<String>,
}

impl SiteProfile {
    pub fn new(id: &str, product_paths: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            product_paths: product_paths.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Profiles shipped with the crate
    pub fn builtin() -> Vec<SiteProfile> {
        vec![
            SiteProfile::new(
                "1komma5",
                &[
                    "/solaranlage/",
                    "/waermepumpe/",
                    "/stromspeicher/",
                    "/wallbox/",
                    "/heartbeat/",
                    "/solar-pv",
                    "/battery-storage",
                    "/smart-ev-charging",
                    "/smart-hvac",
                ],
            ),
            SiteProfile::new(
                "ostrom",
                &[
                    "/our-tariff",
                    "/dynamic-pricing",
                    "/simplyfair",
                    "/simplydynamic",
                    "/smart-meter",
                    "/ostrom-price-cap",
                    "/smart-heating",
                    "/solar-pv",
                    "/battery-storage",
                    "/virtual-power-plant",
                    "/smart",
                ],
            ),
            SiteProfile::new(
                "spotmyenergy",
                &[
                    "/produkte",
                    "/smart-meter",
                    "/dynamischer-stromtarif",
                    "/home-energy-management-system-hems",
                ],
            ),
        ]
    }

    /// Picks the first profile whose id occurs in the sitemap text
    pub fn detect<'a>(
        profiles: &'a [SiteProfile],
        sitemap: &str,
    ) -> Result<&'a SiteProfile, UnknownSiteError> {
        profiles
            .iter()
            .find(|profile| sitemap.contains(profile.id.as_str()))
            .ok_or_else(|| UnknownSiteError {
                known: profiles
                    .iter()
                    .map(|p| p.id.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}
