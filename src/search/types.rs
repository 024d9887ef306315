//! Brave API response shapes
//!
//! Upstream payloads are parsed permissively: absent or `null` collections
//! become empty, absent scalars become `None`. Placeholder substitution happens
//! later, at the formatting boundary.

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// Location id → free-text description
pub type DescriptionMap = HashMap<String, String>;

/// Treat an explicit JSON `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Raw `web/search` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebSearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub web: WebSection,
    #[serde(default, deserialize_with = "null_as_default")]
    pub locations: LocationSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebSection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<RawWebResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWebResult {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationSection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<RawLocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLocation {
    pub id: Option<String>,
    pub title: Option<String>,
}

/// One general web search hit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebResult {
    pub title: String,
    pub description: String,
    pub url: String,
}

/// Location identifier from the `locations` section of a web search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRef {
    pub id: String,
}

/// Parsed web search: ranked results plus any location references
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebSearchPage {
    pub results: Vec<WebResult>,
    pub locations: Vec<LocationRef>,
}

impl WebSearchPage {
    /// Ids of every referenced location, in response order
    pub fn location_ids(&self) -> Vec<String> {
        self.locations.iter().map(|l| l.id.clone()).collect()
    }
}

impl From<WebSearchResponse> for WebSearchPage {
    fn from(response: WebSearchResponse) -> Self {
        let results = response
            .web
            .results
            .into_iter()
            .map(|r| WebResult {
                title: r.title.unwrap_or_default(),
                description: r.description.unwrap_or_default(),
                url: r.url.unwrap_or_default(),
            })
            .collect();

        let locations = response
            .locations
            .results
            .into_iter()
            .filter_map(|l| l.id.map(|id| LocationRef { id }))
            .collect();

        Self { results, locations }
    }
}

/// Raw `local/pois` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoiResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<Poi>,
}

/// Point of interest record
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poi {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub address: Option<PoiAddress>,
    pub phone: Option<String>,
    pub rating: Option<PoiRating>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub opening_hours: Vec<String>,
    pub price_range: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoiAddress {
    pub street_address: Option<String>,
    pub address_locality: Option<String>,
    pub address_region: Option<String>,
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoiRating {
    pub rating_value: Option<f64>,
    pub rating_count: Option<u64>,
}

/// Raw `local/descriptions` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DescriptionsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub descriptions: HashMap<String, Option<String>>,
}

impl DescriptionsResponse {
    pub fn into_map(self) -> DescriptionMap {
        self.descriptions
            .into_iter()
            .filter_map(|(id, text)| text.map(|text| (id, text)))
            .collect()
    }
}
