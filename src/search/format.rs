//! Plain-text rendering of search results
//!
//! The layout here is part of the tool output contract: field order,
//! placeholder text and separators are relied on by clients.

use crate::search::types::{DescriptionMap, Poi, PoiAddress, WebResult};

pub const NO_LOCAL_RESULTS: &str = "No local results found";
pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_DESCRIPTION: &str = "No description available";
pub const LOCAL_BLOCK_SEPARATOR: &str = "\n---\n";
pub const WEB_BLOCK_SEPARATOR: &str = "\n\n";

/// Merge POI records with their descriptions into text blocks
pub fn format_local_results(pois: &[Poi], descriptions: &DescriptionMap) -> String {
    if pois.is_empty() {
        return NO_LOCAL_RESULTS.to_string();
    }

    pois.iter()
        .map(|poi| format_poi(poi, descriptions))
        .collect::<Vec<_>>()
        .join(LOCAL_BLOCK_SEPARATOR)
}

/// Render web results as `Title/Description/URL` blocks
pub fn format_web_results(results: &[WebResult]) -> String {
    results
        .iter()
        .map(|r| {
            format!(
                "Title: {}\nDescription: {}\nURL: {}",
                r.title, r.description, r.url
            )
        })
        .collect::<Vec<_>>()
        .join(WEB_BLOCK_SEPARATOR)
}

fn format_poi(poi: &Poi, descriptions: &DescriptionMap) -> String {
    let rating_value = poi
        .rating
        .as_ref()
        .and_then(|r| r.rating_value)
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let rating_count = poi
        .rating
        .as_ref()
        .and_then(|r| r.rating_count)
        .unwrap_or(0);
    let hours = poi.opening_hours.join(", ");
    let description = descriptions.get(&poi.id).map(String::as_str);

    format!(
        "Name: {}\nAddress: {}\nPhone: {}\nRating: {} ({} reviews)\nPrice Range: {}\nHours: {}\nDescription: {}\n",
        poi.name,
        format_address(poi.address.as_ref()),
        or_placeholder(poi.phone.as_deref(), NOT_AVAILABLE),
        rating_value,
        rating_count,
        or_placeholder(poi.price_range.as_deref(), NOT_AVAILABLE),
        or_placeholder(Some(hours.as_str()), NOT_AVAILABLE),
        or_placeholder(description, NO_DESCRIPTION),
    )
}

fn format_address(address: Option<&PoiAddress>) -> String {
    let Some(address) = address else {
        return NOT_AVAILABLE.to_string();
    };

    let parts: Vec<&str> = [
        &address.street_address,
        &address.address_locality,
        &address.address_region,
        &address.postal_code,
    ]
    .into_iter()
    .filter_map(|part| part.as_deref())
    .filter(|part| !part.is_empty())
    .collect();

    if parts.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        parts.join(", ")
    }
}

/// Empty and absent values both take the placeholder
fn or_placeholder<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => placeholder,
    }
}
