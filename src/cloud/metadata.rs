//! Region detection from the EC2 instance metadata service.

use std::time::Duration;

use crate::error::{AutoscaleError, AutoscaleResult};

/// Metadata path that returns this host's availability zone.
pub const AVAILABILITY_ZONE_URL: &str =
    "http://169.254.169.254/latest/meta-data/placement/availability-zone";

/// Strip the trailing zone letter: `eu-west-1a` becomes `eu-west-1`.
pub fn region_from_zone(zone: &str) -> AutoscaleResult<String> {
    let zone = zone.trim();
    let mut chars = zone.chars();
    match chars.next_back() {
        Some(letter) if letter.is_ascii_alphabetic() && !chars.as_str().is_empty() => {
            Ok(chars.as_str().to_string())
        }
        _ => Err(AutoscaleError::MetadataUnavailable(format!(
            "unexpected availability zone {:?}",
            zone
        ))),
    }
}

/// Fetch the availability zone from `url` and derive the region from it.
pub async fn detect_region(url: &str, timeout: Duration) -> AutoscaleResult<String> {
    let unavailable = |e: reqwest::Error| AutoscaleError::MetadataUnavailable(e.to_string());

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .no_proxy()
        .build()
        .map_err(unavailable)?;

    let zone = client
        .get(url)
        .send()
        .await
        .and_then(|res| res.error_for_status())
        .map_err(unavailable)?
        .text()
        .await
        .map_err(unavailable)?;

    let region = region_from_zone(&zone)?;
    tracing::debug!(zone = %zone.trim(), region = %region, "Region detected from instance metadata");
    Ok(region)
}
