// ── Marker label resolution ──
//
// The map reports a clicked marker by its tooltip text ("Site 7"). The
// resolver turns that back into a catalog id. It does not bounds-check:
// an id past the end of the catalog surfaces later as `NotFound`.

use crate::error::CoreError;
use crate::model::{Region, SiteId};

/// Extract the site id from a marker label.
///
/// Case-insensitive; every non-digit character is discarded and the
/// remaining digits are parsed as one number, so `"SITE012"` is 12.
pub fn resolve(label: &str) -> Result<SiteId, CoreError> {
    let digits: String = label
        .to_lowercase()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();

    digits
        .parse::<usize>()
        .map(SiteId)
        .map_err(|_| CoreError::MalformedLabel {
            label: label.to_owned(),
        })
}

/// Region implied by an id under the threshold rule.
pub fn classify(id: SiteId) -> Region {
    Region::classify(id)
}
