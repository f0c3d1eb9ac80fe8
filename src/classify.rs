use crate::descriptor::FileEntry;
use crate::domain::SemanticCategory;
use crate::error::CatalogError;

const VELOCITY_KEYWORDS: [&str; 3] = ["Velocity", "Vector", "Vel."];

/// Maps a free-text type label onto the catalog taxonomy.
///
/// Region rules are evaluated first and the first match wins. The velocity tier
/// runs afterwards and always overrides the region result.
pub fn classify(label: &str) -> Result<SemanticCategory, CatalogError> {
    let region = region_tier(label);
    if velocity_tier(label) {
        return Ok(SemanticCategory::ResolvedVelocity);
    }
    region.ok_or_else(|| CatalogError::Classification(label.to_string()))
}

/// Classifies a descriptor entry. A `velocity` typed file always lands in
/// `Resolved Velocity`, whatever its `ckindat` says.
pub fn classify_entry(entry: &FileEntry) -> Result<SemanticCategory, CatalogError> {
    if entry.kind.is_velocity() {
        return Ok(SemanticCategory::ResolvedVelocity);
    }
    classify(&entry.type_label)
}

fn region_tier(label: &str) -> Option<SemanticCategory> {
    if label.contains("Barker") || label.contains("D-region") {
        Some(SemanticCategory::DRegion)
    } else if label.contains("Alternating Code") || label.contains("E-region") {
        Some(SemanticCategory::ERegion)
    } else if label.contains("Long Pulse")
        || (label.contains("F-region") && !label.contains("E-region"))
    {
        Some(SemanticCategory::FRegion)
    } else {
        None
    }
}

fn velocity_tier(label: &str) -> bool {
    VELOCITY_KEYWORDS
        .iter()
        .any(|keyword| label.contains(keyword))
}
