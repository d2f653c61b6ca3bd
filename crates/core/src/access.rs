//! Zone-based client access scope.
//!
//! Client records live in the legacy database. Each client belongs to a
//! segment, and each segment carries a free-text description such as
//! `"Zona Norte - Mayoristas"`. The zone is the leading part of that
//! description. Staff users are assigned a list of zones; they may see the
//! clients whose segment resolves to one of those zones. Vendor users see the
//! clients attached to their own vendor code, and admins see everything.

use std::sync::LazyLock;

use regex::Regex;

use crate::roles::{ROLE_ADMIN, ROLE_VENDOR};

/// Matches a leading `ZONA` / `ZONE` word (any case) followed by whitespace.
static ZONE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^zon[ae]\s+").expect("valid zone prefix regex"));

/// A legacy segment as read from the `segments` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRef {
    pub code: String,
    pub description: String,
}

/// Derive the zone name from a legacy segment description.
///
/// Takes the text before the first `-`, drops a leading `ZONA`/`ZONE`
/// word, collapses inner whitespace and upper-cases the result.
/// Returns `None` when nothing is left.
pub fn derive_zone(description: &str) -> Option<String> {
    let head = description.split('-').next().unwrap_or("").trim();
    let head = ZONE_PREFIX.replace(head, "");
    let zone = head
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();

    if zone.is_empty() {
        None
    } else {
        Some(zone)
    }
}

/// Return the codes of the segments whose derived zone is one of `zones`.
///
/// Zone names are compared case-insensitively. Segments whose description
/// yields no zone are never allowed.
pub fn allowed_segments(segments: &[SegmentRef], zones: &[String]) -> Vec<String> {
    let wanted: Vec<String> = zones
        .iter()
        .map(|z| z.trim().to_uppercase())
        .filter(|z| !z.is_empty())
        .collect();

    segments
        .iter()
        .filter(|s| {
            derive_zone(&s.description)
                .map(|zone| wanted.contains(&zone))
                .unwrap_or(false)
        })
        .map(|s| s.code.clone())
        .collect()
}

/// Normalize a user's zone list for storage: trimmed, single-spaced,
/// upper-case, without blanks or duplicates. Order is kept.
pub fn normalize_zones(zones: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(zones.len());
    for zone in zones {
        let zone = zone.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
        if !zone.is_empty() && !out.contains(&zone) {
            out.push(zone);
        }
    }
    out
}

/// Which client records a user may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientScope {
    /// No restriction (admins).
    Unrestricted,
    /// Only clients attached to this vendor code.
    Vendor(String),
    /// Only clients in one of these segment codes. Empty means nothing.
    Segments(Vec<String>),
}

impl ClientScope {
    /// Build the scope for a user from their role, vendor code and zones.
    ///
    /// `segments` is only consulted for zone-scoped users.
    pub fn for_user(
        role: &str,
        vendor_code: Option<&str>,
        zones: &[String],
        segments: &[SegmentRef],
    ) -> Self {
        if role == ROLE_ADMIN {
            return Self::Unrestricted;
        }
        if role == ROLE_VENDOR {
            return match vendor_code {
                Some(code) if !code.trim().is_empty() => Self::Vendor(code.trim().to_string()),
                _ => Self::Segments(Vec::new()),
            };
        }
        Self::Segments(allowed_segments(segments, zones))
    }

    /// Whether zone-scoped lookups need the legacy segment table.
    pub fn needs_segments(role: &str) -> bool {
        role != ROLE_ADMIN && role != ROLE_VENDOR
    }

    /// Check a single client record against this scope.
    pub fn permits(&self, vendor_code: Option<&str>, segment_code: Option<&str>) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Vendor(code) => vendor_code == Some(code.as_str()),
            Self::Segments(codes) => {
                segment_code.is_some_and(|seg| codes.iter().any(|c| c == seg))
            }
        }
    }
}
