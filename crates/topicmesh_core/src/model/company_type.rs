//! Company type code to entity kind lookup.
//!
//! # Responsibility
//! - Map directory company-type codes and search category labels to the
//!   precise company sub-kind.
//!
//! # Invariants
//! - The mapping is total: unknown or missing labels map to `company`.
//! - Labels are compared after normalization (`"DSP/SSP"`, `"dsp-ssp"` and
//!   `"DSP_SSP"` are the same label).

use crate::model::entity::EntityKind;

const COMPANY_LABEL_TABLE: &[(&str, EntityKind)] = &[
    ("AGENCY", EntityKind::Agency),
    ("INDEPENDENT_AGENCY", EntityKind::Agency),
    ("HOLDING_COMPANY_AGENCY", EntityKind::Agency),
    ("MEDIA_HOLDING_COMPANY", EntityKind::Agency),
    ("ADVERTISER", EntityKind::Advertiser),
    ("NATIONAL_ADVERTISER", EntityKind::Advertiser),
    ("LOCAL_ADVERTISER", EntityKind::Advertiser),
    ("BRAND", EntityKind::Advertiser),
    ("INDUSTRY", EntityKind::Industry),
    ("PUBLISHER", EntityKind::Publisher),
    ("BROADCASTER", EntityKind::Publisher),
    ("MEDIA_OWNER", EntityKind::Publisher),
    ("MEDIA_COMPANY", EntityKind::Publisher),
    ("DSP_SSP", EntityKind::DspSsp),
    ("DSP", EntityKind::DspSsp),
    ("SSP", EntityKind::DspSsp),
    ("ADTECH", EntityKind::Adtech),
    ("ADTECH_VENDOR", EntityKind::Adtech),
    ("MARTECH_VENDOR", EntityKind::Adtech),
];

/// Returns the company sub-kind for a type code or category label.
pub fn kind_for_company_label(label: Option<&str>) -> EntityKind {
    let Some(label) = label else {
        return EntityKind::Company;
    };
    let normalized = normalize_label(label);
    COMPANY_LABEL_TABLE
        .iter()
        .find(|(code, _)| *code == normalized)
        .map_or(EntityKind::Company, |(_, kind)| *kind)
}

fn normalize_label(label: &str) -> String {
    let mut normalized = String::with_capacity(label.len());
    let mut pending_separator = false;
    for ch in label.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !normalized.is_empty() {
                normalized.push('_');
            }
            pending_separator = false;
            normalized.push(ch.to_ascii_uppercase());
        } else {
            pending_separator = true;
        }
    }
    normalized
}
