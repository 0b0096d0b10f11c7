//! Closed set of recognized license IRIs and free-text license matching.

use serde::{Deserialize, Serialize};

/// A recognized license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct License {
    /// SPDX-style short identifier.
    pub id: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Canonical IRI stored in the record.
    pub iri: &'static str,
}

const fn license(id: &'static str, name: &'static str, iri: &'static str) -> License {
    License { id, name, iri }
}

/// Every license the license field can select directly.
pub const KNOWN_LICENSES: [License; 27] = [
    license("MIT", "MIT License", "https://opensource.org/licenses/MIT"),
    license("Apache-2.0", "Apache License 2.0", "https://www.apache.org/licenses/LICENSE-2.0"),
    license("GPL-2.0", "GNU General Public License v2.0", "https://www.gnu.org/licenses/old-licenses/gpl-2.0.html"),
    license("GPL-3.0", "GNU General Public License v3.0", "https://www.gnu.org/licenses/gpl-3.0.html"),
    license("LGPL-2.1", "GNU Lesser General Public License v2.1", "https://www.gnu.org/licenses/old-licenses/lgpl-2.1.html"),
    license("LGPL-3.0", "GNU Lesser General Public License v3.0", "https://www.gnu.org/licenses/lgpl-3.0.html"),
    license("AGPL-3.0", "GNU Affero General Public License v3.0", "https://www.gnu.org/licenses/agpl-3.0.html"),
    license("BSD-2-Clause", "BSD 2-Clause License", "https://opensource.org/licenses/BSD-2-Clause"),
    license("BSD-3-Clause", "BSD 3-Clause License", "https://opensource.org/licenses/BSD-3-Clause"),
    license("MPL-2.0", "Mozilla Public License 2.0", "https://www.mozilla.org/en-US/MPL/2.0/"),
    license("EPL-2.0", "Eclipse Public License 2.0", "https://www.eclipse.org/legal/epl-2.0/"),
    license("ISC", "ISC License", "https://opensource.org/licenses/ISC"),
    license("Unlicense", "The Unlicense", "https://unlicense.org/"),
    license("Artistic-2.0", "Artistic License 2.0", "https://opensource.org/licenses/Artistic-2.0"),
    license("CC0-1.0", "Creative Commons Zero v1.0 Universal", "https://creativecommons.org/publicdomain/zero/1.0/"),
    license("CC-BY-3.0", "Creative Commons Attribution 3.0", "https://creativecommons.org/licenses/by/3.0/"),
    license("CC-BY-SA-3.0", "Creative Commons Attribution-ShareAlike 3.0", "https://creativecommons.org/licenses/by-sa/3.0/"),
    license("CC-BY-4.0", "Creative Commons Attribution 4.0", "https://creativecommons.org/licenses/by/4.0/"),
    license("CC-BY-SA-4.0", "Creative Commons Attribution-ShareAlike 4.0", "https://creativecommons.org/licenses/by-sa/4.0/"),
    license("CC-BY-NC-4.0", "Creative Commons Attribution-NonCommercial 4.0", "https://creativecommons.org/licenses/by-nc/4.0/"),
    license("CC-BY-NC-SA-4.0", "Creative Commons Attribution-NonCommercial-ShareAlike 4.0", "https://creativecommons.org/licenses/by-nc-sa/4.0/"),
    license("CC-BY-ND-4.0", "Creative Commons Attribution-NoDerivatives 4.0", "https://creativecommons.org/licenses/by-nd/4.0/"),
    license("CC-BY-NC-ND-4.0", "Creative Commons Attribution-NonCommercial-NoDerivatives 4.0", "https://creativecommons.org/licenses/by-nc-nd/4.0/"),
    license("PDDL-1.0", "Open Data Commons Public Domain Dedication and License", "https://opendatacommons.org/licenses/pddl/1-0/"),
    license("ODC-By-1.0", "Open Data Commons Attribution License", "https://opendatacommons.org/licenses/by/1-0/"),
    license("ODbL-1.0", "Open Data Commons Open Database License", "https://opendatacommons.org/licenses/odbl/1-0/"),
    license("OGL-UK-3.0", "Open Government Licence v3.0", "http://www.nationalarchives.gov.uk/doc/open-government-licence/version/3/"),
];

/// Result of matching a license candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LicenseChoice {
    /// One of [`KNOWN_LICENSES`], identified by IRI.
    Known(String),
    /// Free-form text or URL outside the closed set.
    Custom(String),
}

impl LicenseChoice {
    /// The value stored in the record's `license` field.
    pub fn stored_value(&self) -> &str {
        match self {
            LicenseChoice::Known(iri) | LicenseChoice::Custom(iri) => iri,
        }
    }
}

fn normalize_iri(s: &str) -> String {
    let lower = s.trim().to_ascii_lowercase();
    let without_scheme = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .unwrap_or(&lower);
    let without_www = without_scheme.strip_prefix("www.").unwrap_or(without_scheme);
    without_www.trim_end_matches('/').to_string()
}

/// Look up a known license by IRI, SPDX id, or name (case-insensitive).
pub fn find_license(candidate: &str) -> Option<&'static License> {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = normalize_iri(trimmed);
    KNOWN_LICENSES.iter().find(|l| {
        normalize_iri(l.iri) == normalized
            || l.id.eq_ignore_ascii_case(trimmed)
            || l.name.eq_ignore_ascii_case(trimmed)
    })
}

/// Match a license suggestion against the closed set.
///
/// Falls back to the first embedded URL that is a known license, and
/// otherwise treats the trimmed candidate as a custom override.
pub fn match_license(candidate: &str) -> LicenseChoice {
    if let Some(known) = find_license(candidate) {
        return LicenseChoice::Known(known.iri.to_string());
    }
    let embedded = candidate
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| matches!(c, '(' | ')' | ',' | ';' | '"' | '\'')))
        .filter(|token| token.starts_with("http://") || token.starts_with("https://"))
        .find_map(find_license);
    match embedded {
        Some(known) => LicenseChoice::Known(known.iri.to_string()),
        None => LicenseChoice::Custom(candidate.trim().to_string()),
    }
}

/// Whether the stored license value is one of the known IRIs.
pub fn is_known_license_iri(value: &str) -> bool {
    KNOWN_LICENSES.iter().any(|l| l.iri == value)
}
