//! Feed categorization by keyword matching on the feed title.
//!
//! Every subscription gets exactly one [`Category`], assigned once at OPML
//! load time and stamped onto every item the feed produces.

use serde::{Deserialize, Serialize};

/// Topic bucket for a security-news feed.
///
/// Closed set; [`Category::General`] is the fallback when no keyword matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Crypto,
    Cybercrime,
    Dfir,
    General,
    GovCert,
    Leaks,
    Malware,
    ThreatIntel,
    MalwareAnalysis,
    Osint,
    Podcasts,
    Vendors,
    Vulns,
    Exploits,
    VulnAdvisories,
}

impl Category {
    /// Wire-format name, matching the serde snake_case representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Crypto => "crypto",
            Category::Cybercrime => "cybercrime",
            Category::Dfir => "dfir",
            Category::General => "general",
            Category::GovCert => "gov_cert",
            Category::Leaks => "leaks",
            Category::Malware => "malware",
            Category::ThreatIntel => "threat_intel",
            Category::MalwareAnalysis => "malware_analysis",
            Category::Osint => "osint",
            Category::Podcasts => "podcasts",
            Category::Vendors => "vendors",
            Category::Vulns => "vulns",
            Category::Exploits => "exploits",
            Category::VulnAdvisories => "vuln_advisories",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword table scanned linearly, first match wins.
///
/// The scan order is load-bearing: a title matching keywords from two rows
/// resolves to the earlier row. `malware_analysis` is scanned before
/// `malware` so that "Malware Analysis ..." titles land in the more specific
/// bucket. Do not replace this with a map — iteration order must stay fixed.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Crypto, &["crypto", "blockchain"]),
    (Category::Cybercrime, &["cybercrime", "darknet"]),
    (Category::Dfir, &["dfir", "forensics"]),
    (Category::General, &["general", "security news", "infosec"]),
    (Category::GovCert, &["cert", "government", "gov"]),
    (Category::Leaks, &["leaks", "breaches", "pwned"]),
    (Category::MalwareAnalysis, &["malware analysis", "reversing"]),
    (Category::Malware, &["malware", "ransomware"]),
    (Category::ThreatIntel, &["threat intel", "apt", "campaigns"]),
    (Category::Osint, &["osint", "communities"]),
    (Category::Podcasts, &["podcast"]),
    (Category::Vendors, &["vendor"]),
    (Category::Vulns, &["vulnerab", "cve"]),
    (Category::Exploits, &["exploit", "0day"]),
    (Category::VulnAdvisories, &["advisories", "advisory"]),
];

/// Guesses a feed's category from its display title.
///
/// Case-insensitive substring match against the keyword table in table
/// order; returns [`Category::General`] when nothing matches. Pure and total:
/// every input maps to exactly one category.
pub fn classify(title: &str) -> Category {
    let lower = title.to_lowercase();
    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|k| lower.contains(k)) {
            return *category;
        }
    }
    Category::General
}
