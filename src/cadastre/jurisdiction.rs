//! Lot/plan identifier classification.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// QLD lot/plan: digits, 1-3 letters, digits (e.g. `3RP12345`, `12sp1234`).
/// ASCII classes only so full-width digits and case-folded symbols do not match.
static QLD_LOT_PLAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+[A-Za-z]{1,3}[0-9]+$").unwrap());

/// Cadastral service that owns an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Jurisdiction {
    /// Queensland DCDB, queried by `lotplan`
    Queensland,
    /// NSW cadastre, queried by `lotidstring` (e.g. `1//DP123456`)
    NewSouthWales,
}

impl Jurisdiction {
    /// Pick the jurisdiction for an identifier. Total: anything that is not a
    /// QLD lot/plan goes to NSW.
    pub fn classify(identifier: &str) -> Self {
        if QLD_LOT_PLAN.is_match(identifier) {
            Jurisdiction::Queensland
        } else {
            Jurisdiction::NewSouthWales
        }
    }

    /// Attribute the upstream layer is filtered on
    pub fn field_name(&self) -> &'static str {
        match self {
            Jurisdiction::Queensland => "lotplan",
            Jurisdiction::NewSouthWales => "lotidstring",
        }
    }

    /// Exact-match `where` clause. The identifier is passed through verbatim.
    pub fn where_clause(&self, identifier: &str) -> String {
        format!("{}='{}'", self.field_name(), identifier)
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Jurisdiction::Queensland => write!(f, "QLD"),
            Jurisdiction::NewSouthWales => write!(f, "NSW"),
        }
    }
}
