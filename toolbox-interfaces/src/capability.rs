//! Capability-based tool/source matching (§4.6, REDESIGN FLAGS: capability structs
//! replace `interface{}` down-casts so mismatches are caught at wire-up).

use std::collections::BTreeSet;
use std::fmt;

/// A capability tag a source publishes, e.g. `"sql.pool"`, `"bigquery.client"`,
/// `"http.client"`, `"sql.readonly"`. Tags are opaque strings by design: the core
/// never interprets them beyond set membership, leaving their vocabulary to the
/// source/tool kinds that define it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Capability(&'static str);

impl Capability {
    pub const fn new(tag: &'static str) -> Self {
        Self(tag)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The set of capabilities a source publishes, or a tool requires.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    pub fn new(tags: impl IntoIterator<Item = Capability>) -> Self {
        Self(tags.into_iter().collect())
    }

    pub fn contains(&self, cap: Capability) -> bool {
        self.0.contains(&cap)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.0.iter()
    }

    /// Capabilities `required` declares that `self` (a source's published set)
    /// does not provide. Empty means the source satisfies every requirement.
    pub fn missing_from(&self, required: &CapabilitySet) -> Vec<Capability> {
        required.0.difference(&self.0).copied().collect()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<T: IntoIterator<Item = Capability>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
