//! Namespace ids and namespace-set merging

use std::fmt;

/// Integer partition of an account's message space
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NamespaceId(i16);

impl NamespaceId {
    /// The default namespace
    pub const DEFAULT: NamespaceId = NamespaceId(0);

    pub const fn new(id: i16) -> Self {
        Self(id)
    }

    pub const fn as_i16(self) -> i16 {
        self.0
    }
}

impl From<i16> for NamespaceId {
    fn from(id: i16) -> Self {
        Self(id)
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The set of namespaces one monitor covers
///
/// `Ids` is always sorted and duplicate-free. `All` is the wildcard
/// subscription: it contains every namespace and absorbs any merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceSet {
    All,
    Ids(Vec<NamespaceId>),
}

impl NamespaceSet {
    /// Build from arbitrary ids, sorting and deduplicating
    pub fn from_ids(mut ids: Vec<NamespaceId>) -> Self {
        ids.sort_unstable();
        ids.dedup();
        NamespaceSet::Ids(ids)
    }

    /// Whether `namespace` is covered by this set
    pub fn contains(&self, namespace: NamespaceId) -> bool {
        match self {
            NamespaceSet::All => true,
            NamespaceSet::Ids(ids) => ids.binary_search(&namespace).is_ok(),
        }
    }

    /// Union of two sets
    ///
    /// The wildcard absorbs; two id lists go through [`merge_namespaces`].
    pub fn merge(self, other: NamespaceSet) -> NamespaceSet {
        match (self, other) {
            (NamespaceSet::All, _) | (_, NamespaceSet::All) => NamespaceSet::All,
            (NamespaceSet::Ids(a), NamespaceSet::Ids(b)) => {
                NamespaceSet::Ids(merge_namespaces(a, b))
            }
        }
    }
}

impl Default for NamespaceSet {
    fn default() -> Self {
        NamespaceSet::Ids(Vec::new())
    }
}

impl fmt::Display for NamespaceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceSet::All => f.write_str("all"),
            NamespaceSet::Ids(ids) => {
                for (i, id) in ids.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{id}")?;
                }
                Ok(())
            }
        }
    }
}

/// Merge two sorted, duplicate-free id vectors into their sorted union.
///
/// When one input already contains the other, the superset is returned by
/// move without touching the allocator; otherwise a single linear pass
/// builds the union. Runs on every subscription renewal. O(|a| + |b|).
pub fn merge_namespaces(mut a: Vec<NamespaceId>, mut b: Vec<NamespaceId>) -> Vec<NamespaceId> {
    // If b starts below a, only b can be the superset; swap so the
    // containment test always treats a as the candidate superset.
    if !b.is_empty() && (a.is_empty() || b[0] < a[0]) {
        std::mem::swap(&mut a, &mut b);
    }

    // Walk both to check whether everything in b already appears in a.
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if b[j] > a[i] {
            i += 1; // element only in a
        } else if b[j] == a[i] {
            i += 1; // element in both
            j += 1;
        } else {
            break; // a b element missing from a
        }
    }
    if j == b.len() {
        return a;
    }

    // Not a subset; merge into a fresh vector, writing shared values once.
    let mut merged = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() || j < b.len() {
        if j == b.len() {
            merged.push(a[i]);
            i += 1;
        } else if i == a.len() {
            merged.push(b[j]);
            j += 1;
        } else if a[i] < b[j] {
            merged.push(a[i]);
            i += 1;
        } else if a[i] == b[j] {
            merged.push(a[i]);
            i += 1;
            j += 1;
        } else {
            merged.push(b[j]);
            j += 1;
        }
    }
    merged
}
