//! Project name canonicalization
//!
//! Both catalogs name projects independently. The registry keys projects by a
//! short identifier (`opa`) and also carries a display name
//! (`Open Policy Agent`), while the landscape only has a display name, which
//! may be spelled differently again. Every comparison happens on the
//! *canonical* form: trimmed, lower-cased and, for registry names, passed
//! through the configured rename table.

use std::collections::{BTreeMap, HashMap};

/// Which catalog a raw name came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Registry,
    Landscape,
}

impl Side {
    /// The other catalog
    pub fn other(self) -> Side {
        match self {
            Side::Registry => Side::Landscape,
            Side::Landscape => Side::Registry,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Registry => write!(f, "registry"),
            Side::Landscape => write!(f, "landscape"),
        }
    }
}

impl serde::Serialize for Side {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Trims and lower-cases a name
pub fn fold(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Symmetric name associations collected while indexing the registry.
///
/// Linking `a` with `b` makes each resolve to the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    links: HashMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates two folded names in both directions.
    ///
    /// Identical names are not linked. A name that is already linked keeps
    /// its first partner, and the new pair is only recorded when neither
    /// side is taken, so lookups always agree in both directions.
    pub fn link(&mut self, a: &str, b: &str) -> bool {
        if a == b || self.links.contains_key(a) || self.links.contains_key(b) {
            return false;
        }
        self.links.insert(a.to_string(), b.to_string());
        self.links.insert(b.to_string(), a.to_string());
        true
    }

    /// Returns the counterpart of a folded name, if linked
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.links.get(name).map(String::as_str)
    }

    /// Number of linked pairs
    pub fn len(&self) -> usize {
        self.links.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Iterates over every direction of every link
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.links.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }
}

/// Result of resolving a landscape name against the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Name matches a registry project, directly or through an alias
    Known(String),
    /// No registry project answers to this name (folded form)
    Unknown(String),
}

/// Turns raw names into canonical names and tracks registry aliases
#[derive(Debug, Clone)]
pub struct Canonicalizer<'a> {
    renames: &'a BTreeMap<String, String>,
    aliases: AliasTable,
}

impl<'a> Canonicalizer<'a> {
    /// `renames` maps folded registry display names to folded landscape names
    pub fn new(renames: &'a BTreeMap<String, String>) -> Self {
        Self {
            renames,
            aliases: AliasTable::new(),
        }
    }

    /// Returns the canonical form of a raw name.
    ///
    /// Landscape names are only folded. Registry names are folded and then
    /// renamed when the rename table knows them.
    pub fn canonicalize(&self, raw: &str, side: Side) -> String {
        let folded = fold(raw);
        match side {
            Side::Landscape => folded,
            Side::Registry => match self.renames.get(&folded) {
                Some(renamed) => renamed.clone(),
                None => folded,
            },
        }
    }

    /// Canonicalizes a registry entry and links its short key to the result
    pub fn register(&mut self, key: &str, full_name: &str) -> String {
        let canonical = self.canonicalize(full_name, Side::Registry);
        self.aliases.link(&fold(key), &canonical);
        canonical
    }

    /// Resolves a landscape name against the set of known registry names
    pub fn resolve(&self, raw: &str, is_known: impl Fn(&str) -> bool) -> Resolution {
        let folded = fold(raw);
        if is_known(&folded) {
            return Resolution::Known(folded);
        }
        match self.aliases.resolve(&folded) {
            Some(alias) if is_known(alias) => Resolution::Known(alias.to_string()),
            _ => Resolution::Unknown(folded),
        }
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn into_aliases(self) -> AliasTable {
        self.aliases
    }
}
