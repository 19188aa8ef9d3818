//! Named regions and the selectors used to restrict integrals to parts of the domain.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt;

/// A name together with the set of cell tags making up the region.
///
/// Regions may share tags, i.e. overlap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct NamedRegion {
    name: String,
    tags: BTreeSet<usize>,
}

impl NamedRegion {
    pub fn new(name: impl Into<String>, tags: impl IntoIterator<Item = usize>) -> Self {
        Self {
            name: name.into(),
            tags: tags.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &BTreeSet<usize> {
        &self.tags
    }

    pub fn contains(&self, tag: usize) -> bool {
        self.tags.contains(&tag)
    }
}

impl fmt::Display for NamedRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Selects the cells an integral is taken over.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// The whole domain, regardless of tags.
    Everywhere,
    /// All cells carrying exactly this tag.
    Tag(usize),
    /// All cells whose tag belongs to the region.
    Region(NamedRegion),
    /// A region looked up by name in a [`RegionRegistry`].
    Named(String),
}

impl From<usize> for Selector {
    fn from(tag: usize) -> Self {
        Self::Tag(tag)
    }
}

impl From<NamedRegion> for Selector {
    fn from(region: NamedRegion) -> Self {
        Self::Region(region)
    }
}

impl<'a> From<&'a NamedRegion> for Selector {
    fn from(region: &'a NamedRegion) -> Self {
        Self::Region(region.clone())
    }
}

impl<'a> From<&'a str> for Selector {
    fn from(name: &'a str) -> Self {
        Self::Named(name.to_string())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Everywhere => write!(f, "everywhere"),
            Self::Tag(tag) => write!(f, "{}", tag),
            Self::Region(region) => write!(f, "{}", region),
            Self::Named(name) => write!(f, "{}", name),
        }
    }
}

/// The resolved set of tags an integral is restricted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagSet {
    All,
    Only(BTreeSet<usize>),
}

impl TagSet {
    pub fn contains(&self, tag: usize) -> bool {
        match self {
            Self::All => true,
            Self::Only(tags) => tags.contains(&tag),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionError {
    InvalidRegion { name: String },
    DuplicateRegion { name: String },
}

impl fmt::Display for RegionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRegion { name } => write!(f, "region \"{}\" has not been registered", name),
            Self::DuplicateRegion { name } => write!(f, "region \"{}\" is already registered", name),
        }
    }
}

impl Error for RegionError {}

/// Maps region names to their tag sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionRegistry {
    domain_name: String,
    regions: BTreeMap<String, NamedRegion>,
}

impl Default for RegionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionRegistry {
    pub fn new() -> Self {
        Self::with_domain_name("everywhere")
    }

    /// Creates an empty registry whose whole-domain selector is printed with the given name.
    pub fn with_domain_name(domain_name: impl Into<String>) -> Self {
        Self {
            domain_name: domain_name.into(),
            regions: BTreeMap::new(),
        }
    }

    pub fn domain_name(&self) -> &str {
        &self.domain_name
    }

    /// Registers a new region.
    ///
    /// Fails without modifying the registry if a region with the same name already exists.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        tags: impl IntoIterator<Item = usize>,
    ) -> Result<NamedRegion, RegionError> {
        let name = name.into();
        if self.regions.contains_key(&name) {
            return Err(RegionError::DuplicateRegion { name });
        }
        let region = NamedRegion::new(name.clone(), tags);
        self.regions.insert(name, region.clone());
        Ok(region)
    }

    pub fn get(&self, name: &str) -> Option<&NamedRegion> {
        self.regions.get(name)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Registered regions in alphabetical order.
    pub fn regions(&self) -> impl '_ + Iterator<Item = &NamedRegion> {
        self.regions.values()
    }

    /// Resolves a selector to the tags it covers.
    pub fn lookup(&self, selector: &Selector) -> Result<TagSet, RegionError> {
        match selector {
            Selector::Everywhere => Ok(TagSet::All),
            Selector::Tag(tag) => Ok(TagSet::Only(BTreeSet::from([*tag]))),
            Selector::Region(region) => Ok(TagSet::Only(region.tags().clone())),
            Selector::Named(name) => self
                .get(name)
                .map(|region| TagSet::Only(region.tags().clone()))
                .ok_or_else(|| RegionError::InvalidRegion { name: name.clone() }),
        }
    }

    /// Human-readable name of the selector, using the domain name for [`Selector::Everywhere`].
    pub fn label(&self, selector: &Selector) -> String {
        match selector {
            Selector::Everywhere => self.domain_name.clone(),
            other => other.to_string(),
        }
    }
}
