//! Four-level complaint taxonomy: Family → Group → Subgroup → Requirement.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Requirement classification.
///
/// Serialized with the backend's labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "Baja")]
    Low,
    #[serde(rename = "Media")]
    Medium,
    #[serde(rename = "Alta")]
    High,
}

impl Classification {
    pub const ALL: [Classification; 3] = [
        Classification::Low,
        Classification::Medium,
        Classification::High,
    ];

    /// Label used on the wire and in option texts
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Low => "Baja",
            Classification::Medium => "Media",
            Classification::High => "Alta",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Classification {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "baja" | "low" => Ok(Classification::Low),
            "media" | "medium" => Ok(Classification::Medium),
            "alta" | "high" => Ok(Classification::High),
            other => Err(DomainError::invalid_value(format!(
                "unknown classification '{}'",
                other
            ))),
        }
    }
}

/// Level of a taxonomy node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Family,
    Group,
    Subgroup,
    Requirement,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Family, Level::Group, Level::Subgroup, Level::Requirement];

    /// Level whose selection this level depends on
    pub fn parent(self) -> Option<Level> {
        match self {
            Level::Family => None,
            Level::Group => Some(Level::Family),
            Level::Subgroup => Some(Level::Group),
            Level::Requirement => Some(Level::Subgroup),
        }
    }

    /// Level repopulated when this level's selection changes
    pub fn child(self) -> Option<Level> {
        match self {
            Level::Family => Some(Level::Group),
            Level::Group => Some(Level::Subgroup),
            Level::Subgroup => Some(Level::Requirement),
            Level::Requirement => None,
        }
    }

    /// Every level below this one, nearest first
    pub fn descendants(self) -> impl Iterator<Item = Level> {
        std::iter::successors(self.child(), |level| level.child())
    }

    pub fn label(self) -> &'static str {
        match self {
            Level::Family => "family",
            Level::Group => "group",
            Level::Subgroup => "subgroup",
            Level::Requirement => "requirement",
        }
    }

    /// Plural form for messages, e.g. `families`
    pub fn plural(self) -> &'static str {
        match self {
            Level::Family => "families",
            Level::Group => "groups",
            Level::Subgroup => "subgroups",
            Level::Requirement => "requirements",
        }
    }

    /// Backend collection segment, e.g. `familias`
    pub fn collection(self) -> &'static str {
        match self {
            Level::Family => "familias",
            Level::Group => "grupos",
            Level::Subgroup => "subgrupos",
            Level::Requirement => "requerimientos",
        }
    }

    /// Query/body key naming this level as a parent, e.g. `familia_id`
    pub fn parent_key(self) -> &'static str {
        match self {
            Level::Family => "familia_id",
            Level::Group => "grupo_id",
            Level::Subgroup => "subgrupo_id",
            Level::Requirement => "requerimiento_id",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Level {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "family" | "familia" => Ok(Level::Family),
            "group" | "grupo" => Ok(Level::Group),
            "subgroup" | "subgrupo" => Ok(Level::Subgroup),
            "requirement" | "requerimiento" => Ok(Level::Requirement),
            other => Err(DomainError::invalid_value(format!("unknown level '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    pub id: i64,
    pub name: String,
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub code: Option<String>,
    pub family_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subgroup {
    pub id: i64,
    pub name: String,
    pub code: Option<String>,
    pub group_id: Option<i64>,
}

/// Leaf of the taxonomy, with denormalized ancestor names when the backend sends them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: i64,
    pub name: String,
    pub classification: Classification,
    pub description: Option<String>,
    pub code: Option<String>,
    pub subgroup_id: Option<i64>,
    pub family_name: Option<String>,
    pub group_name: Option<String>,
    pub subgroup_name: Option<String>,
}

impl Requirement {
    /// True when every ancestor name is present and non-blank
    pub fn is_hierarchy_complete(&self) -> bool {
        [&self.family_name, &self.group_name, &self.subgroup_name]
            .iter()
            .all(|name| name.as_deref().is_some_and(|n| !n.trim().is_empty()))
    }

    /// `Family > Group > Subgroup`, or `None` when the chain is incomplete
    pub fn ancestor_path(&self) -> Option<String> {
        if !self.is_hierarchy_complete() {
            return None;
        }
        Some(format!(
            "{} > {} > {}",
            self.family_name.as_deref().unwrap_or_default(),
            self.group_name.as_deref().unwrap_or_default(),
            self.subgroup_name.as_deref().unwrap_or_default()
        ))
    }

    /// Option text in the requirement control: `"{name} ({classification})"`
    pub fn option_label(&self) -> String {
        format!("{} ({})", self.name, self.classification)
    }
}

/// One resolved ancestor in a hierarchy lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathNode {
    pub id: i64,
    pub name: String,
    pub code: Option<String>,
}

/// Ancestor chain of a requirement. Any member may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyPath {
    pub family: Option<PathNode>,
    pub group: Option<PathNode>,
    pub subgroup: Option<PathNode>,
}

impl HierarchyPath {
    /// Family, group and subgroup ids when the whole chain resolved
    pub fn ids(&self) -> Option<(i64, i64, i64)> {
        match (&self.family, &self.group, &self.subgroup) {
            (Some(f), Some(g), Some(s)) => Some((f.id, g.id, s.id)),
            _ => None,
        }
    }
}

/// Node to create at any level of the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNode {
    pub level: Level,
    pub name: String,
    /// Required for every level except Family
    pub parent_id: Option<i64>,
    /// Requirement only; the backend defaults to `Media`
    pub classification: Option<Classification>,
    /// Requirement only
    pub description: Option<String>,
}

impl NewNode {
    /// Check name and parent before anything is sent.
    pub fn new(level: Level, name: &str, parent_id: Option<i64>) -> DomainResult<Self> {
        let name = name.trim();
        let mut messages = Vec::new();
        if name.is_empty() {
            messages.push(format!("The {} name is required", level));
        }
        if let Some(parent) = level.parent() {
            if parent_id.is_none() {
                messages.push(format!("A {} must be selected first", parent));
            }
        }
        if !messages.is_empty() {
            return Err(DomainError::Validation(messages));
        }

        Ok(Self {
            level,
            name: name.to_string(),
            parent_id: level.parent().and(parent_id),
            classification: None,
            description: None,
        })
    }

    /// Attach requirement details; ignored for other levels.
    pub fn with_details(mut self, classification: Classification, description: Option<String>) -> Self {
        if self.level == Level::Requirement {
            self.classification = Some(classification);
            self.description = description.filter(|d| !d.trim().is_empty());
        }
        self
    }
}

/// Editable fields of a requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementUpdate {
    pub name: String,
    pub classification: Classification,
    pub description: String,
    /// Moves the requirement when set
    pub subgroup_id: Option<i64>,
}

impl RequirementUpdate {
    pub fn new(
        name: &str,
        classification: Classification,
        description: &str,
        subgroup_id: Option<i64>,
    ) -> DomainResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("The requirement name is required"));
        }
        Ok(Self {
            name: name.to_string(),
            classification,
            description: description.trim().to_string(),
            subgroup_id,
        })
    }
}

/// Counts shown above the requirement list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RequirementStats {
    pub total: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub incomplete: usize,
}

impl RequirementStats {
    pub fn from_requirements(requirements: &[Requirement]) -> Self {
        let mut stats = Self {
            total: requirements.len(),
            ..Self::default()
        };
        for requirement in requirements {
            match requirement.classification {
                Classification::Low => stats.low += 1,
                Classification::Medium => stats.medium += 1,
                Classification::High => stats.high += 1,
            }
            if !requirement.is_hierarchy_complete() {
                stats.incomplete += 1;
            }
        }
        stats
    }
}
