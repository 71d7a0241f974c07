use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

static CATALOG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/catalog");

pub type ActionId = u32;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ActionCategory {
    Straight,
    Hook,
    Uppercut,
    Other,
}

impl ActionCategory {
    pub const ALL: [ActionCategory; 4] = [
        ActionCategory::Straight,
        ActionCategory::Hook,
        ActionCategory::Uppercut,
        ActionCategory::Other,
    ];

    /// Heading used when actions are grouped by category
    pub fn heading(&self) -> &'static str {
        match self {
            ActionCategory::Straight => "STRAIGHTS",
            ActionCategory::Hook => "HOOKS",
            ActionCategory::Uppercut => "UPPERCUTS",
            ActionCategory::Other => "OTHER",
        }
    }
}

/// A labelable movement. Immutable once the catalog is loaded.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Action {
    pub id: ActionId,
    pub name: String,
    pub short_name: String,
    pub hotkey: char,
    pub category: ActionCategory,
}

impl Action {
    /// Identifier used in exported documents: `L-HOOK-H` becomes `L_HOOK_H`
    pub fn export_name(&self) -> String {
        self.short_name.replace('-', "_").to_uppercase()
    }

    pub fn matches_hotkey(&self, key: char) -> bool {
        fold_hotkey(self.hotkey) == fold_hotkey(key)
    }
}

/// Case-folded form used both to match and to detect duplicate hotkeys
fn fold_hotkey(key: char) -> String {
    key.to_lowercase().collect()
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog file not found: {0}")]
    NotFound(String),

    #[error("unable to parse catalog json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate action id {0}")]
    DuplicateId(ActionId),

    #[error("duplicate hotkey '{0}'")]
    DuplicateHotkey(char),
}

#[derive(Deserialize)]
struct CatalogFile {
    name: String,
    actions: Vec<Action>,
}

/// Read-only lookup table of the actions an operator can assign to a segment.
///
/// Built once and shared (behind an `Arc`) by every component that needs to
/// resolve an action id, so alternate catalogs can be injected in tests.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionCatalog {
    name: String,
    actions: Vec<Action>,
}

impl ActionCatalog {
    pub fn new(name: impl Into<String>, actions: Vec<Action>) -> Result<Self, CatalogError> {
        let mut ids = HashSet::new();
        let mut hotkeys = HashSet::new();
        for action in &actions {
            if !ids.insert(action.id) {
                return Err(CatalogError::DuplicateId(action.id));
            }
            if !hotkeys.insert(fold_hotkey(action.hotkey)) {
                return Err(CatalogError::DuplicateHotkey(action.hotkey));
            }
        }

        Ok(Self {
            name: name.into(),
            actions,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.name, file.actions)
    }

    /// Load one of the catalogs bundled into the binary, e.g. `"boxing"`
    pub fn embedded(name: &str) -> Result<Self, CatalogError> {
        let file_name = format!("{}.json", name);
        let contents = embedded_file(&file_name).ok_or(CatalogError::NotFound(file_name))?;
        Self::from_json(contents)
    }

    /// The bundled boxing strike taxonomy.
    ///
    /// # Panics
    ///
    /// Only if the bundled `boxing.json` is malformed, which the unit tests rule out.
    pub fn boxing() -> Self {
        Self::embedded("boxing").expect("bundled boxing catalog is valid")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lookup(&self, id: ActionId) -> Option<&Action> {
        self.actions.iter().find(|a| a.id == id)
    }

    pub fn all(&self) -> &[Action] {
        &self.actions
    }

    /// Case-insensitive single-character hotkey match
    pub fn find_by_hotkey(&self, key: char) -> Option<&Action> {
        self.actions.iter().find(|a| a.matches_hotkey(key))
    }

    pub fn by_category(&self, category: ActionCategory) -> impl Iterator<Item = &Action> {
        self.actions
            .iter()
            .filter(move |a| a.category == category)
    }

    pub fn category_of(&self, id: ActionId) -> Option<ActionCategory> {
        self.lookup(id).map(|a| a.category)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

pub(crate) fn embedded_file(file_name: &str) -> Option<&'static str> {
    CATALOG_DIR
        .get_file(file_name)
        .and_then(|file| file.contents_utf8())
}
