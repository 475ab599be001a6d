//! Model lookup by type id.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::{BakedModel, LibraryError, LibraryFile, Result, AIR_ID};

/// Baked models keyed by type id.
///
/// Any `u32` except [`AIR_ID`] is a valid id; ids need not be dense.
#[derive(Debug, Clone, Default)]
pub struct BlockyLibrary {
    models: HashMap<u32, BakedModel>,
}

impl BlockyLibrary {
    /// Create an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a library from a JSON definition string.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: LibraryFile = serde_json::from_str(json)?;
        let mut library = Self::new();
        for def in &file.models {
            library.add_model(def.id, def.bake()?)?;
        }
        log::debug!("loaded {} blocky models", library.model_count());
        Ok(library)
    }

    /// Build a library from a JSON definition file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Register a model under `id`.
    pub fn add_model(&mut self, id: u32, model: BakedModel) -> Result<()> {
        if id == AIR_ID {
            return Err(LibraryError::ReservedId);
        }
        match self.models.entry(id) {
            Entry::Occupied(_) => Err(LibraryError::DuplicateModel(id)),
            Entry::Vacant(slot) => {
                slot.insert(model);
                Ok(())
            }
        }
    }

    /// Whether a model is registered under `id`.
    pub fn has_model(&self, id: u32) -> bool {
        self.get_model(id).is_some()
    }

    /// Model registered under `id`.
    pub fn get_model(&self, id: u32) -> Option<&BakedModel> {
        self.models.get(&id)
    }

    /// Number of registered models.
    pub fn model_count(&self) -> usize {
        self.models.len()
    }
}
