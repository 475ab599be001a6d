#![warn(missing_docs)]

//! Blocky voxel models for raycast collision.
//!
//! A [`BlockyLibrary`] maps integer type ids stored in the voxel type
//! channel to [`BakedModel`]s, each carrying axis-aligned collision boxes in
//! cell-local space and a collision mask.
//!
//! # Example
//!
//! ```
//! use voxcast_blocky::BlockyLibrary;
//!
//! let library = BlockyLibrary::from_json(r#"{
//!     "models": [
//!         { "id": 1 },
//!         { "id": 2, "collision_mask": 2, "collision_boxes": [[0, 0, 0, 1, 0.5, 1]] }
//!     ]
//! }"#).unwrap();
//!
//! assert!(library.has_model(1));
//! assert!(!library.has_model(0));
//! assert_eq!(library.get_model(2).unwrap().box_collision_mask, 2);
//! ```

mod definition;
mod library;
mod model;

pub use definition::{LibraryFile, ModelDefinition};
pub use library::BlockyLibrary;
pub use model::BakedModel;

use thiserror::Error;

/// Type id reserved for empty space.
pub const AIR_ID: u32 = 0;

/// Errors from building a model library.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Definition file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Definition file is not valid JSON for the expected schema.
    #[error("invalid library JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Two models share an id.
    #[error("duplicate model id: {0}")]
    DuplicateModel(u32),

    /// A model was registered under the air id.
    #[error("model id 0 is reserved for air")]
    ReservedId,

    /// A collision box has a negative or non-finite size.
    #[error("model {id}: invalid collision box at index {index}")]
    InvalidBox {
        /// Model id.
        id: u32,
        /// Index of the box within the model.
        index: usize,
    },
}

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, LibraryError>;
