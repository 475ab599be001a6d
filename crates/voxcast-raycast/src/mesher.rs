//! Voxel representation selected by the configured mesher.

use std::sync::Arc;

use voxcast_blocky::BlockyLibrary;

/// How a volume turns voxels into surfaces, which decides what a ray hits.
///
/// Chosen once when the mesher is configured.
#[derive(Debug, Clone, Default)]
pub enum MesherKind {
    /// Typed blocks with collision boxes. Without a library nothing is hit.
    Blocky {
        /// Model library mapping type ids to collision boxes.
        library: Option<Arc<BlockyLibrary>>,
    },
    /// Colored cubes: any nonzero color is solid.
    Cubes,
    /// Smooth surfaces from the signed distance channel.
    #[default]
    Sdf,
}

impl MesherKind {
    /// Blocky meshing with a model library.
    pub fn blocky(library: Arc<BlockyLibrary>) -> Self {
        MesherKind::Blocky {
            library: Some(library),
        }
    }

    /// Short name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            MesherKind::Blocky { .. } => "blocky",
            MesherKind::Cubes => "cubes",
            MesherKind::Sdf => "sdf",
        }
    }
}
