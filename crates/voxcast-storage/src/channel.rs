//! Voxel channels.

use crate::{StorageError, SDF_FAR_OUTSIDE};

/// One of the standard per-voxel data channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Block type id used by blocky meshing.
    Type,
    /// Signed distance used by smooth meshing.
    Sdf,
    /// Packed color used by cubes meshing.
    Color,
    /// Texture indices.
    Indices,
    /// Texture weights.
    Weights,
    /// Free channel.
    Data5,
    /// Free channel.
    Data6,
    /// Free channel.
    Data7,
}

impl Channel {
    /// Number of channels.
    pub const COUNT: usize = 8;

    /// All channels in index order.
    pub const ALL: [Channel; Self::COUNT] = [
        Channel::Type,
        Channel::Sdf,
        Channel::Color,
        Channel::Indices,
        Channel::Weights,
        Channel::Data5,
        Channel::Data6,
        Channel::Data7,
    ];

    /// Index of this channel in `0..COUNT`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Channel with the given index, if it exists.
    pub fn from_index(index: u8) -> Option<Channel> {
        Self::ALL.get(index as usize).copied()
    }

    /// Raw value of a freshly allocated chunk on this channel.
    pub(crate) fn initial_raw(self) -> u64 {
        match self {
            Channel::Sdf => u64::from(SDF_FAR_OUTSIDE.to_bits()),
            _ => 0,
        }
    }
}

impl TryFrom<u8> for Channel {
    type Error = StorageError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Channel::from_index(index).ok_or(StorageError::InvalidChannel(index))
    }
}
