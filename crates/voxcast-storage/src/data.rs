//! Chunked in-memory voxel store.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use voxcast_math::Vec3i;

use crate::{Channel, Result, StorageError, VoxelAccess};

/// Edge length of a chunk in voxels.
pub const CHUNK_SIZE: i32 = 16;

const CHUNK_VOLUME: usize = (CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE) as usize;

/// Per-channel voxel values of one chunk.
#[derive(Debug, Clone)]
enum ChannelBuffer {
    /// Every voxel holds the same value.
    Uniform(u64),
    /// One value per voxel.
    Dense(Box<[u64]>),
}

impl ChannelBuffer {
    fn get(&self, index: usize) -> u64 {
        match self {
            ChannelBuffer::Uniform(v) => *v,
            ChannelBuffer::Dense(values) => values[index],
        }
    }

    fn set(&mut self, index: usize, value: u64) {
        match self {
            ChannelBuffer::Uniform(v) if *v == value => {}
            ChannelBuffer::Uniform(v) => {
                let mut values = vec![*v; CHUNK_VOLUME].into_boxed_slice();
                values[index] = value;
                *self = ChannelBuffer::Dense(values);
            }
            ChannelBuffer::Dense(values) => values[index] = value,
        }
    }
}

#[derive(Debug, Clone)]
struct Chunk {
    channels: [ChannelBuffer; Channel::COUNT],
}

impl Chunk {
    fn new() -> Self {
        Self {
            channels: Channel::ALL.map(|c| ChannelBuffer::Uniform(c.initial_raw())),
        }
    }
}

/// Split a voxel position into its chunk coordinate and index within the chunk.
fn locate(pos: &Vec3i) -> (Vec3i, usize) {
    let chunk = pos.map(|c| c.div_euclid(CHUNK_SIZE));
    let local = pos.map(|c| c.rem_euclid(CHUNK_SIZE) as usize);
    let size = CHUNK_SIZE as usize;
    (chunk, local.x + size * (local.y + size * local.z))
}

/// Sparse voxel volume made of 16³ chunks.
///
/// Chunks are allocated on first write. Inside an allocated chunk every
/// channel has a value (type 0, SDF far outside, zero elsewhere); outside
/// allocated chunks queries return the caller's default.
///
/// Each read takes the read lock for the duration of a single fetch.
#[derive(Debug, Default)]
pub struct VoxelData {
    chunks: RwLock<HashMap<Vec3i, Chunk>>,
}

impl VoxelData {
    /// Create an empty volume.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of allocated chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Drop all chunks.
    pub fn clear(&self) {
        self.chunks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Store a raw integer value.
    pub fn set_voxel_u64(&self, pos: Vec3i, channel: Channel, value: u64) {
        let mut chunks = self.chunks.write().unwrap_or_else(PoisonError::into_inner);
        Self::set_raw(&mut chunks, &pos, channel, value);
    }

    /// Store a floating point value, bit-cast into the raw cell.
    pub fn set_voxel_f32(&self, pos: Vec3i, channel: Channel, value: f32) {
        self.set_voxel_u64(pos, channel, u64::from(value.to_bits()));
    }

    /// Fill every voxel in `[min, max)` with a raw integer value.
    pub fn fill_box_u64(&self, min: Vec3i, max: Vec3i, channel: Channel, value: u64) -> Result<()> {
        self.fill_box_with(min, max, channel, |_| value)
    }

    /// Fill every voxel in `[min, max)` with a floating point value.
    pub fn fill_box_f32(&self, min: Vec3i, max: Vec3i, channel: Channel, value: f32) -> Result<()> {
        let raw = u64::from(value.to_bits());
        self.fill_box_with(min, max, channel, |_| raw)
    }

    /// Fill every voxel in `[min, max)` with a computed floating point value.
    pub fn fill_box_f32_with<F>(&self, min: Vec3i, max: Vec3i, channel: Channel, f: F) -> Result<()>
    where
        F: Fn(Vec3i) -> f32,
    {
        self.fill_box_with(min, max, channel, |pos| u64::from(f(pos).to_bits()))
    }

    fn fill_box_with<F>(&self, min: Vec3i, max: Vec3i, channel: Channel, f: F) -> Result<()>
    where
        F: Fn(Vec3i) -> u64,
    {
        if (0..3).any(|i| min[i] > max[i]) {
            return Err(StorageError::InvalidBox {
                min: min.into(),
                max: max.into(),
            });
        }

        let mut chunks = self.chunks.write().unwrap_or_else(PoisonError::into_inner);
        for z in min.z..max.z {
            for y in min.y..max.y {
                for x in min.x..max.x {
                    let pos = Vec3i::new(x, y, z);
                    Self::set_raw(&mut chunks, &pos, channel, f(pos));
                }
            }
        }
        Ok(())
    }

    fn set_raw(chunks: &mut HashMap<Vec3i, Chunk>, pos: &Vec3i, channel: Channel, value: u64) {
        let (chunk_pos, index) = locate(pos);
        let chunk = chunks.entry(chunk_pos).or_insert_with(|| {
            log::trace!("allocating voxel chunk at {:?}", chunk_pos);
            Chunk::new()
        });
        chunk.channels[channel.index()].set(index, value);
    }

    fn get_raw(&self, pos: &Vec3i, channel: Channel) -> Option<u64> {
        let (chunk_pos, index) = locate(pos);
        let chunks = self.chunks.read().unwrap_or_else(PoisonError::into_inner);
        chunks
            .get(&chunk_pos)
            .map(|chunk| chunk.channels[channel.index()].get(index))
    }
}

impl VoxelAccess for VoxelData {
    fn get_voxel_u64(&self, pos: Vec3i, channel: Channel, default: u64) -> u64 {
        self.get_raw(&pos, channel).unwrap_or(default)
    }

    fn get_voxel_f32(&self, pos: Vec3i, channel: Channel, default: f32) -> f32 {
        self.get_raw(&pos, channel)
            .map(|raw| f32::from_bits(raw as u32))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SDF_FAR_OUTSIDE;
    use std::sync::Arc;

    #[test]
    fn test_missing_chunk_returns_default() {
        let data = VoxelData::new();
        assert_eq!(data.get_voxel_u64(Vec3i::new(0, 0, 0), Channel::Type, 42), 42);
        assert_eq!(data.get_voxel_f32(Vec3i::new(0, 0, 0), Channel::Sdf, -3.5), -3.5);
        assert_eq!(data.chunk_count(), 0);
    }

    #[test]
    fn test_allocated_chunk_channel_defaults() {
        let data = VoxelData::new();
        data.set_voxel_u64(Vec3i::new(0, 0, 0), Channel::Color, 5);
        // Same chunk, untouched voxel and channels.
        let other = Vec3i::new(3, 4, 5);
        assert_eq!(data.get_voxel_u64(other, Channel::Color, 9), 0);
        assert_eq!(data.get_voxel_u64(other, Channel::Type, 9), 0);
        assert_eq!(data.get_voxel_f32(other, Channel::Sdf, 1.0), SDF_FAR_OUTSIDE);
    }

    #[test]
    fn test_negative_coordinates() {
        let data = VoxelData::new();
        let pos = Vec3i::new(-1, -17, -32);
        data.set_voxel_f32(pos, Channel::Sdf, -0.25);
        assert_eq!(data.get_voxel_f32(pos, Channel::Sdf, 0.0), -0.25);
        assert_eq!(
            data.get_voxel_f32(Vec3i::new(-2, -17, -32), Channel::Sdf, 0.0),
            SDF_FAR_OUTSIDE
        );
        assert_eq!(data.chunk_count(), 1);
    }

    #[test]
    fn test_fill_box_spans_chunks() {
        let data = VoxelData::new();
        data.fill_box_u64(Vec3i::new(-2, 0, 0), Vec3i::new(18, 1, 1), Channel::Type, 3)
            .unwrap();
        assert_eq!(data.chunk_count(), 3);
        assert_eq!(data.get_voxel_u64(Vec3i::new(-2, 0, 0), Channel::Type, 0), 3);
        assert_eq!(data.get_voxel_u64(Vec3i::new(17, 0, 0), Channel::Type, 0), 3);
        assert_eq!(data.get_voxel_u64(Vec3i::new(18, 0, 0), Channel::Type, 0), 0);
    }

    #[test]
    fn test_fill_box_rejects_inverted() {
        let data = VoxelData::new();
        let err = data
            .fill_box_f32(Vec3i::new(1, 0, 0), Vec3i::new(0, 1, 1), Channel::Sdf, 0.0)
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidBox { .. }));
    }

    #[test]
    fn test_fill_box_with_function() {
        let data = VoxelData::new();
        let (min, max) = (Vec3i::new(0, -4, 0), Vec3i::new(1, 4, 1));
        data.fill_box_f32_with(min, max, Channel::Sdf, |p| p.y as f32)
            .unwrap();
        for y in -4..4 {
            assert_eq!(data.get_voxel_f32(Vec3i::new(0, y, 0), Channel::Sdf, 0.0), y as f32);
        }
    }

    #[test]
    fn test_clear() {
        let data = VoxelData::new();
        data.set_voxel_u64(Vec3i::new(0, 0, 0), Channel::Type, 1);
        data.clear();
        assert_eq!(data.get_voxel_u64(Vec3i::new(0, 0, 0), Channel::Type, 0), 0);
        assert_eq!(data.chunk_count(), 0);
    }

    #[test]
    fn test_concurrent_readers_and_writer() {
        let data = Arc::new(VoxelData::new());
        let writer = {
            let data = Arc::clone(&data);
            std::thread::spawn(move || {
                for x in 0..64 {
                    data.set_voxel_u64(Vec3i::new(x, 0, 0), Channel::Type, 1);
                }
            })
        };
        let reader = {
            let data = Arc::clone(&data);
            std::thread::spawn(move || {
                (0..64)
                    .map(|x| data.get_voxel_u64(Vec3i::new(x, 0, 0), Channel::Type, 0))
                    .all(|v| v == 0 || v == 1)
            })
        };
        writer.join().unwrap();
        assert!(reader.join().unwrap());
        assert_eq!(data.get_voxel_u64(Vec3i::new(63, 0, 0), Channel::Type, 0), 1);
    }
}
