use crate::block_state::BlockState;
use crate::error::{BuildError, Result};
use crate::region::Region;
use crate::world::World;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Palette-compressed dense storage of a volume's contents.
///
/// Cells are one palette index each, laid out x-fastest, then z, then y --
/// the same linear order `Region::iter` walks. Snapshots and the clipboard
/// are both block buffers; the in-memory world backs its storage with one
/// as well.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockBuffer {
    size: (i32, i32, i32),
    palette: Vec<BlockState>,
    cells: Vec<usize>,
    #[serde(skip, default = "FxHashMap::default")]
    palette_index: FxHashMap<BlockState, usize>,
}

impl BlockBuffer {
    /// An air-filled buffer of the given dimensions. Palette slot 0 is air.
    pub fn new(size: (i32, i32, i32)) -> Self {
        debug_assert!(size.0 > 0 && size.1 > 0 && size.2 > 0);
        let volume = size.0 as usize * size.1 as usize * size.2 as usize;

        let air = BlockState::air();
        let mut palette_index = FxHashMap::default();
        palette_index.insert(air.clone(), 0);

        BlockBuffer {
            size,
            palette: vec![air],
            cells: vec![0; volume],
            palette_index,
        }
    }

    /// A buffer of the given dimensions with every cell set to `block`.
    pub fn filled(size: (i32, i32, i32), block: &BlockState) -> Self {
        let mut buffer = BlockBuffer::new(size);
        let index = buffer.get_or_insert_in_palette(block);
        buffer.cells.fill(index);
        buffer
    }

    /// Read every cell of `region` out of the world. Fails defensively if the
    /// world refuses a read; callers are expected to have validated the region
    /// against the world bounds already.
    pub fn capture(world: &dyn World, region: &Region) -> Result<Self> {
        let mut buffer = BlockBuffer::new(region.dimensions());
        for (i, pos) in region.iter().enumerate() {
            let block = world.block_at(pos).ok_or_else(|| {
                BuildError::OperationFailed(format!("world refused read at {}", pos))
            })?;
            let palette_slot = buffer.get_or_insert_in_palette(&block);
            buffer.cells[i] = palette_slot;
        }
        Ok(buffer)
    }

    pub fn size(&self) -> (i32, i32, i32) {
        self.size
    }

    pub fn volume(&self) -> u64 {
        self.cells.len() as u64
    }

    #[inline(always)]
    fn coords_to_index(&self, dx: i32, dy: i32, dz: i32) -> usize {
        (dx + dz * self.size.0 + dy * self.size.0 * self.size.2) as usize
    }

    /// Cell at relative coordinates within the buffer.
    pub fn get(&self, dx: i32, dy: i32, dz: i32) -> &BlockState {
        &self.palette[self.cells[self.coords_to_index(dx, dy, dz)]]
    }

    pub fn set(&mut self, dx: i32, dy: i32, dz: i32, block: &BlockState) {
        let cell = self.coords_to_index(dx, dy, dz);
        let palette_slot = self.get_or_insert_in_palette(block);
        self.cells[cell] = palette_slot;
    }

    /// Cell at a linear index, in `Region::iter` order.
    pub fn get_index(&self, index: usize) -> &BlockState {
        &self.palette[self.cells[index]]
    }

    pub fn set_index(&mut self, index: usize, block: &BlockState) {
        let palette_slot = self.get_or_insert_in_palette(block);
        self.cells[index] = palette_slot;
    }

    pub fn get_or_insert_in_palette(&mut self, block: &BlockState) -> usize {
        match self.palette_index.get(block) {
            Some(&index) => index,
            None => {
                let index = self.palette.len();
                self.palette.push(block.clone());
                self.palette_index.insert(block.clone(), index);
                index
            }
        }
    }

    /// Rewrite every cell matching `from` to `to`, at the palette level.
    /// Returns the number of cells affected.
    pub fn replace_all(&mut self, from: &BlockState, to: &BlockState) -> u64 {
        let mut swapped = Vec::new();
        for (slot, entry) in self.palette.iter_mut().enumerate() {
            if entry == from {
                *entry = to.clone();
                swapped.push(slot);
            }
        }
        if swapped.is_empty() {
            return 0;
        }
        self.rebuild_palette_index();
        self.cells
            .iter()
            .filter(|&&cell| swapped.contains(&cell))
            .count() as u64
    }

    pub fn count_of(&self, block: &BlockState) -> u64 {
        let matching: Vec<usize> = self
            .palette
            .iter()
            .enumerate()
            .filter(|(_, entry)| *entry == block)
            .map(|(slot, _)| slot)
            .collect();
        self.cells
            .iter()
            .filter(|&&cell| matching.contains(&cell))
            .count() as u64
    }

    /// Recompute the palette lookup map; needed after deserialization since
    /// the map is not persisted.
    pub fn rebuild_palette_index(&mut self) {
        self.palette_index = FxHashMap::default();
        self.palette_index.reserve(self.palette.len());
        for (index, block) in self.palette.iter().enumerate() {
            // First occurrence wins when replace_all left duplicate entries
            self.palette_index.entry(block.clone()).or_insert(index);
        }
    }

    /// Iterate `(relative position, cell)` pairs in linear order.
    pub fn iter(&self) -> impl Iterator<Item = ((i32, i32, i32), &BlockState)> + '_ {
        let (w, _, l) = (self.size.0, self.size.1, self.size.2);
        self.cells.iter().enumerate().map(move |(i, &cell)| {
            let i = i as i32;
            let dx = i % w;
            let dz = (i / w) % l;
            let dy = i / (w * l);
            ((dx, dy, dz), &self.palette[cell])
        })
    }
}

impl PartialEq for BlockBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size
            && self
                .cells
                .iter()
                .zip(other.cells.iter())
                .all(|(&a, &b)| self.palette[a] == other.palette[b])
    }
}
