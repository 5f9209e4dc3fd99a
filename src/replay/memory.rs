//! Sparse word-addressed memory image for replayed stacks.

use crate::sampler::walker::{FrameMemory, WORD_SIZE};
use serde::{Deserialize, Serialize};

/// A contiguous run of readable words starting at `base`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRegion {
    pub base: u32,
    pub words: Vec<u32>,
}

impl MemoryRegion {
    pub fn new(base: u32, words: Vec<u32>) -> Self {
        Self { base, words }
    }

    /// One past the last byte, widened so it cannot overflow
    fn end(&self) -> u64 {
        u64::from(self.base) + self.words.len() as u64 * u64::from(WORD_SIZE)
    }

    fn index_of(&self, address: u32) -> Option<usize> {
        let address_wide = u64::from(address);
        if address < self.base || address_wide >= self.end() {
            return None;
        }

        let offset = address - self.base;
        if offset % WORD_SIZE != 0 {
            return None;
        }
        Some((offset / WORD_SIZE) as usize)
    }
}

/// Memory made of disjoint regions; everything else is unmapped
#[derive(Debug, Clone, Default)]
pub struct MemoryImage {
    regions: Vec<MemoryRegion>,
}

impl MemoryImage {
    pub fn new(regions: Vec<MemoryRegion>) -> Self {
        Self { regions }
    }

    pub fn regions(&self) -> &[MemoryRegion] {
        &self.regions
    }

    /// Check alignment, bounds and overlap of every region
    pub fn check(&self) -> Result<(), String> {
        let mut spans: Vec<(u64, u64)> = Vec::with_capacity(self.regions.len());

        for region in &self.regions {
            if region.base % WORD_SIZE != 0 {
                return Err(format!("region at 0x{:08x} is not word aligned", region.base));
            }
            if region.end() > u64::from(u32::MAX) + 1 {
                return Err(format!("region at 0x{:08x} runs past the address space", region.base));
            }
            spans.push((u64::from(region.base), region.end()));
        }

        spans.sort_unstable();
        for pair in spans.windows(2) {
            if pair[1].0 < pair[0].1 {
                return Err(format!("regions overlap at 0x{:08x}", pair[1].0));
            }
        }

        Ok(())
    }

    fn locate(&self, address: u32) -> Option<(&MemoryRegion, usize)> {
        self.regions
            .iter()
            .find_map(|region| region.index_of(address).map(|index| (region, index)))
    }
}

impl FrameMemory for MemoryImage {
    fn is_valid(&self, address: u32) -> bool {
        self.locate(address).is_some()
    }

    fn read_word(&self, address: u32) -> Option<u32> {
        self.locate(address).map(|(region, index)| region.words[index])
    }
}
