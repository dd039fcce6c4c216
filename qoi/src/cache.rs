use crate::{utils::hash, Pixel};

/// The 64-slot color array shared (in lock-step) by encoder and decoder.
///
/// A slot is filled by the first pixel hashing into it and is never overwritten afterwards, until
/// the cache is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorCache {
    slots: [Option<Pixel>; 64],
}

impl ColorCache {
    pub const fn new() -> Self {
        Self { slots: [None; 64] }
    }

    /// Offers a pixel to the cache. Returns `true` if it landed in a previously empty slot.
    #[inline]
    pub fn insert(&mut self, pixel: Pixel) -> bool {
        let slot = &mut self.slots[usize::from(hash(pixel))];
        if slot.is_some() {
            return false;
        }

        *slot = Some(pixel);
        true
    }

    #[inline]
    pub fn get(&self, index: u8) -> Option<Pixel> {
        self.slots.get(usize::from(index)).copied().flatten()
    }

    /// Returns the slot index of `pixel` if the cache holds exactly this pixel.
    #[inline]
    pub fn find(&self, pixel: Pixel) -> Option<u8> {
        let index = hash(pixel);
        (self.slots[usize::from(index)] == Some(pixel)).then_some(index)
    }

    pub fn slots(&self) -> &[Option<Pixel>; 64] {
        &self.slots
    }

    pub fn reset(&mut self) {
        self.slots = [None; 64];
    }
}

impl Default for ColorCache {
    fn default() -> Self {
        Self::new()
    }
}
