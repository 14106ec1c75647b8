/// A connected group of foreground mask cells.
///
/// Only area and centroid survive extraction; the pixels themselves are
/// discarded once the moments are accumulated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub area: u64,
    pub x: u32,
    pub y: u32,
}

/// Raw image moments of a binary region: m00 (pixel count), m10 (sum of x)
/// and m01 (sum of y).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegionMoments {
    pub m00: u64,
    pub m10: u64,
    pub m01: u64,
}

impl RegionMoments {
    pub fn add(&mut self, x: u32, y: u32) {
        self.m00 += 1;
        self.m10 += x as u64;
        self.m01 += y as u64;
    }

    /// Normalises the first moments by area, truncating to whole pixels.
    /// Returns `None` for an empty accumulator.
    pub fn to_region(&self) -> Option<Region> {
        if self.m00 == 0 {
            return None;
        }
        Some(Region {
            area: self.m00,
            x: (self.m10 / self.m00) as u32,
            y: (self.m01 / self.m00) as u32,
        })
    }
}
