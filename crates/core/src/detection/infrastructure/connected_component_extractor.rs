use std::collections::HashMap;

use image::{GrayImage, Luma};
use imageproc::region_labelling::{self, connected_components};

use crate::detection::domain::region::{Region, RegionMoments};
use crate::detection::domain::region_extractor::RegionExtractor;
use crate::shared::mask::Mask;

const BACKGROUND: Luma<u8> = Luma([0]);
const FOREGROUND: Luma<u8> = Luma([255]);

/// Pixel adjacency used when grouping foreground cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Connectivity {
    /// Edge neighbours only.
    Four,
    /// Edge and corner neighbours.
    #[default]
    Eight,
}

impl From<Connectivity> for region_labelling::Connectivity {
    fn from(c: Connectivity) -> Self {
        match c {
            Connectivity::Four => region_labelling::Connectivity::Four,
            Connectivity::Eight => region_labelling::Connectivity::Eight,
        }
    }
}

/// Labels connected components with imageproc and reduces each label to
/// its raw moments in a single raster pass.
///
/// Regions come out in raster order of their first (top-most, then
/// left-most) pixel. Holes are not reported; a component sitting inside
/// another's hole is its own region.
pub struct ConnectedComponentExtractor {
    connectivity: Connectivity,
}

impl ConnectedComponentExtractor {
    pub fn new(connectivity: Connectivity) -> Self {
        Self { connectivity }
    }
}

impl Default for ConnectedComponentExtractor {
    fn default() -> Self {
        Self::new(Connectivity::Eight)
    }
}

impl RegionExtractor for ConnectedComponentExtractor {
    fn extract(&self, mask: &Mask) -> Vec<Region> {
        if mask.width() == 0 || mask.height() == 0 || mask.count() == 0 {
            return Vec::new();
        }

        let image = GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
            if mask.get(x, y) {
                FOREGROUND
            } else {
                BACKGROUND
            }
        });
        let labelled = connected_components(&image, self.connectivity.into(), BACKGROUND);

        let mut slot_by_label: HashMap<u32, usize> = HashMap::new();
        let mut moments: Vec<RegionMoments> = Vec::new();
        for (x, y, label) in labelled.enumerate_pixels() {
            let label = label[0];
            if label == 0 {
                continue;
            }
            let slot = *slot_by_label.entry(label).or_insert_with(|| {
                moments.push(RegionMoments::default());
                moments.len() - 1
            });
            moments[slot].add(x, y);
        }

        moments.iter().filter_map(RegionMoments::to_region).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(mask: &Mask) -> Vec<Region> {
        ConnectedComponentExtractor::default().extract(mask)
    }

    #[test]
    fn test_empty_mask_has_no_regions() {
        assert!(extract(&Mask::new(64, 48)).is_empty());
    }

    #[test]
    fn test_single_square_area_and_centroid() {
        let mut mask = Mask::new(100, 100);
        mask.fill_rect(10, 20, 21, 21); // x 10..=30, y 20..=40
        let regions = extract(&mask);
        assert_eq!(regions, vec![Region { area: 441, x: 20, y: 30 }]);
    }

    #[test]
    fn test_centroid_truncates_fraction() {
        let mut mask = Mask::new(10, 10);
        mask.fill_rect(0, 0, 2, 1); // pixels (0,0), (1,0): mean x = 0.5
        let regions = extract(&mask);
        assert_eq!(regions, vec![Region { area: 2, x: 0, y: 0 }]);
    }

    #[test]
    fn test_disjoint_regions_in_raster_order() {
        let mut mask = Mask::new(50, 50);
        mask.fill_rect(30, 30, 5, 5);
        mask.fill_rect(2, 2, 3, 3);
        mask.fill_rect(40, 1, 2, 2);
        let regions = extract(&mask);
        assert_eq!(regions.len(), 3);
        assert_eq!((regions[0].x, regions[0].y), (40, 1));
        assert_eq!((regions[1].x, regions[1].y), (3, 3));
        assert_eq!((regions[2].x, regions[2].y), (32, 32));
    }

    #[test]
    fn test_diagonal_neighbours_depend_on_connectivity() {
        let mut mask = Mask::new(4, 4);
        mask.set(0, 0, true);
        mask.set(1, 1, true);

        assert_eq!(extract(&mask).len(), 1);
        let four = ConnectedComponentExtractor::new(Connectivity::Four).extract(&mask);
        assert_eq!(four.len(), 2);
    }

    #[test]
    fn test_ring_excludes_hole_and_inner_blob_is_separate() {
        // 9x9 ring with a 5x5 hole, plus a single pixel in the hole's centre
        let mut mask = Mask::new(20, 20);
        mask.fill_rect(0, 0, 9, 9);
        for y in 2..7 {
            for x in 2..7 {
                mask.set(x, y, false);
            }
        }
        mask.set(4, 4, true);

        let regions = extract(&mask);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].area, 81 - 25);
        assert_eq!((regions[0].x, regions[0].y), (4, 4));
        assert_eq!(regions[1], Region { area: 1, x: 4, y: 4 });
    }

    #[test]
    fn test_every_region_has_positive_area() {
        let mut mask = Mask::new(30, 30);
        for i in 0..10 {
            mask.set(i * 3, i * 3, true);
        }
        let regions = extract(&mask);
        assert_eq!(regions.len(), 10);
        assert!(regions.iter().all(|r| r.area >= 1));
    }
}
