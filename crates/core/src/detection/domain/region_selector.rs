use super::detection_result::DetectionResult;
use super::region::Region;

/// Size and noise limits applied to one mask's regions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionThresholds {
    /// Exclusive lower area bound.
    pub min_area: u64,
    /// Exclusive upper area bound.
    pub max_area: u64,
    /// Region counts at or above this mark the mask as too noisy.
    pub max_region_count: usize,
}

/// Picks the largest region whose area lies strictly between the bounds.
///
/// The region-count ceiling is checked first and short-circuits selection.
/// Equal areas keep the region seen first.
pub fn select_region(regions: &[Region], thresholds: &SelectionThresholds) -> DetectionResult {
    if regions.len() >= thresholds.max_region_count {
        return DetectionResult::TooNoisy {
            region_count: regions.len(),
        };
    }

    let mut best: Option<&Region> = None;
    for region in regions {
        let in_band = region.area > thresholds.min_area && region.area < thresholds.max_area;
        if in_band && best.map_or(true, |b| region.area > b.area) {
            best = Some(region);
        }
    }

    match best {
        Some(r) => DetectionResult::Found {
            x: r.x,
            y: r.y,
            area: r.area,
        },
        None => DetectionResult::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const THRESHOLDS: SelectionThresholds = SelectionThresholds {
        min_area: 400,
        max_area: 204_800,
        max_region_count: 50,
    };

    fn region(area: u64, x: u32, y: u32) -> Region {
        Region { area, x, y }
    }

    #[test]
    fn test_no_regions_is_not_found() {
        assert_eq!(select_region(&[], &THRESHOLDS), DetectionResult::NotFound);
    }

    #[test]
    fn test_single_region_in_band_is_found() {
        let result = select_region(&[region(900, 30, 40)], &THRESHOLDS);
        assert_eq!(result, DetectionResult::Found { x: 30, y: 40, area: 900 });
    }

    #[test]
    fn test_largest_region_wins() {
        let regions = [region(500, 1, 1), region(2_000, 2, 2), region(800, 3, 3)];
        let result = select_region(&regions, &THRESHOLDS);
        assert_eq!(result.position(), Some((2, 2)));
    }

    #[test]
    fn test_first_seen_wins_ties() {
        let regions = [region(1_000, 10, 10), region(1_000, 20, 20)];
        let result = select_region(&regions, &THRESHOLDS);
        assert_eq!(result.position(), Some((10, 10)));
    }

    #[rstest]
    #[case::at_min_area(400)]
    #[case::below_min_area(12)]
    #[case::at_max_area(204_800)]
    #[case::whole_frame(307_200)]
    fn test_out_of_band_areas_are_rejected(#[case] area: u64) {
        assert_eq!(
            select_region(&[region(area, 5, 5)], &THRESHOLDS),
            DetectionResult::NotFound
        );
    }

    #[test]
    fn test_out_of_band_region_does_not_hide_valid_one() {
        // A later oversized region must not cancel an earlier valid match.
        let regions = [region(600, 4, 4), region(300_000, 9, 9), region(50, 1, 1)];
        let result = select_region(&regions, &THRESHOLDS);
        assert_eq!(result.position(), Some((4, 4)));
    }

    #[test]
    fn test_region_ceiling_reports_noise_regardless_of_area() {
        let regions: Vec<Region> = (0..50).map(|i| region(10_000, i, i)).collect();
        assert_eq!(
            select_region(&regions, &THRESHOLDS),
            DetectionResult::TooNoisy { region_count: 50 }
        );
    }

    #[test]
    fn test_one_below_ceiling_still_selects() {
        let mut regions: Vec<Region> = (0..48).map(|i| region(5, i, i)).collect();
        regions.push(region(450, 100, 100));
        assert_eq!(regions.len(), 49);
        assert_eq!(
            select_region(&regions, &THRESHOLDS).position(),
            Some((100, 100))
        );
    }
}
