use ndarray::{Array2, Axis, Zip};

use crate::shared::frame::Frame;
use crate::shared::mask::Mask;

use super::hsv_range::HsvRange;

/// Fixed-point precision of the hue and saturation divisions.
const HSV_SHIFT: u32 = 12;
const HSV_ROUND: i32 = 1 << (HSV_SHIFT - 1);

/// Converts an RGB triple to 8-bit HSV.
///
/// Hue is returned in half-degrees (0-179), saturation and value in 0-255,
/// matching the convention most camera tooling uses for byte images.
/// Achromatic pixels get hue 0. Divisions use 12-bit fixed-point
/// reciprocals so results agree bit-for-bit with common camera libraries.
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(i32::from);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let saturation = (delta * rounded_reciprocal(255, max) + HSV_ROUND) >> HSV_SHIFT;

    let sector = if max == r {
        g - b
    } else if max == g {
        b - r + 2 * delta
    } else {
        r - g + 4 * delta
    };
    let mut hue = (sector * rounded_reciprocal(30, delta) + HSV_ROUND) >> HSV_SHIFT;
    if hue < 0 {
        hue += 180;
    }

    [hue as u8, saturation as u8, max as u8]
}

/// `round((numerator << HSV_SHIFT) / divisor)`, or 0 for a zero divisor.
fn rounded_reciprocal(numerator: i32, divisor: i32) -> i32 {
    if divisor == 0 {
        return 0;
    }
    ((numerator << (HSV_SHIFT + 1)) + divisor) / (2 * divisor)
}

/// Thresholds a frame against one HSV window.
///
/// The mask cell is set iff hue, saturation and value all fall inside the
/// inclusive bounds. The frame is read only.
pub fn segment(frame: &Frame, range: &HsvRange) -> Mask {
    let mut cells = Array2::from_elem((frame.height() as usize, frame.width() as usize), false);
    Zip::from(&mut cells)
        .and(frame.as_ndarray().lanes(Axis(2)))
        .for_each(|cell, pixel| {
            *cell = range.contains(rgb_to_hsv([pixel[0], pixel[1], pixel[2]]));
        });
    Mask::from_cells(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::black([0, 0, 0], [0, 0, 0])]
    #[case::white([255, 255, 255], [0, 0, 255])]
    #[case::grey([128, 128, 128], [0, 0, 128])]
    #[case::red([255, 0, 0], [0, 255, 255])]
    #[case::yellow([255, 255, 0], [30, 255, 255])]
    #[case::green([0, 255, 0], [60, 255, 255])]
    #[case::blue([0, 0, 255], [120, 255, 255])]
    #[case::magenta([255, 0, 255], [150, 255, 255])]
    #[case::warm_yellow([200, 200, 43], [30, 200, 200])]
    #[case::crimson([255, 0, 60], [173, 255, 255])]
    #[case::dark_blue_rounds_up([0, 1, 58], [120, 255, 58])]
    #[case::dark_blue_rounds_down([0, 1, 61], [119, 255, 61])]
    #[case::dim_grey([10, 10, 10], [0, 0, 10])]
    fn test_rgb_to_hsv(#[case] rgb: [u8; 3], #[case] expected: [u8; 3]) {
        assert_eq!(rgb_to_hsv(rgb), expected);
    }

    #[test]
    fn test_hue_never_reaches_180() {
        // Just below 360 degrees wraps to 0 rather than 180.
        let [h, _, _] = rgb_to_hsv([255, 0, 1]);
        assert!(h < 180);
    }

    #[test]
    fn test_segment_dimensions_match_frame() {
        let frame = Frame::filled(7, 5, [0, 0, 0], 0);
        let mask = segment(&frame, &HsvRange::new((0, 179), (0, 255), (0, 255)));
        assert_eq!(mask.width(), 7);
        assert_eq!(mask.height(), 5);
        assert_eq!(mask.count(), 35);
    }

    #[test]
    fn test_segment_marks_only_matching_pixels() {
        let mut frame = Frame::filled(4, 3, [10, 10, 10], 0);
        frame.set_rgb(2, 1, [200, 200, 43]);
        let range = HsvRange::new((23, 38), (170, 255), (170, 255));

        let mask = segment(&frame, &range);

        assert_eq!(mask.count(), 1);
        assert!(mask.get(2, 1));
    }

    #[test]
    fn test_segment_leaves_frame_untouched() {
        let frame = Frame::filled(3, 3, [255, 0, 0], 0);
        let before = frame.clone();
        let _ = segment(&frame, &HsvRange::new((0, 10), (0, 255), (0, 255)));
        assert_eq!(frame, before);
    }
}
