use crate::shared::constants::{CROSSHAIR_ARM, LABEL_OFFSET_Y};

/// Straight line between two pixel positions, endpoints inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub start: (i32, i32),
    pub end: (i32, i32),
}

/// The four arms of a crosshair, each starting at the marker centre.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Crosshair {
    pub up: Segment,
    pub down: Segment,
    pub left: Segment,
    pub right: Segment,
}

impl Crosshair {
    pub fn segments(&self) -> [Segment; 4] {
        [self.up, self.down, self.left, self.right]
    }
}

/// Lays out a crosshair of `CROSSHAIR_ARM` px arms around `(x, y)`.
///
/// Arms that would leave the frame stop at its edge instead, so every
/// endpoint lies in `[0, width) x [0, height)`.
pub fn crosshair(x: i32, y: i32, width: u32, height: u32) -> Crosshair {
    let max_x = width as i32 - 1;
    let max_y = height as i32 - 1;
    let centre = (x, y);
    Crosshair {
        up: Segment {
            start: centre,
            end: (x, (y - CROSSHAIR_ARM).max(0)),
        },
        down: Segment {
            start: centre,
            end: (x, (y + CROSSHAIR_ARM).min(max_y)),
        },
        left: Segment {
            start: centre,
            end: ((x - CROSSHAIR_ARM).max(0), y),
        },
        right: Segment {
            start: centre,
            end: ((x + CROSSHAIR_ARM).min(max_x), y),
        },
    }
}

/// Baseline origin of the "x,y" label under a marker.
pub fn label_origin(x: i32, y: i32) -> (i32, i32) {
    (x, y + LABEL_OFFSET_Y)
}

pub fn coordinate_label(x: u32, y: u32) -> String {
    format!("{x},{y}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const W: u32 = 640;
    const H: u32 = 480;

    #[test]
    fn test_unclipped_arms_are_full_length() {
        let c = crosshair(320, 240, W, H);
        assert_eq!(c.up.end, (320, 215));
        assert_eq!(c.down.end, (320, 265));
        assert_eq!(c.left.end, (295, 240));
        assert_eq!(c.right.end, (345, 240));
        assert!(c.segments().iter().all(|s| s.start == (320, 240)));
    }

    #[test]
    fn test_origin_clamps_up_and_left_only() {
        let c = crosshair(0, 0, W, H);
        assert_eq!(c.up, Segment { start: (0, 0), end: (0, 0) });
        assert_eq!(c.left, Segment { start: (0, 0), end: (0, 0) });
        assert_eq!(c.down.end, (0, 25));
        assert_eq!(c.right.end, (25, 0));
    }

    #[rstest]
    #[case::top_edge(0, 0, 25)]
    #[case::one_below_top(1, 0, 26)]
    #[case::arm_length(25, 0, 50)]
    #[case::last_row(479, 454, 479)]
    #[case::past_last_row(480, 455, 479)]
    fn test_vertical_clamping(#[case] y: i32, #[case] up_end: i32, #[case] down_end: i32) {
        let c = crosshair(100, y, W, H);
        assert_eq!(c.up.end, (100, up_end));
        assert_eq!(c.down.end, (100, down_end));
    }

    #[rstest]
    #[case::left_edge(0, 0, 25)]
    #[case::one_right_of_edge(1, 0, 26)]
    #[case::last_column(639, 614, 639)]
    #[case::past_last_column(640, 615, 639)]
    fn test_horizontal_clamping(#[case] x: i32, #[case] left_end: i32, #[case] right_end: i32) {
        let c = crosshair(x, 100, W, H);
        assert_eq!(c.left.end, (left_end, 100));
        assert_eq!(c.right.end, (right_end, 100));
    }

    #[test]
    fn test_label_sits_below_marker() {
        assert_eq!(label_origin(10, 20), (10, 50));
        assert_eq!(coordinate_label(10, 20), "10,20");
    }
}
