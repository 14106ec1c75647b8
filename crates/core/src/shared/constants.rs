pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Areas at or below this (20x20 px) are treated as color noise.
pub const DEFAULT_MIN_AREA: u64 = 20 * 20;

/// A mask with this many regions or more is considered too noisy to track.
pub const DEFAULT_MAX_REGION_COUNT: usize = 50;

/// The derived upper area bound is `frame area / MAX_AREA_DIVISOR`.
pub const MAX_AREA_DIVISOR: f64 = 1.5;

/// Hue is stored in half-degrees; 180 is accepted as an inclusive upper bound.
pub const HUE_LIMIT: u8 = 180;

pub const MARKER_RADIUS: i32 = 20;
pub const CROSSHAIR_ARM: i32 = 25;
pub const MARKER_THICKNESS: i32 = 2;
pub const LABEL_OFFSET_Y: i32 = 30;

/// Top-left anchor of the status line (baseline at y = 50).
pub const STATUS_ORIGIN: (i32, i32) = (0, 50);

pub const TRACKING_MESSAGE: &str = "Tracking Object";
pub const NOISE_MESSAGE: &str = "TOO MUCH NOISE! ADJUST FILTER";
