/// 8-bit RGB color used for markers and overlay text.
pub type Rgb = [u8; 3];

pub const YELLOW: Rgb = [255, 255, 0];
pub const RED: Rgb = [255, 0, 0];
pub const GREEN: Rgb = [0, 255, 0];
