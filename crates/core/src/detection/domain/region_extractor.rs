use crate::shared::mask::Mask;

use super::region::Region;

/// Domain interface for connected-component extraction.
///
/// Implementations must report every component with area >= 1 in a stable
/// order; the selector breaks area ties by that order.
pub trait RegionExtractor: Send {
    fn extract(&self, mask: &Mask) -> Vec<Region>;
}
