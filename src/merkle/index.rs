/// Smallest leaf index a multi-proof must include to double as a valid
/// append basis for a tree of `element_count` elements.
///
/// Clearing the lowest set bit of the count yields the offset of the last
/// complete subtree boundary; any proof covering an element at or beyond
/// it necessarily walks through every boundary node the append inference
/// needs.
pub fn minimum_index(element_count: u32) -> u32 {
    element_count & element_count.wrapping_sub(1)
}
