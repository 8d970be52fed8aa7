//! Power-of-two helpers and aspect-preserving fit math.
//!
//! Output variants snap to power-of-two longest edges. These helpers decide
//! whether a buffer already sits on a POT boundary and compute the target
//! dimensions for a downscale that preserves aspect ratio.

/// Returns true if `value` is a power of two (zero is not).
#[inline]
pub fn is_power_of_two(value: u32) -> bool {
    value != 0 && value & (value - 1) == 0
}

/// Returns the largest power of two less than or equal to `value`.
///
/// Returns `None` for zero.
#[inline]
pub fn floor_power_of_two(value: u32) -> Option<u32> {
    if value == 0 {
        None
    } else {
        Some(1 << (31 - value.leading_zeros()))
    }
}

/// Computes dimensions that fit `(width, height)` to `target_edge` on the
/// longest edge, preserving aspect ratio.
///
/// The shorter edge is scaled proportionally and rounded, with a floor of 1.
/// When the longest edge already equals `target_edge` the input dimensions
/// are returned unchanged.
pub fn fit_to_longest_edge(width: u32, height: u32, target_edge: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest == 0 || longest == target_edge {
        return (width, height);
    }
    let scale = target_edge as f64 / longest as f64;
    let w = ((width as f64 * scale).round() as u32).max(1);
    let h = ((height as f64 * scale).round() as u32).max(1);
    if width >= height {
        (target_edge, h)
    } else {
        (w, target_edge)
    }
}

/// Computes the POT downscale target for a buffer's dimensions.
///
/// Each axis independently snaps to its largest power of two. Returns `None`
/// when both axes already sit on a POT boundary (no rescale needed) or when
/// either dimension is zero.
pub fn pot_downscale_target(width: u32, height: u32) -> Option<(u32, u32)> {
    let target_w = floor_power_of_two(width)?;
    let target_h = floor_power_of_two(height)?;
    if (target_w, target_h) == (width, height) {
        None
    } else {
        Some((target_w, target_h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_power_of_two() {
        assert!(is_power_of_two(1));
        assert!(is_power_of_two(2));
        assert!(is_power_of_two(2048));
        assert!(!is_power_of_two(0));
        assert!(!is_power_of_two(3));
        assert!(!is_power_of_two(1000));
    }

    #[test]
    fn test_floor_power_of_two() {
        assert_eq!(floor_power_of_two(0), None);
        assert_eq!(floor_power_of_two(1), Some(1));
        assert_eq!(floor_power_of_two(1000), Some(512));
        assert_eq!(floor_power_of_two(2048), Some(2048));
        assert_eq!(floor_power_of_two(2049), Some(2048));
    }

    #[test]
    fn test_fit_to_longest_edge_preserves_aspect() {
        assert_eq!(fit_to_longest_edge(2000, 1000, 1024), (1024, 512));
        assert_eq!(fit_to_longest_edge(1000, 2000, 1024), (512, 1024));
        assert_eq!(fit_to_longest_edge(2048, 2048, 1024), (1024, 1024));
    }

    #[test]
    fn test_fit_to_longest_edge_noop_when_equal() {
        assert_eq!(fit_to_longest_edge(1024, 768, 1024), (1024, 768));
    }

    #[test]
    fn test_fit_floors_short_edge_at_one() {
        assert_eq!(fit_to_longest_edge(4096, 1, 2), (2, 1));
    }

    #[test]
    fn test_pot_downscale_target() {
        // Both axes already POT needs no rescale.
        assert_eq!(pot_downscale_target(2048, 1024), None);
        assert_eq!(pot_downscale_target(1, 1), None);
        // Each axis snaps down independently.
        assert_eq!(pot_downscale_target(2000, 1000), Some((1024, 512)));
        assert_eq!(pot_downscale_target(3000, 3000), Some((2048, 2048)));
        assert_eq!(pot_downscale_target(1500, 1024), Some((1024, 1024)));
        assert_eq!(pot_downscale_target(0, 0), None);
    }
}
