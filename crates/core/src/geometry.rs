//! Block geometry - bit index <-> lattice point mapping and mask transforms
//!
//! A block of size N keeps its cells in the low N*N bits of a `u64`.
//! Bit `k` is the cell at lattice row `k / N` (row 0 at the top) and column
//! `k % N`. The mapping to points is center-relative with `y` pointing up.
//!
//! For odd N the center is the middle cell. For even N the center is the
//! corner shared by the four middle cells, so there is no row or column at
//! coordinate 0: a 4x4 lattice maps columns to `-2, -1, 1, 2`. This keeps
//! every quarter turn closed over the lattice.

use crate::algebra::{rotate, ROTATE_180, ROTATE_CCW, ROTATE_CW};
use crate::types::{Point, MAX_BLOCK_SIZE, MIN_BLOCK_SIZE};

/// Whether `size` is a lattice dimension whose mask fits in a `u64`
#[inline]
pub fn is_supported_size(size: u8) -> bool {
    (MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE).contains(&size)
}

/// Number of lattice cells for `size`
#[inline]
pub fn lattice_bits(size: u8) -> u32 {
    size as u32 * size as u32
}

/// Mask with every lattice bit of `size` set
#[inline]
pub fn lattice_mask(size: u8) -> u64 {
    let bits = lattice_bits(size);
    if bits >= u64::BITS {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Center-relative point of lattice bit `bit`
pub fn bit_to_point(bit: u32, size: u8) -> Point {
    let n = size as i32;
    let half = n / 2;
    let mut row = bit as i32 / n;
    let mut col = bit as i32 % n;

    if n % 2 == 0 {
        // Skip the missing center line so the halves mirror each other.
        if row >= half {
            row += 1;
        }
        if col >= half {
            col += 1;
        }
    }

    Point::new(col - half, half - row)
}

/// Lattice bit of a center-relative point
///
/// Inverse of [`bit_to_point`]. Returns `None` for points outside the lattice.
pub fn point_to_bit(point: Point, size: u8) -> Option<u32> {
    let n = size as i32;
    let half = n / 2;
    let mut col = point.x + half;
    let mut row = half - point.y;

    if n % 2 == 0 {
        if point.x > 0 {
            col -= 1;
        }
        if point.y < 0 {
            row -= 1;
        }
    }

    if !(0..n).contains(&row) || !(0..n).contains(&col) {
        return None;
    }
    Some((row * n + col) as u32)
}

/// Iterate the indices of the set lattice bits of `contents`
pub fn set_bits(contents: u64, size: u8) -> impl Iterator<Item = u32> {
    let mut remaining = contents & lattice_mask(size);
    std::iter::from_fn(move || {
        if remaining == 0 {
            return None;
        }
        let bit = remaining.trailing_zeros();
        remaining &= remaining - 1;
        Some(bit)
    })
}

/// Rotate every set cell of `contents` about the lattice center
pub fn transform_mask(contents: u64, size: u8, rotation: Point) -> u64 {
    set_bits(contents, size)
        .filter_map(|bit| point_to_bit(rotate(bit_to_point(bit, size), rotation), size))
        .fold(0u64, |mask, bit| mask | (1u64 << bit))
}

pub fn rotate_cw90(contents: u64, size: u8) -> u64 {
    transform_mask(contents, size, ROTATE_CW)
}

pub fn rotate_ccw90(contents: u64, size: u8) -> u64 {
    transform_mask(contents, size, ROTATE_CCW)
}

pub fn rotate_180(contents: u64, size: u8) -> u64 {
    transform_mask(contents, size, ROTATE_180)
}

/// Number of set bits among the lattice bits of `contents`
#[inline]
pub fn popcount(contents: u64, size: u8) -> u32 {
    (contents & lattice_mask(size)).count_ones()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odd_lattice_points() {
        // 3x3: bit 4 is the center cell
        assert_eq!(bit_to_point(4, 3), Point::new(0, 0));
        assert_eq!(bit_to_point(0, 3), Point::new(-1, 1));
        assert_eq!(bit_to_point(8, 3), Point::new(1, -1));
        assert_eq!(point_to_bit(Point::new(0, 0), 3), Some(4));
    }

    #[test]
    fn test_even_lattice_has_no_zero_line() {
        let xs: Vec<i32> = (0..4).map(|b| bit_to_point(b, 4).x).collect();
        assert_eq!(xs, vec![-2, -1, 1, 2]);
        let ys: Vec<i32> = (0..4).map(|r| bit_to_point(r * 4, 4).y).collect();
        assert_eq!(ys, vec![2, 1, -1, -2]);
    }

    #[test]
    fn test_roundtrip_all_sizes() {
        for size in MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE {
            for bit in 0..lattice_bits(size) {
                let p = bit_to_point(bit, size);
                assert_eq!(point_to_bit(p, size), Some(bit), "size {size} bit {bit}");
            }
        }
    }

    #[test]
    fn test_point_outside_lattice() {
        assert_eq!(point_to_bit(Point::new(2, 0), 3), None);
        assert_eq!(point_to_bit(Point::new(0, -3), 4), None);
    }

    #[test]
    fn test_lattice_mask() {
        assert_eq!(lattice_mask(3), 0x1FF);
        assert_eq!(lattice_mask(4), 0xFFFF);
        assert_eq!(lattice_mask(8), u64::MAX);
    }

    #[test]
    fn test_rotate_t_shape() {
        // .#.      .#.
        // ###  ->  ##.
        // ...      .#.
        let t = 0b000_111_010;
        let cw = rotate_cw90(t, 3);
        assert_eq!(cw, 0b010_011_010);
        assert_eq!(rotate_ccw90(cw, 3), t);
    }

    #[test]
    fn test_even_square_is_rotation_invariant() {
        let square = (1 << 5) | (1 << 6) | (1 << 9) | (1 << 10);
        assert_eq!(rotate_cw90(square, 4), square);
        assert_eq!(rotate_180(square, 4), square);
    }

    #[test]
    fn test_even_bar_rotation() {
        // Row 1 of a 4x4 lattice becomes column 1 or 2 after a quarter turn.
        let bar = 0x00F0;
        let turned = rotate_cw90(bar, 4);
        assert_eq!(popcount(turned, 4), 4);
        assert_ne!(turned, bar);
        assert_eq!(rotate_180(rotate_180(bar, 4), 4), bar);
        assert_eq!(rotate_cw90(turned, 4), rotate_180(bar, 4));
    }

    #[test]
    fn test_popcount_ignores_bits_outside_lattice() {
        assert_eq!(popcount(0b1_0000_0000_0001, 3), 1);
        assert_eq!(popcount(u64::MAX, 8), 64);
    }

    #[test]
    fn test_set_bits_order() {
        let bits: Vec<u32> = set_bits(0b1010_0001, 3).collect();
        assert_eq!(bits, vec![0, 5, 7]);
    }
}
