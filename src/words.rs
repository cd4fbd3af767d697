/*!
Arithmetic on unsigned multi-word magnitudes.

A magnitude is a slice of `u32` words, most significant word first. Every
operation works in place on the destination slice and returns the carry,
borrow, remainder or spilled bits, so callers can chain operations across
words that don't fit in one slice.

All intermediate values are widened to `u64`. Nothing here allocates.
*/

use std::cmp::Ordering;

const WORD_MASK: u64 = 0xFFFF_FFFF;

/// Clear every word of `z`.
pub fn zero(z: &mut [u32]) {
    z.fill(0);
}

/// Copy `x` into `z`. Both slices must have the same length.
pub fn copy(z: &mut [u32], x: &[u32]) {
    z.copy_from_slice(x);
}

/// `z += x + carry`, returning the carry out of the most significant word.
pub fn add(z: &mut [u32], x: &[u32], carry: u32) -> u32 {
    debug_assert_eq!(z.len(), x.len());

    let mut c = u64::from(carry);
    for (z, x) in z.iter_mut().zip(x).rev() {
        c += u64::from(*z) + u64::from(*x);
        *z = (c & WORD_MASK) as u32;
        c >>= 32;
    }
    c as u32
}

/// `z -= x + borrow`, returning the borrow out of the most significant word.
pub fn sub(z: &mut [u32], x: &[u32], borrow: u32) -> u32 {
    debug_assert_eq!(z.len(), x.len());

    let mut c = u64::from(borrow);
    for (z, x) in z.iter_mut().zip(x).rev() {
        let y = u64::from(*z)
            .wrapping_sub(u64::from(*x))
            .wrapping_sub(c);
        *z = (y & WORD_MASK) as u32;
        c = u64::from(y > WORD_MASK);
    }
    c as u32
}

/// `z = z * k + carry`, returning the carry out of the most significant word.
pub fn mul(z: &mut [u32], k: u32, carry: u32) -> u32 {
    let mut c = u64::from(carry);
    for z in z.iter_mut().rev() {
        let y = u64::from(*z) * u64::from(k) + c;
        *z = (y & WORD_MASK) as u32;
        c = y >> 32;
    }
    c as u32
}

/// `z = (rem * 2^(32 * len) + z) / k`, returning the remainder.
///
/// `rem` must be smaller than `k`.
///
/// # Panics
///
/// Panics if `k` is zero.
pub fn div(z: &mut [u32], k: u32, rem: u32) -> u32 {
    assert!(k != 0, "division of a word array by zero");
    debug_assert!(rem < k);

    let k = u64::from(k);
    let mut c = u64::from(rem);
    for z in z.iter_mut() {
        let y = (c << 32) | u64::from(*z);
        *z = (y / k) as u32;
        c = y % k;
    }
    c as u32
}

/// Shift `z` left by `bits` (`0 < bits < 32`), filling the vacated low bits
/// from `bits_in`. Returns the bits shifted out of the top.
pub fn shl(z: &mut [u32], bits: u32, bits_in: u32) -> u32 {
    debug_assert!(bits > 0 && bits < 32);

    let mask = (1u64 << bits) - 1;
    let mut c = u64::from(bits_in) & mask;
    for z in z.iter_mut().rev() {
        let y = (u64::from(*z) << bits) | c;
        *z = (y & WORD_MASK) as u32;
        c = y >> 32;
    }
    c as u32
}

/// Shift `z` right by `bits` (`0 < bits < 32`), filling the vacated high bits
/// from `bits_in`. Returns the bits shifted out of the bottom.
pub fn shr(z: &mut [u32], bits: u32, bits_in: u32) -> u32 {
    debug_assert!(bits > 0 && bits < 32);

    let mask = (1u64 << bits) - 1;
    let mut c = u64::from(bits_in) & mask;
    for z in z.iter_mut() {
        let y = (c << 32) | u64::from(*z);
        *z = (y >> bits) as u32;
        c = y & mask;
    }
    c as u32
}

/// Compare two magnitudes of the same length.
pub fn cmp(x: &[u32], y: &[u32]) -> Ordering {
    debug_assert_eq!(x.len(), y.len());
    x.cmp(y)
}

pub fn is_zero(x: &[u32]) -> bool {
    x.iter().all(|word| *word == 0)
}

/// Index of the most significant set bit of `x`.
pub fn msb_word(x: u32) -> Option<u32> {
    x.checked_ilog2()
}

/// Index of the most significant set bit of the whole array, counting from
/// the least significant bit of the last word.
pub fn msb(x: &[u32]) -> Option<u32> {
    let n = x.len();
    x.iter().enumerate().find_map(|(i, word)| {
        msb_word(*word).map(|m| m + ((n - i - 1) as u32) * 32)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_propagates_carry_across_words() {
        let mut z = [0, 0xFFFF_FFFF, 0xFFFF_FFFF];
        let carry = add(&mut z, &[0, 0, 1], 0);
        assert_eq!(z, [1, 0, 0]);
        assert_eq!(carry, 0);

        let mut z = [0xFFFF_FFFF, 0xFFFF_FFFF];
        let carry = add(&mut z, &[0, 0], 1);
        assert_eq!(z, [0, 0]);
        assert_eq!(carry, 1);
    }

    #[test]
    fn sub_propagates_borrow_across_words() {
        let mut z = [1, 0, 0];
        let borrow = sub(&mut z, &[0, 0, 1], 0);
        assert_eq!(z, [0, 0xFFFF_FFFF, 0xFFFF_FFFF]);
        assert_eq!(borrow, 0);

        let mut z = [0, 0];
        let borrow = sub(&mut z, &[0, 1], 0);
        assert_eq!(z, [0xFFFF_FFFF, 0xFFFF_FFFF]);
        assert_eq!(borrow, 1);
    }

    #[test]
    fn sub_undoes_add() {
        let original = [3, 0x8000_0000, 0x1234_5678];
        let x = [1, 0x9000_0000, 0xFFFF_FFFF];
        let mut z = original;
        let carry = add(&mut z, &x, 0);
        let borrow = sub(&mut z, &x, 0);
        assert_eq!(z, original);
        assert_eq!(carry, borrow);
    }

    #[test]
    fn mul_and_div_by_scalar() {
        let mut z = [0, 0x8000_0000];
        assert_eq!(mul(&mut z, 4, 0), 0);
        assert_eq!(z, [2, 0]);

        let mut z = [0xFFFF_FFFF, 0];
        assert_eq!(mul(&mut z, 16, 3), 0xF);
        assert_eq!(z, [0xFFFF_FFF0, 3]);

        let mut z = [1, 0];
        assert_eq!(div(&mut z, 2, 0), 0);
        assert_eq!(z, [0, 0x8000_0000]);

        let mut z = [0, 10];
        assert_eq!(div(&mut z, 3, 0), 1);
        assert_eq!(z, [0, 3]);
    }

    #[test]
    #[should_panic(expected = "division of a word array by zero")]
    fn div_by_zero_panics() {
        let mut z = [1, 2];
        div(&mut z, 0, 0);
    }

    #[test]
    fn shifts_carry_bits_between_words() {
        let mut z = [0x8000_0001, 0x8000_0000];
        let out = shl(&mut z, 1, 1);
        assert_eq!(z, [0x0000_0003, 0x0000_0001]);
        assert_eq!(out, 1);

        let out = shr(&mut z, 1, 1);
        assert_eq!(z, [0x8000_0001, 0x8000_0000]);
        assert_eq!(out, 1);

        let mut z = [0, 0x0000_00F0];
        assert_eq!(shr(&mut z, 4, 0), 0);
        assert_eq!(z, [0, 0x0000_000F]);
        assert_eq!(shr(&mut z, 4, 0), 0xF);
        assert_eq!(z, [0, 0]);
    }

    #[test]
    fn cmp_is_lexicographic_from_the_top() {
        assert_eq!(cmp(&[1, 0], &[0, 0xFFFF_FFFF]), Ordering::Greater);
        assert_eq!(cmp(&[0, 1], &[0, 2]), Ordering::Less);
        assert_eq!(cmp(&[7, 7], &[7, 7]), Ordering::Equal);
    }

    #[test]
    fn zero_detection_and_msb() {
        assert!(is_zero(&[0, 0, 0]));
        assert!(!is_zero(&[0, 0, 1]));

        assert_eq!(msb_word(0), None);
        assert_eq!(msb_word(1), Some(0));
        assert_eq!(msb_word(0x8000_0000), Some(31));

        assert_eq!(msb(&[0, 0]), None);
        assert_eq!(msb(&[0, 1]), Some(0));
        assert_eq!(msb(&[1, 0]), Some(32));
        assert_eq!(msb(&[0, 0x0001_0000, 0]), Some(48));
    }

    #[test]
    fn zero_and_copy() {
        let mut z = [1, 2, 3];
        copy(&mut z, &[4, 5, 6]);
        assert_eq!(z, [4, 5, 6]);
        zero(&mut z);
        assert_eq!(z, [0, 0, 0]);
    }
}
