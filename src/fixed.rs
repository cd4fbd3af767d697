//! Signed fixed-point reals stored on `N` 32-bit words.
//!
//! Word 0 holds the integer part and words `1..N` hold base-2³² fractional
//! digits, so a `Fixed<N>` covers magnitudes from `2^-(32 * (N - 1))` up to
//! (but excluding) `2^32`. Results are truncated, never rounded, and overflow
//! out of the integer word wraps silently.

use std::{
    cmp::Ordering,
    ops::{Add, AddAssign, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign},
};

use crate::words;

const WORD_MASK: u64 = 0xFFFF_FFFF;
const WORD_SCALE: f64 = 4_294_967_296.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sign {
    Negative,
    Zero,
    Positive,
}

impl Sign {
    pub fn signum(self) -> i32 {
        match self {
            Sign::Negative => -1,
            Sign::Zero => 0,
            Sign::Positive => 1,
        }
    }
}

impl Neg for Sign {
    type Output = Sign;

    fn neg(self) -> Sign {
        match self {
            Sign::Negative => Sign::Positive,
            Sign::Zero => Sign::Zero,
            Sign::Positive => Sign::Negative,
        }
    }
}

impl Mul for Sign {
    type Output = Sign;

    fn mul(self, rhs: Sign) -> Sign {
        match (self, rhs) {
            (Sign::Zero, _) | (_, Sign::Zero) => Sign::Zero,
            (a, b) if a == b => Sign::Positive,
            _ => Sign::Negative,
        }
    }
}

/// A fixed-point number with a sign and an `N`-word magnitude.
///
/// The sign is [`Sign::Zero`] exactly when every magnitude word is zero, and
/// zero always stores an all-zero magnitude. Every operation restores this,
/// which is what makes the derived equality and hashing sound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fixed<const N: usize> {
    sign: Sign,
    magnitude: [u32; N],
}

impl<const N: usize> Fixed<N> {
    pub const ZERO: Self = Self {
        sign: Sign::Zero,
        magnitude: [0; N],
    };

    /// Number of words.
    pub const WORDS: usize = N;

    /// Log2 of the least significant bit.
    pub const LOG2_MIN: i32 = -32 * (N as i32 - 1);

    /// Log2 of the most significant bit.
    pub const LOG2_MAX: i32 = 31;

    /// Build a value from raw magnitude words.
    pub fn from_words(negative: bool, magnitude: [u32; N]) -> Self {
        let sign = if negative {
            Sign::Negative
        } else {
            Sign::Positive
        };
        let mut value = Self { sign, magnitude };
        value.normalize();
        value
    }

    /// Convert to another precision, padding new fractional words with zero
    /// or truncating the ones that don't fit.
    pub fn resize<const M: usize>(&self) -> Fixed<M> {
        let mut magnitude = [0; M];
        let shared = M.min(N);
        words::copy(&mut magnitude[..shared], &self.magnitude[..shared]);

        let mut value = Fixed {
            sign: self.sign,
            magnitude,
        };
        value.normalize();
        value
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }

    pub fn signum(&self) -> i32 {
        self.sign.signum()
    }

    pub fn is_zero(&self) -> bool {
        self.sign == Sign::Zero
    }

    pub fn is_negative(&self) -> bool {
        self.sign == Sign::Negative
    }

    pub fn words(&self) -> &[u32; N] {
        &self.magnitude
    }

    pub fn to_f64(&self) -> f64 {
        let magnitude: f64 = self
            .magnitude
            .iter()
            .enumerate()
            .map(|(i, word)| f64::from(*word) * 2f64.powi(-32 * i as i32))
            .sum();
        f64::from(self.signum()) * magnitude
    }

    /// Nearest integer, rounding half up on the first fractional word only.
    pub fn round(&self) -> i64 {
        let mut value = self.int_part().abs();
        if self.magnitude.get(1).map_or(false, |word| *word >= 0x8000_0000) {
            value += 1;
        }
        i64::from(self.signum()) * value
    }

    /// Integer part, truncated toward zero.
    pub fn int_part(&self) -> i64 {
        let integer = self.magnitude.first().copied().unwrap_or(0);
        i64::from(self.signum()) * i64::from(integer)
    }

    /// `K` such that `|self|` lies in `[2^K, 2^(K+1))`, or `None` for zero.
    pub fn log2(&self) -> Option<i32> {
        words::msb(&self.magnitude).map(|bit| bit as i32 + Self::LOG2_MIN)
    }

    pub fn abs(self) -> Self {
        match self.sign {
            Sign::Negative => -self,
            _ => self,
        }
    }

    pub fn negate(&mut self) {
        self.sign = -self.sign;
    }

    /// `self *= k`.
    pub fn mul_u32(&mut self, k: u32) {
        if k == 0 {
            *self = Self::ZERO;
            return;
        }
        if self.is_zero() || k == 1 {
            return;
        }
        words::mul(&mut self.magnitude, k, 0);
        self.normalize();
    }

    /// `self /= k`, truncated.
    ///
    /// # Panics
    ///
    /// Panics if `k` is zero.
    pub fn div_u32(&mut self, k: u32) {
        assert!(k != 0, "fixed-point division by zero");
        if self.is_zero() || k == 1 {
            return;
        }
        words::div(&mut self.magnitude, k, 0);
        self.normalize();
    }

    /// `self *= k`.
    pub fn mul_int(&mut self, k: i32) {
        if k < 0 {
            self.negate();
        }
        self.mul_u32(k.unsigned_abs());
    }

    /// `self /= k`, truncated toward zero.
    ///
    /// # Panics
    ///
    /// Panics if `k` is zero.
    pub fn div_int(&mut self, k: i32) {
        if k < 0 {
            self.negate();
        }
        self.div_u32(k.unsigned_abs());
    }

    /// `self *= 2^k`. Bits shifted past either end of the magnitude are lost.
    pub fn mul_pow2(&mut self, k: i32) {
        if self.is_zero() {
            return;
        }

        let mut remaining = k;
        while remaining != 0 {
            let step = remaining.clamp(-31, 31);
            if step > 0 {
                words::shl(&mut self.magnitude, step as u32, 0);
            } else {
                words::shr(&mut self.magnitude, step.unsigned_abs(), 0);
            }
            remaining -= step;
            if words::is_zero(&self.magnitude) {
                break;
            }
        }
        self.normalize();
    }

    /// `1 / self`, or `None` for zero and for results that overflow the
    /// integer word.
    ///
    /// Seeded from `f64` and refined with Newton steps `x * (2 - self * x)`,
    /// each of which roughly doubles the number of correct bits.
    pub fn recip(&self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }

        let seed = 1.0 / self.to_f64();
        if !seed.is_finite() || seed.abs() >= WORD_SCALE {
            return None;
        }

        let two = Self::from(2);
        let mut x = Self::from(seed);
        let mut product = Self::ZERO;
        let mut next = Self::ZERO;

        let mut correct_bits = 48;
        let mut steps = 1;
        while correct_bits < 32 * N {
            correct_bits *= 2;
            steps += 1;
        }

        for _ in 0..steps {
            multiply(&mut product, self, &x);
            let correction = two - product;
            multiply(&mut next, &x, &correction);
            if next == x {
                break;
            }
            x = next;
        }
        Some(x)
    }

    fn add_signed(&mut self, sign: Sign, magnitude: &[u32; N]) {
        if sign == Sign::Zero {
            return;
        }
        if self.is_zero() {
            self.sign = sign;
            self.magnitude = *magnitude;
            return;
        }

        if self.sign == sign {
            words::add(&mut self.magnitude, magnitude, 0);
        } else if words::cmp(&self.magnitude, magnitude) == Ordering::Less {
            let smaller = self.magnitude;
            self.sign = sign;
            self.magnitude = *magnitude;
            words::sub(&mut self.magnitude, &smaller, 0);
        } else {
            words::sub(&mut self.magnitude, magnitude, 0);
        }
        self.normalize();
    }

    fn normalize(&mut self) {
        if self.sign == Sign::Zero || words::is_zero(&self.magnitude) {
            *self = Self::ZERO;
        }
    }
}

/// `result = x * y`, truncated to `N` words.
///
/// Partial products that land below the last word are dropped before they
/// are summed, so the result can be a few units of the last word below the
/// exact truncated product.
pub fn multiply<const N: usize>(result: &mut Fixed<N>, x: &Fixed<N>, y: &Fixed<N>) {
    if x.is_zero() || y.is_zero() {
        *result = Fixed::ZERO;
        return;
    }

    // Word i of x times word j of y has weight 2^(-32 * (i + j)): the low half
    // lands in word i + j and the high half in word i + j - 1.
    let mut acc = [0u64; N];
    for (i, &xi) in x.magnitude.iter().enumerate() {
        if xi == 0 {
            continue;
        }
        for (j, &yj) in y.magnitude.iter().enumerate() {
            let k = i + j;
            if k > N {
                break;
            }
            let product = u64::from(xi) * u64::from(yj);
            if k < N {
                acc[k] += product & WORD_MASK;
            }
            if k > 0 {
                acc[k - 1] += product >> 32;
            }
        }
    }

    let mut carry = 0u64;
    for (word, partial) in result.magnitude.iter_mut().zip(&acc).rev() {
        carry += partial;
        *word = (carry & WORD_MASK) as u32;
        carry >>= 32;
    }
    result.sign = x.sign * y.sign;
    result.normalize();
}

impl<const N: usize> Default for Fixed<N> {
    fn default() -> Self {
        Self::ZERO
    }
}

impl<const N: usize> From<u32> for Fixed<N> {
    fn from(value: u32) -> Self {
        let mut magnitude = [0; N];
        if let Some(integer) = magnitude.first_mut() {
            *integer = value;
        }
        Self::from_words(false, magnitude)
    }
}

impl<const N: usize> From<i32> for Fixed<N> {
    fn from(value: i32) -> Self {
        let mut fixed = Self::from(value.unsigned_abs());
        if value < 0 {
            fixed.negate();
        }
        fixed
    }
}

/// Truncating conversion. NaN becomes zero and magnitudes of `2^32` or more
/// (infinities included) saturate to the largest representable magnitude.
impl<const N: usize> From<f64> for Fixed<N> {
    fn from(value: f64) -> Self {
        if value == 0.0 || value.is_nan() {
            return Self::ZERO;
        }

        let mut x = value.abs();
        if x >= WORD_SCALE {
            return Self::from_words(value < 0.0, [u32::MAX; N]);
        }

        let mut magnitude = [0; N];
        for word in magnitude.iter_mut() {
            let whole = x.floor();
            *word = whole as u32;
            x = (x - whole) * WORD_SCALE;
        }
        Self::from_words(value < 0.0, magnitude)
    }
}

impl<const N: usize> From<Fixed<N>> for f64 {
    fn from(value: Fixed<N>) -> f64 {
        value.to_f64()
    }
}

impl<const N: usize> PartialOrd for Fixed<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const N: usize> Ord for Fixed<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.sign.cmp(&other.sign) {
            Ordering::Equal => match self.sign {
                Sign::Zero => Ordering::Equal,
                Sign::Positive => words::cmp(&self.magnitude, &other.magnitude),
                Sign::Negative => words::cmp(&other.magnitude, &self.magnitude),
            },
            ordering => ordering,
        }
    }
}

impl<const N: usize> Neg for Fixed<N> {
    type Output = Self;

    fn neg(mut self) -> Self {
        self.negate();
        self
    }
}

impl<const N: usize> AddAssign<&Fixed<N>> for Fixed<N> {
    fn add_assign(&mut self, rhs: &Fixed<N>) {
        self.add_signed(rhs.sign, &rhs.magnitude);
    }
}

impl<const N: usize> AddAssign for Fixed<N> {
    fn add_assign(&mut self, rhs: Fixed<N>) {
        *self += &rhs;
    }
}

impl<const N: usize> SubAssign<&Fixed<N>> for Fixed<N> {
    fn sub_assign(&mut self, rhs: &Fixed<N>) {
        self.add_signed(-rhs.sign, &rhs.magnitude);
    }
}

impl<const N: usize> SubAssign for Fixed<N> {
    fn sub_assign(&mut self, rhs: Fixed<N>) {
        *self -= &rhs;
    }
}

impl<const N: usize> Add for Fixed<N> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += &rhs;
        self
    }
}

impl<const N: usize> Sub for Fixed<N> {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        self -= &rhs;
        self
    }
}

impl<const N: usize> Mul for Fixed<N> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut result = Self::ZERO;
        multiply(&mut result, &self, &rhs);
        result
    }
}

impl<const N: usize> MulAssign<i32> for Fixed<N> {
    fn mul_assign(&mut self, rhs: i32) {
        self.mul_int(rhs);
    }
}

impl<const N: usize> DivAssign<i32> for Fixed<N> {
    fn div_assign(&mut self, rhs: i32) {
        self.div_int(rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type F2 = Fixed<2>;
    type F4 = Fixed<4>;

    #[test]
    fn zero_is_canonical() {
        assert_eq!(F2::from(0), F2::ZERO);
        assert_eq!(F2::from(0.0), F2::ZERO);
        assert_eq!(F2::from(-0.0), F2::ZERO);
        assert_eq!(F2::from_words(true, [0, 0]), F2::ZERO);
        assert_eq!(F2::ZERO.sign(), Sign::Zero);
        assert_eq!(F2::default(), F2::ZERO);
    }

    #[test]
    fn integer_and_double_conversions() {
        let x = F2::from(-7);
        assert_eq!(x.words(), &[7, 0]);
        assert!(x.is_negative());
        assert_eq!(x.to_f64(), -7.0);

        let half = F2::from(0.5);
        assert_eq!(half.words(), &[0, 0x8000_0000]);
        assert_eq!(half.to_f64(), 0.5);

        let x = F4::from(-1.25);
        assert_eq!(x.words(), &[1, 0x4000_0000, 0, 0]);
        assert_eq!(x.to_f64(), -1.25);
    }

    #[test]
    fn rounding_looks_at_the_first_fraction_word() {
        assert_eq!(F2::from(2.5).round(), 3);
        assert_eq!(F2::from(2.499).round(), 2);
        assert_eq!(F2::from(-2.5).round(), -3);
        assert_eq!(F2::from(-2.75).int_part(), -2);
        assert_eq!(F2::ZERO.round(), 0);
    }

    #[test]
    fn addition_with_mixed_signs() {
        let mut x = F2::from(1.5);
        x += F2::from(-2.0);
        assert_eq!(x, F2::from(-0.5));

        let mut x = F2::from(-1.5);
        x += F2::from(2.0);
        assert_eq!(x, F2::from(0.5));

        let mut x = F2::from(3.25);
        x -= F2::from(3.25);
        assert_eq!(x, F2::ZERO);
        assert_eq!(x.sign(), Sign::Zero);

        assert_eq!(F2::ZERO + F2::from(-4), F2::from(-4));
        assert_eq!(F2::from(-4) - F2::ZERO, F2::from(-4));
    }

    #[test]
    fn ordering_accounts_for_sign() {
        let values = [
            F2::from(-3.0),
            F2::from(-0.25),
            F2::ZERO,
            F2::from(0.125),
            F2::from(2.0),
        ];
        for pair in values.windows(2) {
            assert!(pair[0] < pair[1], "{:?} < {:?}", pair[0], pair[1]);
        }
        assert_eq!(F2::from(-1).cmp(&F2::from(-1)), Ordering::Equal);
    }

    #[test]
    fn scalar_multiply_and_divide() {
        let mut x = F2::from(1.5);
        x *= -4;
        assert_eq!(x, F2::from(-6));

        x /= -3;
        assert_eq!(x, F2::from(2));

        x.mul_int(0);
        assert_eq!(x, F2::ZERO);

        let mut tiny = F2::from_words(false, [0, 1]);
        tiny.div_u32(2);
        assert_eq!(tiny, F2::ZERO);
    }

    #[test]
    #[should_panic(expected = "fixed-point division by zero")]
    fn dividing_by_zero_panics() {
        let mut x = F2::from(1);
        x.div_int(0);
    }

    #[test]
    fn power_of_two_scaling() {
        let mut x = F2::from(3);
        x.mul_pow2(-1);
        assert_eq!(x, F2::from(1.5));
        x.mul_pow2(4);
        assert_eq!(x, F2::from(24));

        let mut x = F4::from(1);
        x.mul_pow2(-70);
        assert_eq!(x.log2(), Some(-70));
        x.mul_pow2(70);
        assert_eq!(x, F4::from(1));

        let mut underflow = F2::from(1);
        underflow.mul_pow2(-33);
        assert_eq!(underflow, F2::ZERO);
    }

    #[test]
    fn extreme_shifts_stop_at_zero() {
        let mut x = F4::from(-5.5);
        x.mul_pow2(i32::MIN);
        assert_eq!(x, F4::ZERO);

        let mut x = F4::from(0.75);
        x.mul_pow2(i32::MAX);
        assert_eq!(x, F4::ZERO);
    }

    #[test]
    fn out_of_range_doubles_saturate() {
        let max = F2::from_words(false, [u32::MAX, u32::MAX]);
        assert_eq!(F2::from(4_294_967_296.5), max);
        assert_eq!(F2::from(1e300), max);
        assert_eq!(F2::from(f64::INFINITY), max);
        assert_eq!(F2::from(f64::NEG_INFINITY), -max);
        assert_eq!(F2::from(f64::NAN), F2::ZERO);
        assert_eq!(F2::from(4_294_967_295.5).words(), &[u32::MAX, 0x8000_0000]);
    }

    #[test]
    fn multiply_truncates_to_precision() {
        assert_eq!(F2::from(1.5) * F2::from(-2.5), F2::from(-3.75));
        assert_eq!(F2::from(-0.5) * F2::from(-0.5), F2::from(0.25));
        assert_eq!(F2::from(7) * F2::ZERO, F2::ZERO);

        let epsilon = F2::from_words(false, [0, 1]);
        assert_eq!(epsilon * epsilon, F2::ZERO);

        let third = {
            let mut x = F4::from(1);
            x.div_u32(3);
            x
        };
        let product = third * F4::from(3);
        let error = F4::from(1) - product;
        assert!(!error.is_negative());
        assert!(error.log2().map_or(true, |bits| bits <= F4::LOG2_MIN + 2));
    }

    #[test]
    fn reciprocal_converges_at_high_precision() {
        let x: Fixed<6> = Fixed::from(3);
        let inverse = x.recip().unwrap();
        let error = Fixed::<6>::from(1) - inverse * x;
        assert!(error.abs().log2().map_or(true, |bits| bits <= Fixed::<6>::LOG2_MIN + 6));

        assert_eq!(F2::from(0.25).recip(), Some(F2::from(4)));
        assert_eq!(F2::from(-2).recip(), Some(F2::from(-0.5)));
        assert_eq!(F2::ZERO.recip(), None);
        assert_eq!(F2::from_words(false, [0, 1]).recip(), None);
    }

    #[test]
    fn resizing_pads_and_truncates() {
        let x = F2::from(-1.75);
        let wide: F4 = x.resize();
        assert_eq!(wide.words(), &[1, 0xC000_0000, 0, 0]);
        assert!(wide.is_negative());

        let tiny = F4::from_words(false, [0, 0, 0, 5]);
        let narrow: F2 = tiny.resize();
        assert_eq!(narrow, F2::ZERO);
    }

    #[test]
    fn log2_locates_the_leading_bit() {
        assert_eq!(F2::from(1).log2(), Some(0));
        assert_eq!(F2::from(6).log2(), Some(2));
        assert_eq!(F2::from(0.375).log2(), Some(-2));
        assert_eq!(F2::from_words(false, [0, 1]).log2(), Some(-32));
        assert_eq!(F2::ZERO.log2(), None);
    }
}
