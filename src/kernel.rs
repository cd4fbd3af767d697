//! Per-pixel escape-time iteration of `z ← z² + c`.
//!
//! A kernel maps a pixel to the terminal [`Orbit`] of its point. Kernels carry
//! everything they need precomputed for one frame and are shared read-only by
//! every worker, so they must be `Sync`.

use crate::{
    fixed::{multiply, Fixed},
    viewport::{Viewport, FRACTAL_BOTTOM, FRACTAL_LEFT},
};

/// Squared escape radius.
pub const ESCAPE_RADIUS_SQUARED: i32 = 4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Complex<T> {
    pub real: T,
    pub imaginary: T,
}

/// How the iteration of one point ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orbit {
    /// `|z|² > 4` was observed after this many updates of `z`.
    Escaped(u32),
    /// The iteration budget ran out; the point is treated as inside the set.
    BoundReached,
}

pub trait EscapeTime: Sync {
    fn max_iterations(&self) -> u32;

    fn escape(&self, x: u32, y: u32) -> Orbit;
}

/// Iterate from `z = c` in `f64`.
pub fn escape_f64(c: Complex<f64>, max_iterations: u32) -> Orbit {
    let limit = f64::from(ESCAPE_RADIUS_SQUARED);
    let (mut zx, mut zy) = (c.real, c.imaginary);
    for count in 0..max_iterations {
        let x2 = zx * zx;
        let y2 = zy * zy;
        if x2 + y2 > limit {
            return Orbit::Escaped(count);
        }
        zy = 2.0 * zx * zy + c.imaginary;
        zx = x2 - y2 + c.real;
    }
    Orbit::BoundReached
}

/// Iterate from `z = c` in `Fixed<N>`.
///
/// A component of magnitude 3 or more escapes before it is squared, so the
/// squares never leave the integer word.
pub fn escape_fixed<const N: usize>(c: &Complex<Fixed<N>>, max_iterations: u32) -> Orbit {
    let limit = Fixed::<N>::from(ESCAPE_RADIUS_SQUARED);
    let mut zx = c.real;
    let mut zy = c.imaginary;
    let mut x2 = Fixed::ZERO;
    let mut y2 = Fixed::ZERO;
    let mut xy = Fixed::ZERO;

    for count in 0..max_iterations {
        if zx.int_part().abs() > 2 || zy.int_part().abs() > 2 {
            return Orbit::Escaped(count);
        }

        multiply(&mut x2, &zx, &zx);
        multiply(&mut y2, &zy, &zy);
        if x2 + y2 > limit {
            return Orbit::Escaped(count);
        }

        multiply(&mut xy, &zx, &zy);
        xy.mul_pow2(1);
        xy += &c.imaginary;

        x2 -= &y2;
        x2 += &c.real;

        zx = x2;
        zy = xy;
    }
    Orbit::BoundReached
}

/// Native floating point kernel. Fast, but pixels stop being distinguishable
/// once the pixel step nears `f64::EPSILON` relative to the coordinates.
#[derive(Clone, Copy, Debug)]
pub struct DoubleKernel {
    fractal_width: f64,
    fractal_height: f64,
    center_x: f64,
    center_y: f64,
    half_width: f64,
    half_height: f64,
    vertical_scale: f64,
    max_iterations: u32,
}

impl DoubleKernel {
    pub fn new<const N: usize>(viewport: &Viewport<N>) -> Self {
        let zoom = viewport.zoom.to_f64();
        let size = viewport.size;
        Self {
            fractal_width: f64::from(size.width) * zoom,
            fractal_height: f64::from(size.height) * zoom,
            center_x: viewport.center_x.to_f64(),
            center_y: viewport.center_y.to_f64(),
            half_width: f64::from(size.width / 2),
            half_height: f64::from(size.height / 2),
            vertical_scale: viewport.vertical_scale(),
            max_iterations: viewport.max_iterations,
        }
    }

    pub fn point(&self, x: u32, y: u32) -> Complex<f64> {
        let fractal_x = self.fractal_width * self.center_x - self.half_width + f64::from(x);
        let fractal_y = self.fractal_height * self.center_y - self.half_height + f64::from(y);
        Complex {
            real: fractal_x / self.vertical_scale + FRACTAL_LEFT,
            imaginary: fractal_y / self.vertical_scale + FRACTAL_BOTTOM,
        }
    }
}

impl EscapeTime for DoubleKernel {
    fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    fn escape(&self, x: u32, y: u32) -> Orbit {
        escape_f64(self.point(x, y), self.max_iterations)
    }
}

/// Fixed-point kernel: slow, with precision limited only by `N`.
#[derive(Clone, Copy, Debug)]
pub struct FixedKernel<const N: usize> {
    origin: Complex<Fixed<N>>,
    step: Fixed<N>,
    half_width: i64,
    half_height: i64,
    max_iterations: u32,
}

impl<const N: usize> FixedKernel<N> {
    /// `None` when the zoom has no reciprocal at this precision.
    pub fn new(viewport: &Viewport<N>) -> Option<Self> {
        let (real, imaginary) = viewport.origin();
        Some(Self {
            origin: Complex { real, imaginary },
            step: viewport.pixel_step()?,
            half_width: i64::from(viewport.size.width / 2),
            half_height: i64::from(viewport.size.height / 2),
            max_iterations: viewport.max_iterations,
        })
    }

    pub fn point(&self, x: u32, y: u32) -> Complex<Fixed<N>> {
        Complex {
            real: self.offset(self.origin.real, i64::from(x) - self.half_width),
            imaginary: self.offset(self.origin.imaginary, i64::from(y) - self.half_height),
        }
    }

    fn offset(&self, origin: Fixed<N>, pixels: i64) -> Fixed<N> {
        let mut delta = self.step;
        delta.mul_u32(pixels.unsigned_abs() as u32);
        if pixels < 0 {
            delta.negate();
        }
        origin + delta
    }
}

impl<const N: usize> EscapeTime for FixedKernel<N> {
    fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    fn escape(&self, x: u32, y: u32) -> Orbit {
        escape_fixed(&self.point(x, y), self.max_iterations)
    }
}
