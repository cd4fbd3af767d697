//! Mapping from pixels to the complex plane.
//!
//! At zoom 1 the raster's height spans the fractal's vertical extent
//! `[FRACTAL_BOTTOM, FRACTAL_TOP]`. The same scale is used horizontally, so the
//! horizontal extent depends on the aspect ratio. The center is normalized: a
//! center of `(0, 0)` puts the bottom-left fractal corner in the middle of the
//! raster, and the screen center maps to
//! `(2.4 * width / height * center_x - 2.1, 2.4 * center_y - 1.2)` whatever
//! the zoom.

use crate::{fixed::Fixed, screen};

pub const FRACTAL_LEFT: f64 = -2.1;
pub const FRACTAL_RIGHT: f64 = 0.6;
pub const FRACTAL_BOTTOM: f64 = -1.2;
pub const FRACTAL_TOP: f64 = 1.2;

pub const DEFAULT_CENTER: (f64, f64) = (0.310617, 0.435056);
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Parameters of one render request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport<const N: usize> {
    pub center_x: Fixed<N>,
    pub center_y: Fixed<N>,
    pub zoom: Fixed<N>,
    pub max_iterations: u32,
    pub size: screen::Size,
}

impl<const N: usize> Viewport<N> {
    /// The default view at zoom 1.
    pub fn new(size: screen::Size) -> Self {
        Self {
            center_x: Fixed::from(DEFAULT_CENTER.0),
            center_y: Fixed::from(DEFAULT_CENTER.1),
            zoom: Fixed::from(1),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            size,
        }
    }

    /// `zoom * height / (FRACTAL_TOP - FRACTAL_BOTTOM)` in `f64`: pixels per
    /// unit of the complex plane.
    pub fn vertical_scale(&self) -> f64 {
        self.zoom.to_f64() * f64::from(self.size.height) / (FRACTAL_TOP - FRACTAL_BOTTOM)
    }

    /// Width of one pixel in the complex plane, `1 / vertical_scale`, or
    /// `None` when the zoom has no representable reciprocal.
    ///
    /// Computed as `recip(zoom) * 12 / (5 * height)` so that deep zooms keep
    /// every word of precision.
    pub fn pixel_step(&self) -> Option<Fixed<N>> {
        if self.size.height == 0 || self.zoom.is_negative() {
            return None;
        }
        let mut step = self.zoom.recip()?;
        step.div_u32(self.size.height);
        step.mul_u32(12);
        step.div_u32(5);
        Some(step)
    }

    /// The point at pixel `(width / 2, height / 2)`.
    pub fn origin(&self) -> (Fixed<N>, Fixed<N>) {
        let mut x = self.center_x;
        x.mul_u32(12);
        x.mul_u32(self.size.width);
        x.div_u32(5);
        x.div_u32(self.size.height.max(1));
        x -= tenths(21);

        let mut y = self.center_y;
        y.mul_u32(12);
        y.div_u32(5);
        y -= tenths(12);

        (x, y)
    }
}

fn tenths<const N: usize>(value: i32) -> Fixed<N> {
    let mut fixed = Fixed::from(value);
    fixed.div_u32(10);
    fixed
}
