//! Colouring of escape-time results.

use crate::{kernel::Orbit, pixel::Rgba};

/// The channel that carries the iteration ramp.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Channel {
    #[default]
    Red,
    Green,
    Blue,
}

/// Linear-ramp palette.
///
/// Points that never escape get `background`. Escaped points get `base` with
/// `channel` replaced by `count * 255 / max_iterations`. Alpha is always 255.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgba,
    pub base: Rgba,
    pub channel: Channel,
}

impl Palette {
    /// Dark teal interior with a red ramp.
    pub const TEAL: Self = Self {
        background: Rgba::opaque(0, 54, 76),
        base: Rgba::BLACK,
        channel: Channel::Red,
    };

    pub fn colour(&self, orbit: Orbit, max_iterations: u32) -> Rgba {
        let mut colour = match orbit {
            Orbit::BoundReached => self.background,
            Orbit::Escaped(count) => {
                let mut colour = self.base;
                let value = ramp(count, max_iterations);
                match self.channel {
                    Channel::Red => colour.r = value,
                    Channel::Green => colour.g = value,
                    Channel::Blue => colour.b = value,
                }
                colour
            }
        };
        colour.a = 255;
        colour
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgba::BLACK,
            base: Rgba::BLACK,
            channel: Channel::Red,
        }
    }
}

/// `count * 255 / max_iterations`, saturating at 255.
pub fn ramp(count: u32, max_iterations: u32) -> u8 {
    let value = u64::from(count) * 255 / u64::from(max_iterations.max(1));
    value.min(255) as u8
}
