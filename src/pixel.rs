use bytemuck::{Pod, Zeroable};

/// One pixel of the output buffer, laid out as four consecutive bytes so a
/// caller's `&mut [u8]` can be viewed as `&mut [Rgba]` in place.
#[repr(C)]
#[derive(Pod, Zeroable, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Self = Self::opaque(0, 0, 0);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// View an RGBA byte buffer as pixels.
///
/// # Panics
///
/// Panics if the buffer length is not a multiple of four.
pub fn as_pixels_mut(bytes: &mut [u8]) -> &mut [Rgba] {
    bytemuck::cast_slice_mut(bytes)
}
