use bytemuck::{Pod, Zeroable};

/// Output raster dimensions in pixels.
#[repr(C)]
#[derive(Pod, Zeroable, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Length of an RGBA byte buffer covering the whole raster.
    pub fn byte_len(&self) -> usize {
        self.pixel_count() * std::mem::size_of::<crate::pixel::Rgba>()
    }
}
