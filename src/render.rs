//! Whole-frame rendering.

use std::time::{Duration, Instant};

use log::{debug, trace, warn};
use rayon::prelude::{IndexedParallelIterator, ParallelIterator, ParallelSliceMut};
use thiserror::Error;

use crate::{
    colour::Palette,
    config::ViewConfig,
    fixed::Fixed,
    kernel::{DoubleKernel, EscapeTime, FixedKernel},
    pixel::{self, Rgba},
    screen,
    viewport::Viewport,
};

/// Which kernel evaluates the frame. Chosen by the caller once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Precision {
    #[default]
    Double,
    Fixed,
}

impl Precision {
    pub fn toggled(self) -> Self {
        match self {
            Precision::Double => Precision::Fixed,
            Precision::Fixed => Precision::Double,
        }
    }
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to build the render thread pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Colour every pixel of `pixels` (row-major, `size.width` per row) from
/// `kernel`. Rows are handed to rayon workers; each pixel is written once.
pub fn fill<K: EscapeTime>(kernel: &K, palette: &Palette, size: screen::Size, pixels: &mut [Rgba]) {
    assert_eq!(pixels.len(), size.pixel_count(), "pixel buffer does not match the raster size");
    if size.width == 0 {
        return;
    }

    let max_iterations = kernel.max_iterations();
    pixels
        .par_chunks_mut(size.width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, pixel) in row.iter_mut().enumerate() {
                *pixel = palette.colour(kernel.escape(x as u32, y as u32), max_iterations);
            }
        });
}

/// Render `viewport` into a caller-owned RGBA buffer and return the time it
/// took.
///
/// # Panics
///
/// Panics if `buffer` is not exactly `width * height * 4` bytes, if
/// `max_iterations` is zero, or if the zoom is not positive.
///
/// With [`Precision::Fixed`], a zoom too small for its reciprocal to fit in
/// `Fixed<N>` is rendered with the `f64` kernel instead.
pub fn render_viewport<const N: usize>(
    buffer: &mut [u8],
    viewport: &Viewport<N>,
    precision: Precision,
    palette: &Palette,
) -> Duration {
    assert_eq!(buffer.len(), viewport.size.byte_len(), "pixel buffer does not match the raster size");
    assert!(viewport.max_iterations > 0, "max_iterations must be positive");
    assert!(viewport.zoom > Fixed::ZERO, "zoom must be positive");

    trace!("begin render");
    let start = Instant::now();

    if viewport.size.pixel_count() == 0 {
        trace!("end render");
        return start.elapsed();
    }

    let pixels = pixel::as_pixels_mut(buffer);
    match precision {
        Precision::Double => fill(&DoubleKernel::new(viewport), palette, viewport.size, pixels),
        Precision::Fixed => match FixedKernel::new(viewport) {
            Some(kernel) => fill(&kernel, palette, viewport.size, pixels),
            None => {
                warn!(
                    "zoom {} has no pixel step with {} words, rendering in f64",
                    viewport.zoom, N
                );
                fill(&DoubleKernel::new(viewport), palette, viewport.size, pixels)
            }
        },
    }

    let elapsed = start.elapsed();
    debug!(
        "rendered {}x{} ({:?}, {} words, {} iterations) in {:?}",
        viewport.size.width, viewport.size.height, precision, N, viewport.max_iterations, elapsed
    );
    trace!("end render");
    elapsed
}

/// Render with the default palette. See [`render_viewport`].
pub fn render<const N: usize>(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    zoom: &Fixed<N>,
    max_iterations: u32,
    center_x: &Fixed<N>,
    center_y: &Fixed<N>,
    precision: Precision,
) -> Duration {
    let viewport = Viewport {
        center_x: *center_x,
        center_y: *center_y,
        zoom: *zoom,
        max_iterations,
        size: screen::Size::new(width, height),
    };
    render_viewport(buffer, &viewport, precision, &Palette::default())
}

/// Render state owned by the caller: the view, the pixel buffer it is drawn
/// into and a thread pool to draw with.
///
/// Rendering takes `&mut self`, so a new frame can't start while one is in
/// flight.
pub struct FractalRenderer<const N: usize> {
    viewport: Viewport<N>,
    precision: Precision,
    palette: Palette,
    pixels: Vec<u8>,
    last_render_time: Duration,
    pool: rayon::ThreadPool,
}

impl<const N: usize> FractalRenderer<N> {
    /// A renderer for the default view using one thread per CPU.
    pub fn new(size: screen::Size) -> Result<Self, RenderError> {
        Self::with_threads(size, num_cpus::get())
    }

    pub fn with_threads(size: screen::Size, threads: usize) -> Result<Self, RenderError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("render-{index}"))
            .build()?;
        debug!("render pool with {} threads", pool.current_num_threads());

        Ok(Self {
            viewport: Viewport::new(size),
            precision: Precision::default(),
            palette: Palette::default(),
            pixels: vec![0; size.byte_len()],
            last_render_time: Duration::ZERO,
            pool,
        })
    }

    /// Draw the current view into the pixel buffer.
    pub fn render(&mut self) -> Duration {
        let viewport = self.viewport;
        let precision = self.precision;
        let palette = self.palette;
        let pixels = &mut self.pixels;

        let elapsed = self
            .pool
            .install(|| render_viewport(pixels, &viewport, precision, &palette));
        self.last_render_time = elapsed;
        elapsed
    }

    /// RGBA bytes of the last frame, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn last_render_time(&self) -> Duration {
        self.last_render_time
    }

    pub fn viewport(&self) -> &Viewport<N> {
        &self.viewport
    }

    pub fn size(&self) -> screen::Size {
        self.viewport.size
    }

    /// Change the raster size. The buffer is reallocated and cleared.
    pub fn resize(&mut self, size: screen::Size) {
        if size == self.viewport.size {
            return;
        }
        self.viewport.size = size;
        self.pixels = vec![0; size.byte_len()];
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn set_precision(&mut self, precision: Precision) {
        self.precision = precision;
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    pub fn set_center(&mut self, center_x: Fixed<N>, center_y: Fixed<N>) {
        self.viewport.center_x = center_x;
        self.viewport.center_y = center_y;
    }

    /// Ignores non-positive zooms and zooms whose reciprocal doesn't fit in
    /// `Fixed<N>`, so the view can always be panned and rendered in fixed
    /// point.
    pub fn set_zoom(&mut self, zoom: Fixed<N>) {
        if zoom > Fixed::ZERO && zoom.recip().is_some() {
            self.viewport.zoom = zoom;
        } else {
            debug!("ignoring zoom {}", zoom);
        }
    }

    /// Multiply the zoom by `2^k`, keeping the screen center in place.
    /// A step that [`set_zoom`](Self::set_zoom) would refuse is ignored.
    pub fn zoom_pow2(&mut self, k: i32) {
        let mut zoom = self.viewport.zoom;
        zoom.mul_pow2(k);
        self.set_zoom(zoom);
    }

    /// Clamped to at least one iteration.
    pub fn set_max_iterations(&mut self, max_iterations: u32) {
        self.viewport.max_iterations = max_iterations.max(1);
    }

    /// Move the view by whole pixels at the current zoom. Positive `dx` moves
    /// towards larger real parts, positive `dy` towards larger imaginary
    /// parts.
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let Some(inverse_zoom) = self.viewport.zoom.recip() else {
            return;
        };
        let size = self.viewport.size;

        // One pixel moves the normalized center by 1 / (zoom * width)
        // horizontally and 1 / (zoom * height) vertically.
        let mut step_x = inverse_zoom;
        step_x.div_u32(size.width.max(1));
        step_x.mul_int(dx);
        self.viewport.center_x += step_x;

        let mut step_y = inverse_zoom;
        step_y.div_u32(size.height.max(1));
        step_y.mul_int(dy);
        self.viewport.center_y += step_y;
    }

    /// The view as a persistable record.
    pub fn to_config(&self) -> ViewConfig {
        ViewConfig {
            x: self.viewport.center_x.to_f64(),
            y: self.viewport.center_y.to_f64(),
            zoom: self.viewport.zoom.to_f64(),
            resolution: self.viewport.max_iterations,
        }
    }

    pub fn apply_config(&mut self, config: &ViewConfig) {
        self.set_center(Fixed::from(config.x), Fixed::from(config.y));
        self.set_zoom(Fixed::from(config.zoom));
        self.set_max_iterations(config.resolution);
    }
}
