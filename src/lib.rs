/*!
Fixed-point arithmetic and an escape-time Mandelbrot renderer built on it.

The crate is layered, leaf first:

* [`words`]: carry-propagating arithmetic on arrays of 32-bit words.
* [`Fixed`]: a signed fixed-point real on `N` words (one integer word and
  `N - 1` fractional words), with decimal text in [`decimal`].
* [`kernel`] and [`render`]: the per-pixel iteration of `z ← z² + c`, in `f64`
  or in `Fixed<N>`, and the data-parallel frame fill that colours a
  caller-owned RGBA buffer.

```
use fixed_mandelbrot::{render, Fixed, Precision};

let mut pixels = vec![0u8; 64 * 48 * 4];
let elapsed = render::<3>(
    &mut pixels,
    64,
    48,
    &Fixed::from(1),
    100,
    &"0.310617".parse().unwrap(),
    &"0.435056".parse().unwrap(),
    Precision::Fixed,
);
assert!(pixels.chunks_exact(4).all(|pixel| pixel[3] == 255));
# let _ = elapsed;
```
*/

pub mod colour;
pub mod config;
pub mod decimal;
pub mod fixed;
pub mod kernel;
pub mod pixel;
pub mod render;
pub mod screen;
pub mod viewport;
pub mod words;

pub use colour::{Channel, Palette};
pub use config::{ConfigError, ViewConfig};
pub use decimal::ParseFixedError;
pub use fixed::{multiply, Fixed, Sign};
pub use kernel::{DoubleKernel, EscapeTime, FixedKernel, Orbit};
pub use pixel::Rgba;
pub use render::{render, render_viewport, FractalRenderer, Precision, RenderError};
pub use viewport::Viewport;
