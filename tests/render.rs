use fixed_mandelbrot::{
    colour::ramp,
    kernel::{escape_f64, escape_fixed, Complex},
    render, render_viewport, screen,
    viewport::DEFAULT_CENTER,
    Fixed, FractalRenderer, Orbit, Palette, Precision, Viewport,
};

fn default_center<const N: usize>() -> (Fixed<N>, Fixed<N>) {
    (Fixed::from(DEFAULT_CENTER.0), Fixed::from(DEFAULT_CENTER.1))
}

#[test]
fn single_iteration_frame_uses_the_linear_ramp() {
    let (x, y) = default_center::<3>();
    for precision in [Precision::Double, Precision::Fixed] {
        let mut buffer = vec![0xAA; 4 * 4 * 4];
        render(&mut buffer, 4, 4, &Fixed::from(1), 1, &x, &y, precision);

        for pixel in buffer.chunks_exact(4) {
            assert_eq!(pixel[3], 255);
            // count is 0 or 1, and 0 * 255 / 1 is black.
            assert!(pixel[0] == ramp(0, 1) || pixel[0] == ramp(1, 1), "{:?}", pixel);
            assert_eq!(pixel[1..3], [0, 0]);
        }
    }
}

#[test]
fn origin_never_escapes() {
    let zero = Complex {
        real: Fixed::<4>::ZERO,
        imaginary: Fixed::ZERO,
    };
    for max_iterations in [1, 10, 1000] {
        assert_eq!(escape_fixed(&zero, max_iterations), Orbit::BoundReached);
        assert_eq!(
            escape_f64(
                Complex {
                    real: 0.0,
                    imaginary: 0.0
                },
                max_iterations
            ),
            Orbit::BoundReached
        );
    }
}

#[test]
fn far_points_escape_immediately() {
    let far = Complex {
        real: Fixed::<2>::from(2),
        imaginary: Fixed::from(2),
    };
    assert_eq!(escape_fixed(&far, 50), Orbit::Escaped(0));
    assert_eq!(
        escape_f64(
            Complex {
                real: 2.0,
                imaginary: 2.0
            },
            50
        ),
        Orbit::Escaped(0)
    );
}

#[test]
fn frames_are_deterministic() {
    let (x, y) = default_center::<3>();
    let mut zoom = Fixed::from(1);
    zoom.mul_pow2(4);

    let mut first = vec![0; 40 * 30 * 4];
    let mut second = vec![0xFF; 40 * 30 * 4];
    render(&mut first, 40, 30, &zoom, 200, &x, &y, Precision::Fixed);
    render(&mut second, 40, 30, &zoom, 200, &x, &y, Precision::Fixed);
    assert_eq!(first, second);

    let mut renderer = FractalRenderer::<3>::with_threads(screen::Size::new(40, 30), 3).unwrap();
    renderer.set_precision(Precision::Fixed);
    renderer.set_zoom(zoom);
    renderer.set_max_iterations(200);
    renderer.render();
    assert_eq!(renderer.pixels(), first.as_slice());
}

#[test]
fn fixed_and_double_agree_at_shallow_zoom() {
    let size = screen::Size::new(64, 48);
    let viewport = Viewport::<4> {
        max_iterations: 64,
        ..Viewport::new(size)
    };
    let palette = Palette::TEAL;

    let mut double = vec![0; size.byte_len()];
    let mut fixed = vec![0; size.byte_len()];
    render_viewport(&mut double, &viewport, Precision::Double, &palette);
    render_viewport(&mut fixed, &viewport, Precision::Fixed, &palette);

    let agreeing = double
        .chunks_exact(4)
        .zip(fixed.chunks_exact(4))
        .filter(|(a, b)| a == b)
        .count();
    assert!(
        agreeing * 100 >= size.pixel_count() * 95,
        "only {} of {} pixels agree",
        agreeing,
        size.pixel_count()
    );
}

#[test]
fn saved_views_restore_the_renderer() {
    let path = std::env::temp_dir().join(format!("restore-{}.view", std::process::id()));

    let mut renderer = FractalRenderer::<3>::with_threads(screen::Size::new(16, 16), 1).unwrap();
    renderer.zoom_pow2(5);
    renderer.pan(3, -2);
    renderer.set_max_iterations(321);
    renderer.to_config().save(&path).unwrap();

    let loaded = fixed_mandelbrot::ViewConfig::load(&path);
    std::fs::remove_file(&path).unwrap();

    let mut restored = FractalRenderer::<3>::with_threads(screen::Size::new(16, 16), 1).unwrap();
    restored.apply_config(&loaded.unwrap());
    assert_eq!(restored.viewport().max_iterations, 321);
    assert_eq!(restored.viewport().zoom, Fixed::from(32));
    assert!(
        (restored.viewport().center_x.to_f64() - renderer.viewport().center_x.to_f64()).abs()
            < 1e-15
    );
}
