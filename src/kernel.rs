use ndarray::{Array1, Array2};
use num::complex::Complex;

pub type C<T> = Complex<T>;

pub fn c(re: f64, im: f64) -> C<f64> {
    Complex::new(re, im)
}

/// The fixed kernel parameters carried by every dispatched task.
#[derive(Clone, Copy, Debug)]
pub struct Params {
    /// Complex constant of the recurrence.
    pub c: C<f64>,
    /// Divergence bound: iteration stops once |z| reaches it.
    pub lim: f64,
    /// Iteration budget per point.
    pub cutoff: u32,
}

impl Params {
    pub fn new(c: C<f64>, lim: f64, cutoff: u32) -> Self {
        Self { c, lim, cutoff }
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::new(c(-0.1, 0.651), 4.0, 100)
    }
}

/// A pure per-point escape-time function, injected by the caller.
///
/// Must be total (terminates within `cutoff` iterations) and
/// deterministic; results cross worker boundaries with no
/// synchronization, so implementations must not carry state.
pub trait Kernel: Clone + Send + 'static {
    fn eval(&self, z: C<f64>, c: C<f64>, lim: f64, cutoff: u32) -> u32;
}

/// z ← z² + c, starting from the grid point.
#[derive(Clone, Copy, Debug, Default)]
pub struct Julia;

impl Kernel for Julia {
    fn eval(&self, mut z: C<f64>, c: C<f64>, lim: f64, cutoff: u32) -> u32 {
        let mut count = 0;
        while z.norm() < lim && count < cutoff {
            z = (z * z) + c;
            count += 1;
        }
        count
    }
}

/// z ← z² + p, starting from zero, with p the grid point. The constant
/// in `Params` is ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mandelbrot;

impl Kernel for Mandelbrot {
    fn eval(&self, z: C<f64>, _c: C<f64>, lim: f64, cutoff: u32) -> u32 {
        let mut w = c(0.0, 0.0);
        let mut count = 0;
        while w.norm() < lim && count < cutoff {
            w = (w * w) + z;
            count += 1;
        }
        count
    }
}

/// Evaluate the kernel at x + iy for every point of a section.
///
/// This is the sequential unit of work a single worker executes; the
/// output shape is (len(grid_x), len(grid_y)).
pub fn solve_section<K: Kernel>(
    kernel: &K,
    params: &Params,
    grid_x: &Array1<f64>,
    grid_y: &Array1<f64>,
) -> Array2<u32> {
    let mut counts = Array2::zeros((grid_x.len(), grid_y.len()));
    for (i, &x) in grid_x.iter().enumerate() {
        for (j, &y) in grid_y.iter().enumerate() {
            counts[[i, j]] = kernel.eval(c(x, y), params.c, params.lim, params.cutoff);
        }
    }
    counts
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::Array;

    #[test]
    fn test_julia_kernel() {
        // already past the divergence bound: zero iterations
        assert_eq!(Julia.eval(c(10.0, 0.0), c(0.0, 0.0), 4.0, 100), 0);
        // fixed point of z^2 at the origin: runs to the cutoff
        assert_eq!(Julia.eval(c(0.0, 0.0), c(0.0, 0.0), 4.0, 100), 100);
        // (-2-2i)^2 = 8i, well past lim = 4 after one step
        assert_eq!(Julia.eval(c(-2.0, -2.0), c(-0.1, 0.651), 4.0, 100), 1);
    }

    #[test]
    fn test_mandelbrot_kernel() {
        // origin never escapes
        assert_eq!(Mandelbrot.eval(c(0.0, 0.0), c(9.0, 9.0), 2.0, 50), 50);
        // 0 -> 2 after one step, |2| >= 2
        assert_eq!(Mandelbrot.eval(c(2.0, 0.0), c(0.0, 0.0), 2.0, 50), 1);
    }

    #[test]
    fn test_solve_section_shape() {
        let grid_x = Array::linspace(-2.0, 2.0, 3);
        let grid_y = Array::linspace(-2.0, 2.0, 5);
        let params = Params::default();
        let counts = solve_section(&Julia, &params, &grid_x, &grid_y);
        assert_eq!(counts.dim(), (3, 5));
        assert_eq!(
            counts[[0, 0]],
            Julia.eval(c(-2.0, -2.0), params.c, params.lim, params.cutoff)
        );
        assert_eq!(
            counts[[2, 4]],
            Julia.eval(c(2.0, 2.0), params.c, params.lim, params.cutoff)
        );
    }
}
