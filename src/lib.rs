//! Escape-time fractal computation parallelized by static domain
//! decomposition.
//!
//! The N-point evaluation grid is split into equal contiguous sections
//! ([`grid`]), one task per section is dispatched to a fixed-size worker
//! pool ([`pool`]), and the per-section iteration counts are reassembled
//! into the full (N, N) array by originating section index ([`scheduler`]).
//! The escape-time kernel itself is injected by the caller ([`kernel`]).
//!
//! ```no_run
//! use juliox::{c, compute, Julia, Params};
//!
//! let params = Params::new(c(-0.1, 0.651), 4.0, 100);
//! let solution = compute(params, 1000, 2.0, Julia, 8).unwrap();
//! println!("{:.3}s", solution.elapsed.as_secs_f64());
//! ```

pub mod bench;
pub mod grid;
pub mod kernel;
pub mod painter;
pub mod pool;
pub mod scheduler;

pub use kernel::{c, Julia, Kernel, Mandelbrot, Params, C};
pub use scheduler::{compute, compute_block, Error, Solution};
