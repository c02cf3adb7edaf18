use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};

use ndarray::{concatenate, s, Array1, Array2, Axis};

use crate::grid::{decompose, Chunk, Grid};
use crate::kernel::{solve_section, Kernel, Params};
use crate::pool::{Tagged, WorkerPool};

#[derive(Debug)]
pub enum Error {
    /// Rejected before any task was dispatched.
    Config(String),
    /// A worker failed while evaluating the named section. Raised only
    /// after every other task has completed or failed; the call returns
    /// no partial result.
    SectionFailed { rows: Chunk, cols: Chunk },
    /// Reassembly produced an array of the wrong shape. Indicates a
    /// decomposition or placement bug, not bad input.
    ShapeInvariant {
        expected: (usize, usize),
        actual: (usize, usize),
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "invalid configuration: {}", msg),
            Error::SectionFailed { rows, cols } => {
                write!(f, "worker failed on section rows {} cols {}", rows, cols)
            }
            Error::ShapeInvariant { expected, actual } => write!(
                f,
                "reassembled shape {:?} does not match expected {:?}",
                actual, expected
            ),
        }
    }
}

impl std::error::Error for Error {}

/// The full (N, N) iteration-count array plus the wall-clock time spent
/// from pool creation through final reassembly.
#[derive(Clone, Debug)]
pub struct Solution {
    pub counts: Array2<u32>,
    pub elapsed: Duration,
}

type Section = (Array1<f64>, Array1<f64>);

fn validate(n: usize, sections: usize) -> Result<(), Error> {
    if n == 0 {
        return Err(Error::Config("grid size must be positive".to_string()));
    }
    if sections == 0 {
        return Err(Error::Config("section count must be positive".to_string()));
    }
    Ok(())
}

/// One pool per top-level call, sized to the physical cores. Each worker
/// gets its own clone of the kernel and a copy of the fixed parameters;
/// nothing else crosses the thread boundary.
fn section_pool<K: Kernel>(kernel: K, params: Params) -> WorkerPool<Section, Array2<u32>> {
    WorkerPool::with(num_cpus::get_physical(), || {
        let kernel = kernel.clone();
        move |(grid_x, grid_y): Section| solve_section(&kernel, &params, &grid_x, &grid_y)
    })
}

/// First submitted section with no result, if any. Sections go missing
/// when the worker evaluating them panicked.
fn missing_section(
    meta: &[(Chunk, Chunk)],
    results: &[Tagged<Array2<u32>>],
) -> Option<(Chunk, Chunk)> {
    if results.len() == meta.len() {
        return None;
    }
    let done: HashSet<usize> = results.iter().map(|r| r.tag).collect();
    (0..meta.len())
        .find(|tag| !done.contains(tag))
        .map(|tag| meta[tag])
}

fn check_blocks(meta: &[(Chunk, Chunk)], results: &[Tagged<Array2<u32>>]) -> Result<(), Error> {
    for r in results {
        let (rows, cols) = meta[r.tag];
        let expected = (rows.len(), cols.len());
        if r.value.dim() != expected {
            return Err(Error::ShapeInvariant {
                expected,
                actual: r.value.dim(),
            });
        }
    }
    Ok(())
}

fn check_final(n: usize, counts: &Array2<u32>) -> Result<(), Error> {
    if counts.dim() != (n, n) {
        return Err(Error::ShapeInvariant {
            expected: (n, n),
            actual: counts.dim(),
        });
    }
    Ok(())
}

/// Computes the escape-time set over the `[-bound, bound]²` domain with
/// the row axis decomposed into `sections` chunks (rounded up until it
/// divides `n`). Each task pairs one row chunk with the entire column
/// grid; results are concatenated along the row axis in chunk order.
pub fn compute<K: Kernel>(
    params: Params,
    n: usize,
    bound: f64,
    kernel: K,
    sections: usize,
) -> Result<Solution, Error> {
    validate(n, sections)?;
    let grid = Grid::symmetric(bound, n);
    let chunks = decompose(n, sections);
    let full = Chunk::new(0, n);

    let start = Instant::now();
    let pool = section_pool(kernel, params);
    let meta: Vec<(Chunk, Chunk)> = chunks.iter().map(|&rows| (rows, full)).collect();
    let tasks: Vec<Section> = chunks
        .iter()
        .map(|&rows| (grid.section(rows), grid.full()))
        .collect();
    let results = pool.dispatch(tasks);

    if let Some((rows, cols)) = missing_section(&meta, &results) {
        return Err(Error::SectionFailed { rows, cols });
    }
    check_blocks(&meta, &results)?;

    let views: Vec<_> = results.iter().map(|r| r.value.view()).collect();
    let counts = concatenate(Axis(0), &views).map_err(|_| Error::ShapeInvariant {
        expected: (n, n),
        actual: (0, 0),
    })?;
    check_final(n, &counts)?;
    Ok(Solution {
        counts,
        elapsed: start.elapsed(),
    })
}

/// Like [`compute`], but decomposes both axes: one task per
/// (row chunk, column chunk) pair. Each returned block is placed at the
/// offsets given by its originating chunks' bounds, so the result is
/// independent of worker completion order.
pub fn compute_block<K: Kernel>(
    params: Params,
    n: usize,
    bound: f64,
    kernel: K,
    sections: usize,
) -> Result<Solution, Error> {
    validate(n, sections)?;
    let grid = Grid::symmetric(bound, n);
    let chunks = decompose(n, sections);

    let start = Instant::now();
    let pool = section_pool(kernel, params);
    let mut meta: Vec<(Chunk, Chunk)> = vec![];
    let mut tasks: Vec<Section> = vec![];
    for &rows in &chunks {
        for &cols in &chunks {
            meta.push((rows, cols));
            tasks.push((grid.section(rows), grid.section(cols)));
        }
    }
    let results = pool.dispatch(tasks);

    if let Some((rows, cols)) = missing_section(&meta, &results) {
        return Err(Error::SectionFailed { rows, cols });
    }
    check_blocks(&meta, &results)?;

    let mut counts = Array2::zeros((n, n));
    for r in &results {
        let (rows, cols) = meta[r.tag];
        counts
            .slice_mut(s![rows.start..rows.end, cols.start..cols.end])
            .assign(&r.value);
    }
    check_final(n, &counts)?;
    Ok(Solution {
        counts,
        elapsed: start.elapsed(),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::kernel::{c, Julia, Mandelbrot, C};

    fn params() -> Params {
        Params::new(c(-0.1, 0.651), 4.0, 100)
    }

    #[test]
    fn test_shape_invariant() {
        for &n in &[1usize, 7, 100] {
            for &sections in &[1usize, 3, 8] {
                let rows = compute(params(), n, 2.0, Julia, sections).unwrap();
                assert_eq!(rows.counts.dim(), (n, n));
                let blocks = compute_block(params(), n, 2.0, Julia, sections).unwrap();
                assert_eq!(blocks.counts.dim(), (n, n));
            }
        }
    }

    #[test]
    fn test_row_and_block_decomposition_agree() {
        let rows = compute(params(), 60, 2.0, Julia, 7).unwrap();
        let blocks = compute_block(params(), 60, 2.0, Julia, 7).unwrap();
        assert_eq!(rows.counts, blocks.counts);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let n = 50;
        let grid = Grid::symmetric(2.0, n);
        let serial = solve_section(&Julia, &params(), &grid.full(), &grid.full());
        let parallel = compute(params(), n, 2.0, Julia, 4).unwrap();
        assert_eq!(parallel.counts, serial);
        let blocks = compute_block(params(), n, 2.0, Julia, 4).unwrap();
        assert_eq!(blocks.counts, serial);
    }

    #[test]
    fn test_idempotent() {
        let first = compute(params(), 40, 2.0, Mandelbrot, 3).unwrap();
        let second = compute(params(), 40, 2.0, Mandelbrot, 3).unwrap();
        assert_eq!(first.counts, second.counts);
    }

    #[test]
    fn test_config_errors() {
        assert!(matches!(
            compute(params(), 0, 2.0, Julia, 8),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            compute(params(), 100, 2.0, Julia, 0),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            compute_block(params(), 0, 2.0, Julia, 8),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            compute_block(params(), 100, 2.0, Julia, 0),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_escape_counts() {
        let solution = compute(params(), 100, 2.0, Julia, 8).unwrap();
        assert_eq!(solution.counts.dim(), (100, 100));
        assert!(solution.counts.iter().all(|&v| v <= 100));
        // the corner -2-2i squares to 8i, past lim = 4 in one step
        assert_eq!(solution.counts[[0, 0]], 1);
        // points near the origin survive longer than the far corner
        assert!(solution.counts[[50, 50]] > solution.counts[[0, 0]]);
    }

    #[derive(Clone, Copy)]
    struct Panicky;

    impl Kernel for Panicky {
        fn eval(&self, z: C<f64>, _c: C<f64>, _lim: f64, _cutoff: u32) -> u32 {
            if z.re > 0.0 {
                panic!("kernel rejected point");
            }
            0
        }
    }

    #[test]
    fn test_failed_section_is_fatal() {
        let err = compute(Params::default(), 16, 2.0, Panicky, 4).unwrap_err();
        assert!(matches!(err, Error::SectionFailed { .. }));

        let err = compute_block(Params::default(), 16, 2.0, Panicky, 4).unwrap_err();
        assert!(matches!(err, Error::SectionFailed { .. }));
    }
}
