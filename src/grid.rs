use std::fmt;

use ndarray::{s, Array, Array1};

/// A contiguous half-open index range into a grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub start: usize,
    pub end: usize,
}

impl Chunk {
    pub fn new(start: usize, end: usize) -> Self {
        assert!(end >= start);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// N linearly spaced sample points along one axis of the evaluation domain.
#[derive(Clone, Debug)]
pub struct Grid {
    points: Array1<f64>,
}

impl Grid {
    pub fn new(min: f64, max: f64, n: usize) -> Self {
        Self {
            points: Array::linspace(min, max, n),
        }
    }

    /// The `[-bound, bound]` domain used for both axes of a square grid.
    pub fn symmetric(bound: f64, n: usize) -> Self {
        Self::new(-bound, bound, n)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn full(&self) -> Array1<f64> {
        self.points.clone()
    }

    /// Owned copy of the points covered by `chunk`.
    pub fn section(&self, chunk: Chunk) -> Array1<f64> {
        self.points.slice(s![chunk.start..chunk.end]).to_owned()
    }
}

/// Smallest section count >= `requested` that divides `n` evenly.
///
/// The search increments from `requested` and always terminates, since
/// n divides n; a request larger than the grid is clamped so the result
/// never exceeds n (one point per section).
pub fn effective_sections(n: usize, requested: usize) -> usize {
    assert!(n > 0, "empty grid");
    assert!(requested > 0, "zero sections");
    let mut sections = requested.min(n);
    while n % sections != 0 {
        sections += 1;
    }
    sections
}

/// Partition `[0, n)` into equal-length contiguous chunks, in order.
pub fn decompose(n: usize, requested: usize) -> Vec<Chunk> {
    let sections = effective_sections(n, requested);
    let size = n / sections;
    (0..sections)
        .map(|i| Chunk::new(i * size, (i + 1) * size))
        .collect()
}
