use image::{Rgb, RgbImage};
use ndarray::Array2;

/// Maps an iteration-count array to an RGB image. Counts at the cutoff
/// never escaped and render black.
pub trait Painter {
    fn cutoff(&self) -> u32;

    fn count_color(&self, count: u32) -> Rgb<u8>;

    fn paint(&self, counts: &Array2<u32>) -> RgbImage {
        let width: u32 = counts.ncols().try_into().unwrap();
        let height: u32 = counts.nrows().try_into().unwrap();

        let mut img = RgbImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let count = counts[[y as usize, x as usize]];
                let color = if count >= self.cutoff() {
                    Rgb([0, 0, 0])
                } else {
                    self.count_color(count)
                };
                img.put_pixel(x, y, color);
            }
        }
        img
    }
}

pub struct Greyscale {
    cutoff: u32,
}

impl Greyscale {
    pub fn new(cutoff: u32) -> Self {
        Self { cutoff }
    }
}

impl Painter for Greyscale {
    fn cutoff(&self) -> u32 {
        self.cutoff
    }

    fn count_color(&self, count: u32) -> Rgb<u8> {
        let frac = (count as f64 / self.cutoff as f64).clamp(0.0, 1.0);
        let v: u8 = 255 - (frac * 255.0).round() as u8;
        Rgb([v, v, v])
    }
}

pub struct Rainbow {
    cutoff: u32,
}

impl Rainbow {
    pub fn new(cutoff: u32) -> Self {
        Self { cutoff }
    }
}

fn rainbow_color(band: u64) -> [u8; 3] {
    match band {
        0 => [0xbe, 0x0a, 0xff],
        1 => [0x58, 0x0a, 0xff],
        2 => [0x14, 0x7d, 0xf5],
        3 => [0x0a, 0xef, 0xff],
        4 => [0x0a, 0xff, 0x99],
        5 => [0xa1, 0xff, 0x0a],
        6 => [0xde, 0xff, 0x0a],
        7 => [0xff, 0xd3, 0x00],
        8 => [0xff, 0x87, 0x00],
        _ => [0xff, 0x00, 0x00],
    }
}

fn mix(a: u8, b: u8, frac: f64) -> u8 {
    let m = a as f64 * (1.0 - frac) + b as f64 * frac;
    f64::round(m) as u8
}

impl Painter for Rainbow {
    fn cutoff(&self) -> u32 {
        self.cutoff
    }

    fn count_color(&self, count: u32) -> Rgb<u8> {
        let band = 9 * count as u64 / self.cutoff as u64;
        let frac = (9.0 * count as f64 / self.cutoff as f64) - band as f64;
        let from = rainbow_color(band);
        let to = rainbow_color(band + 1);
        Rgb([
            mix(from[0], to[0], frac),
            mix(from[1], to[1], frac),
            mix(from[2], to[2], frac),
        ])
    }
}
