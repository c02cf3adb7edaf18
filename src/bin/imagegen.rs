use std::path::PathBuf;
use std::process::exit;

use structopt::StructOpt;

use juliox::painter::{Greyscale, Painter, Rainbow};
use juliox::{c, compute, compute_block, Error, Julia, Kernel, Mandelbrot, Params, Solution};

#[derive(Debug, StructOpt)]
#[structopt(name = "juliox-imagegen", about = "Render an escape-time fractal to a PNG")]
struct Opt {
    /// Grid points per axis
    #[structopt(short = "n", long, default_value = "1000")]
    size: usize,

    /// Real part of the Julia constant
    #[structopt(long, default_value = "-0.1", allow_hyphen_values = true)]
    c_re: f64,

    /// Imaginary part of the Julia constant
    #[structopt(long, default_value = "0.651", allow_hyphen_values = true)]
    c_im: f64,

    /// Half-extent of the complex domain
    #[structopt(long, default_value = "2.0")]
    bound: f64,

    /// Divergence bound passed to the kernel
    #[structopt(long, default_value = "4.0")]
    lim: f64,

    /// Iteration cutoff per point
    #[structopt(long, default_value = "100")]
    cutoff: u32,

    /// Requested section count, rounded up until it divides the grid
    #[structopt(short, long, default_value = "8")]
    sections: usize,

    /// Decompose over both axes instead of rows only
    #[structopt(long)]
    block: bool,

    /// Render the Mandelbrot set instead of a Julia set
    #[structopt(long)]
    mandelbrot: bool,

    /// Greyscale instead of rainbow coloring
    #[structopt(long)]
    greyscale: bool,

    /// Output file
    #[structopt(short, long, default_value = "julia.png", parse(from_os_str))]
    output: PathBuf,
}

fn run<K: Kernel>(opt: &Opt, kernel: K) -> Result<Solution, Error> {
    let params = Params::new(c(opt.c_re, opt.c_im), opt.lim, opt.cutoff);
    if opt.block {
        compute_block(params, opt.size, opt.bound, kernel, opt.sections)
    } else {
        compute(params, opt.size, opt.bound, kernel, opt.sections)
    }
}

fn main() {
    let opt = Opt::from_args();
    let result = if opt.mandelbrot {
        run(&opt, Mandelbrot)
    } else {
        run(&opt, Julia)
    };
    let solution = match result {
        Ok(solution) => solution,
        Err(e) => {
            eprintln!("error: {}", e);
            exit(1);
        }
    };
    println!(
        "computed {}x{} grid in {:.3}s",
        opt.size,
        opt.size,
        solution.elapsed.as_secs_f64()
    );

    let img = if opt.greyscale {
        Greyscale::new(opt.cutoff).paint(&solution.counts)
    } else {
        Rainbow::new(opt.cutoff).paint(&solution.counts)
    };
    if let Err(e) = img.save(&opt.output) {
        eprintln!("failed to save {}: {}", opt.output.display(), e);
        exit(1);
    }
}
