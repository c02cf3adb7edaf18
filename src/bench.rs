use std::fs;
use std::io::{stdout, Write};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// A named closure run a fixed number of times under a wall-clock timer.
#[derive(Clone)]
pub struct Benchmark {
    name: String,
    repeats: usize,
    f: Rc<dyn Fn()>,
}

impl Benchmark {
    pub fn iter<F: Fn() + 'static>(name: &str, repeats: usize, f: F) -> Self {
        Self {
            name: name.to_string(),
            repeats,
            f: Rc::new(f),
        }
    }

    pub fn once<F: Fn() + 'static>(name: &str, f: F) -> Self {
        Self::iter(name, 1, f)
    }

    pub fn run(&self) -> Duration {
        let start = Instant::now();
        for _ in 0..self.repeats {
            (self.f)();
        }
        start.elapsed()
    }
}

pub struct BenchmarkReport {
    benches: Vec<Benchmark>,
    results: Vec<(String, usize, Duration)>,
}

impl BenchmarkReport {
    pub fn new() -> Self {
        Self {
            benches: vec![],
            results: vec![],
        }
    }

    pub fn add_bench(&mut self, bench: Benchmark) {
        self.benches.push(bench);
    }

    pub fn with_benches(benches: &[Benchmark]) -> Self {
        let mut this = Self::new();
        for bench in benches {
            this.add_bench(bench.clone());
        }
        this
    }

    pub fn run(&mut self) {
        for bench in &self.benches {
            let t = bench.run();
            self.results
                .push((bench.name.clone(), bench.repeats, t));
            print!(".");
            stdout().flush().unwrap();
        }
        println!("\n");
    }

    pub fn show(&self) {
        for (name, repeats, t) in &self.results {
            println!(
                "{}\n  per call: {}us\n  total: {}ms\n",
                name,
                t.as_micros() / *repeats as u128,
                t.as_millis()
            );
        }
    }

    pub fn write_csv(&self, filename: &str) {
        let mut lines = vec!["benchmark,repeats,per_call_us,total_ms".to_string()];
        for (name, repeats, t) in &self.results {
            lines.push(format!(
                "{},{},{},{}",
                name,
                repeats,
                t.as_micros() / *repeats as u128,
                t.as_millis()
            ));
        }
        lines.push(String::new());
        fs::write(filename, lines.join("\n")).unwrap();
    }

    pub fn report(&mut self, name: &str) {
        self.run();
        self.show();
        self.write_csv(&format!("bench-{}.csv", name));
    }
}

impl Default for BenchmarkReport {
    fn default() -> Self {
        Self::new()
    }
}
