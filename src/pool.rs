use std::sync::mpsc;
use std::thread;

/// A task or result paired with its submission index.
///
/// Workers complete in arbitrary order; the tag is what ties a result
/// back to the task that produced it.
#[derive(Debug)]
pub struct Tagged<T> {
    pub tag: usize,
    pub value: T,
}

impl<T> Tagged<T> {
    pub fn new(tag: usize, value: T) -> Self {
        Self { tag, value }
    }
}

struct Worker<T> {
    tx: mpsc::Sender<Tagged<T>>,
}

impl<T> Worker<T>
where
    T: Send + 'static,
{
    fn new<R, F>(mut f: F, out: mpsc::Sender<Tagged<R>>) -> Self
    where
        R: Send + 'static,
        F: FnMut(T) -> R + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Tagged<T>>();
        thread::spawn(move || loop {
            let task = match rx.recv() {
                Ok(task) => task,
                Err(_) => return,
            };
            let value = f(task.value);
            if out.send(Tagged::new(task.tag, value)).is_err() {
                return;
            }
        });
        Self { tx }
    }

    fn send(&self, task: Tagged<T>) {
        // A send to a dead worker drops the task; dispatch() surfaces the
        // missing tag once the result channel drains.
        let _ = self.tx.send(task);
    }
}

/// A fixed-size pool of worker threads, each looping over its own task
/// queue and reporting on a shared result channel.
///
/// The pool is built per top-level computation and consumed by
/// [`WorkerPool::dispatch`]; workers share nothing beyond the channels.
pub struct WorkerPool<T, R> {
    workers: Vec<Worker<T>>,
    tx: mpsc::Sender<Tagged<R>>,
    rx: mpsc::Receiver<Tagged<R>>,
}

impl<T, R> WorkerPool<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    /// Spawns `n` workers, each running a closure produced by `factory`.
    pub fn with<F, W>(n: usize, factory: F) -> Self
    where
        F: Fn() -> W,
        W: FnMut(T) -> R + Send + 'static,
    {
        assert!(n > 0, "no workers");
        let (tx, rx) = mpsc::channel();
        let workers = (0..n).map(|_| Worker::new(factory(), tx.clone())).collect();
        Self { workers, tx, rx }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Submits every task round-robin, then blocks until all workers have
    /// drained their queues and exited.
    ///
    /// Results are returned sorted by tag regardless of completion order.
    /// Tasks lost to a panicked worker are absent from the output; the
    /// caller detects them by comparing tags against what it submitted.
    pub fn dispatch<I>(self, tasks: I) -> Vec<Tagged<R>>
    where
        I: IntoIterator<Item = T>,
    {
        let Self { workers, tx, rx } = self;
        for (tag, task) in tasks.into_iter().enumerate() {
            workers[tag % workers.len()].send(Tagged::new(tag, task));
        }
        // Dropping the task senders lets each worker exit once its queue
        // is empty; dropping our result sender clone makes the drain
        // below terminate when the last worker is gone.
        drop(workers);
        drop(tx);
        let mut results: Vec<Tagged<R>> = rx.iter().collect();
        results.sort_by_key(|r| r.tag);
        results
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_results_sorted_by_tag() {
        let pool = WorkerPool::<u64, u64>::with(4, || |x: u64| x * x);
        let results = pool.dispatch(0..10u64);
        assert_eq!(results.len(), 10);
        for (i, r) in results.iter().enumerate() {
            assert_eq!(r.tag, i);
            assert_eq!(r.value, (i as u64) * (i as u64));
        }
    }

    #[test]
    fn test_more_tasks_than_workers() {
        let pool = WorkerPool::<u64, u64>::with(2, || |x: u64| x + 1);
        let results = pool.dispatch(0..33u64);
        assert_eq!(results.len(), 33);
        assert!(results.iter().all(|r| r.value == r.tag as u64 + 1));
    }

    #[test]
    fn test_panicked_worker_loses_only_its_tasks() {
        let pool = WorkerPool::<u64, u64>::with(2, || {
            |x: u64| {
                if x == 3 {
                    panic!("bad task");
                }
                x + 1
            }
        });
        let results = pool.dispatch(0..6u64);
        assert!(results.len() < 6);
        assert!(results.iter().all(|r| r.tag != 3));
        for r in &results {
            assert_eq!(r.value, r.tag as u64 + 1);
        }
    }
}
