use rayon::prelude::*;

/// Map `f` over `items` on `max_workers` threads.
///
/// Results come back in input order; execution order is unspecified.
/// With one worker (or one item) everything runs on the calling thread.
pub fn run_pool<T, R, F>(items: &[T], max_workers: usize, f: F) -> anyhow::Result<Vec<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    if max_workers <= 1 || items.len() <= 1 {
        return Ok(items.iter().map(f).collect());
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(max_workers.min(items.len()))
        .thread_name(|i| format!("hapimeta-worker-{}", i))
        .build()?;
    Ok(pool.install(|| items.par_iter().map(f).collect()))
}
