//! table/parallel.rs
//! Row fan-out over scoped worker threads.
//!
//! Design notes:
//! - Row indices go out over a bounded crossbeam channel; results come back tagged with
//!   their index and are reassembled in order.
//! - Each worker owns its counters and hands them back on join; no shared mutable
//!   state between workers.
//! - When several rows fail, the error of the lowest row index is returned, same as
//!   the sequential strategy.

use std::thread;

use crossbeam::channel::{bounded, unbounded};
use log::debug;

use crate::table::types::TableError;
use crate::telemetry::CellCounters;

/// Apply `f` to every item, sequentially.
pub(crate) fn run_sequential<I, T, F>(items: &[I], f: F) -> Result<(Vec<T>, CellCounters), TableError>
where
    F: Fn(usize, &I, &mut CellCounters) -> Result<T, TableError>,
{
    let mut counters = CellCounters::default();
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        out.push(f(i, item, &mut counters)?);
    }
    Ok((out, counters))
}

/// Apply `f` to every item on up to `workers` threads. Output order equals input order.
pub(crate) fn run_parallel<I, T, F>(
    items: &[I],
    workers: usize,
    f: F,
) -> Result<(Vec<T>, CellCounters), TableError>
where
    I: Sync,
    T: Send,
    F: Fn(usize, &I, &mut CellCounters) -> Result<T, TableError> + Sync,
{
    let workers = workers.clamp(1, items.len().max(1));
    if workers == 1 || items.len() < 2 {
        return run_sequential(items, f);
    }

    let (job_tx, job_rx) = bounded::<usize>(workers * 4);
    let (out_tx, out_rx) = unbounded::<(usize, Result<T, TableError>)>();
    let f = &f;

    let per_worker = thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let rx = job_rx.clone();
            let tx = out_tx.clone();
            handles.push(scope.spawn(move || {
                let mut counters = CellCounters::default();
                for i in rx.iter() {
                    let res = f(i, &items[i], &mut counters);
                    if tx.send((i, res)).is_err() {
                        break;
                    }
                }
                counters
            }));
        }
        drop(job_rx);
        drop(out_tx);

        for i in 0..items.len() {
            if job_tx.send(i).is_err() {
                break;
            }
        }
        drop(job_tx);

        handles.into_iter().map(|h| h.join()).collect::<Vec<_>>()
    });

    let mut counters = CellCounters::default();
    for joined in per_worker {
        let c = joined.map_err(|_| TableError::WorkerPanicked)?;
        counters.merge(&c);
    }

    let mut slots: Vec<Option<T>> = Vec::with_capacity(items.len());
    slots.resize_with(items.len(), || None);
    let mut first_err: Option<(usize, TableError)> = None;
    for (i, res) in out_rx.iter() {
        match res {
            Ok(v) => slots[i] = Some(v),
            Err(e) => {
                if first_err.as_ref().map_or(true, |(j, _)| i < *j) {
                    first_err = Some((i, e));
                }
            }
        }
    }
    if let Some((_, e)) = first_err {
        return Err(e);
    }

    debug!("parallel table pass: items={} workers={} {}", items.len(), workers, counters);
    slots
        .into_iter()
        .collect::<Option<Vec<T>>>()
        .map(|out| (out, counters))
        .ok_or(TableError::WorkerPanicked)
}
