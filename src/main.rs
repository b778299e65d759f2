use colmean::{GroupedMeans, PartialState, TypeDescriptor};
use rand::Rng;
use std::time::Instant;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

const WORKERS: usize = 4;
const ROWS_PER_WORKER: usize = 1_000_000;
const HOSTS: [&str; 3] = ["h-0", "h-1", "h-2"];

fn main() -> colmean::Result<()> {
    env_logger::builder()
        .filter_module("colmean", log::LevelFilter::Debug)
        .parse_default_env()
        .init();

    // cpu, memory, disk
    let types = [
        TypeDescriptor::Double,
        TypeDescriptor::Double,
        TypeDescriptor::Double,
    ];
    let columns = colmean::validate(&types)?;

    let start = Instant::now();

    // Every worker sees a different share of rows, and also runs the
    // single-pass aggregation so the two results can be compared
    let mut wire = vec![];
    let mut reference = GroupedMeans::new(columns);

    for worker in 0..WORKERS {
        let mut rng = rand::thread_rng();
        let mut groups = GroupedMeans::new(columns);

        for idx in 0..ROWS_PER_WORKER {
            let host = HOSTS[idx % HOSTS.len()];

            // Generate a value that starts low and increases over time with some random variation
            let base_value: f64 = if idx < ROWS_PER_WORKER / 100 {
                10.0 // Low load
            } else {
                75.0 // High load
            };

            let row = [
                Some((base_value + rng.gen_range(-5.0..5.0)).max(0.0)),
                Some(rng.gen_range(0.0..64.0)),
                // NOTE: Disk is sampled rarely
                rng.gen_bool(0.1).then(|| rng.gen_range(0.0..100.0)),
            ];

            groups.accumulate(host, &row)?;
            reference.accumulate(host, &row)?;
        }

        for (host, partial) in groups.snapshot()? {
            wire.push((host, partial.to_bytes()));
        }

        log::info!("worker {worker} done after {:?}", start.elapsed());
    }

    log::info!(
        "shipping {} partial states ({} bytes)",
        wire.len(),
        wire.iter().map(|(_, bytes)| bytes.len()).sum::<usize>()
    );

    let start = Instant::now();

    let mut reducer = GroupedMeans::new(columns);

    for (host, bytes) in &wire {
        let partial = PartialState::decode_from(&mut &bytes[..])?;
        reducer.merge(host, Some(&partial))?;
    }

    let merged = reducer.collect()?;
    let reference = reference.collect()?;

    log::info!("merged in {:?}", start.elapsed());

    for host in HOSTS {
        let (Some(merged), Some(reference)) = (merged.get(host), reference.get(host)) else {
            continue;
        };

        log::info!("[{host}] means: {merged:?}");

        let max_diff = merged
            .iter()
            .zip(reference)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);

        log::debug!("[{host}] max difference to single pass: {max_diff:e}");
    }

    Ok(())
}
