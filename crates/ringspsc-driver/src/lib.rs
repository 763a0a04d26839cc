//! Checksum harness for the SPSC ring.
//!
//! One producer thread pushes `0..count` in order, one consumer thread pops
//! and sums. Both threads spin on a shared start flag so they begin
//! together. The run is correct iff exactly `count` values were popped and
//! their sum equals `count * (count - 1) / 2`.

use anyhow::{anyhow, bail, Context, Result};
use ringspsc_rs::{channel, Config};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default ring capacity (64K slots).
pub const DEFAULT_CAPACITY: usize = 1 << 16;

/// Default number of values pushed through the ring.
pub const DEFAULT_COUNT: u64 = 20_000_000;

/// Harness parameters: `[CAPACITY] [COUNT]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Args {
    pub config: Config,
    pub count: u64,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            config: Config::fixed::<DEFAULT_CAPACITY>(),
            count: DEFAULT_COUNT,
        }
    }
}

impl Args {
    /// Parses positional arguments (program name already skipped).
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut args = args.into_iter();
        let mut parsed = Self::default();

        if let Some(arg) = args.next() {
            let arg = arg.as_ref();
            let capacity: usize = arg
                .parse()
                .with_context(|| format!("invalid capacity {:?}", arg))?;
            parsed.config = Config::new(capacity)?;
        }

        if let Some(arg) = args.next() {
            let arg = arg.as_ref();
            parsed.count = arg
                .parse()
                .with_context(|| format!("invalid count {:?}", arg))?;
        }

        if let Some(extra) = args.next() {
            bail!("unexpected argument {:?}", extra.as_ref());
        }

        Ok(parsed)
    }
}

/// Outcome of one harness run.
#[derive(Debug, Clone, Copy)]
pub struct Report {
    pub capacity: usize,
    pub count: u64,
    pub popped: u64,
    pub sum: u128,
    pub elapsed: Duration,
}

impl Report {
    /// Closed-form sum of `0..count`.
    pub fn expected_sum(&self) -> u128 {
        let n = u128::from(self.count);
        n * n.saturating_sub(1) / 2
    }

    pub fn checksum_ok(&self) -> bool {
        self.popped == self.count && self.sum == self.expected_sum()
    }

    /// Messages per second.
    pub fn throughput(&self) -> f64 {
        self.count as f64 / self.elapsed.as_secs_f64()
    }
}

fn wait_for(go: &AtomicBool) {
    while !go.load(Ordering::Acquire) {
        std::hint::spin_loop();
    }
}

/// Runs the two-thread checksum scenario.
pub fn run(args: Args) -> Result<Report> {
    let Args { config, count } = args;
    let (mut producer, mut consumer) = channel::<u64>(config);
    let go = Arc::new(AtomicBool::new(false));

    let go_producer = Arc::clone(&go);
    let producer_handle = thread::Builder::new()
        .name("producer".into())
        .spawn(move || {
            wait_for(&go_producer);
            for i in 0..count {
                let mut value = i;
                while let Err(full) = producer.try_push(value) {
                    value = full.into_inner();
                    std::hint::spin_loop();
                }
            }
            debug!(count, "producer done");
        })
        .context("failed to spawn producer thread")?;

    let go_consumer = Arc::clone(&go);
    let consumer_handle = thread::Builder::new()
        .name("consumer".into())
        .spawn(move || {
            wait_for(&go_consumer);
            let mut sum = 0u128;
            let mut popped = 0u64;
            let mut value = 0u64;
            while popped < count {
                if consumer.try_pop_into(&mut value) {
                    sum += u128::from(value);
                    popped += 1;
                } else {
                    std::hint::spin_loop();
                }
            }
            debug!(popped, "consumer done");
            (sum, popped)
        })
        .context("failed to spawn consumer thread")?;

    info!(capacity = config.capacity(), count, "starting run");
    let start = Instant::now();
    go.store(true, Ordering::Release);

    producer_handle
        .join()
        .map_err(|_| anyhow!("producer thread panicked"))?;
    let (sum, popped) = consumer_handle
        .join()
        .map_err(|_| anyhow!("consumer thread panicked"))?;
    let elapsed = start.elapsed();

    let report = Report {
        capacity: config.capacity(),
        count,
        popped,
        sum,
        elapsed,
    };
    info!(
        elapsed_ms = elapsed.as_millis() as u64,
        ok = report.checksum_ok(),
        "run complete"
    );
    Ok(report)
}
