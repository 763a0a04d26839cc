//! Usage: `checksum [CAPACITY] [COUNT]`
//!
//! Defaults: 64K slots, 20M values. Set `RUST_LOG` to adjust log output.

use anyhow::{bail, Result};
use ringspsc_driver::{run, Args};

fn main() -> Result<()> {
    ringspsc_rs::trace::init_tracing();

    let args = Args::parse(std::env::args().skip(1))?;
    let report = run(args)?;

    println!(
        "Capacity: {} | N: {} | time: {:.3} s",
        report.capacity,
        report.count,
        report.elapsed.as_secs_f64()
    );
    println!("Throughput: {:.0} msgs/s", report.throughput());
    println!(
        "Checksum OK? {}",
        if report.checksum_ok() { "yes" } else { "NO" }
    );

    if !report.checksum_ok() {
        bail!(
            "checksum mismatch: popped {} of {}, sum {} expected {}",
            report.popped,
            report.count,
            report.sum,
            report.expected_sum()
        );
    }
    Ok(())
}
