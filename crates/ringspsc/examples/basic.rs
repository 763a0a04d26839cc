use ringspsc_rs::{channel, EmplaceError, LOW_LATENCY_CONFIG};
use std::thread;
use std::time::Instant;

/// A message that must be parsed before it can be queued.
#[derive(Debug)]
struct Order {
    id: u64,
    qty: u32,
}

fn parse(line: &str) -> Result<Order, String> {
    let (id, qty) = line.split_once(':').ok_or_else(|| format!("bad line {:?}", line))?;
    Ok(Order {
        id: id.parse::<u64>().map_err(|e| format!("bad id: {}", e))?,
        qty: qty.parse::<u32>().map_err(|e| format!("bad qty: {}", e))?,
    })
}

fn main() {
    println!("RingSPSC Basic Example");
    println!("======================\n");

    const ORDERS: u64 = 1_000_000;

    let (mut producer, mut consumer) = channel::<Order>(LOW_LATENCY_CONFIG);
    println!("Configuration:");
    println!("  Capacity: {} slots", producer.capacity());
    println!("  Orders: {}\n", ORDERS);

    let start = Instant::now();

    let producer_handle = thread::spawn(move || {
        let mut rejected = 0u64;
        for i in 0..ORDERS {
            // Every 100_000th line is malformed
            let line = if i % 100_000 == 99_999 {
                format!("{}:??", i)
            } else {
                format!("{}:{}", i, i % 7 + 1)
            };

            loop {
                match producer.try_push_with(|| parse(&line)) {
                    Ok(()) => break,
                    Err(EmplaceError::Full) => thread::yield_now(),
                    Err(EmplaceError::Construct(reason)) => {
                        rejected += 1;
                        if rejected == 1 {
                            println!("Producer rejected: {}", reason);
                        }
                        break;
                    }
                }
            }
        }
        rejected
    });

    let mut received = 0u64;
    let mut total_qty = 0u64;
    let mut last_id = None;
    loop {
        match consumer.try_pop() {
            Some(order) => {
                received += 1;
                total_qty += u64::from(order.qty);
                last_id = Some(order.id);
            }
            None if consumer.is_abandoned() && consumer.is_empty() => break,
            None => thread::yield_now(),
        }
    }

    let rejected = producer_handle.join().unwrap();
    let duration = start.elapsed();

    println!("\nResults:");
    println!("  Orders received: {}", received);
    println!("  Orders rejected: {}", rejected);
    println!("  Last order id: {:?}", last_id);
    println!("  Total quantity: {}", total_qty);
    println!("  Duration: {:.2?}", duration);
    println!(
        "  Throughput: {:.2} million orders/sec",
        received as f64 / duration.as_secs_f64() / 1_000_000.0
    );
    assert_eq!(received + rejected, ORDERS);
}
