use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ringspsc_rs::{channel, Config, Ring};
use std::thread;

const MSG_COUNT: u64 = 1_000_000;

fn bench_spsc(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsc");
    group.throughput(Throughput::Elements(MSG_COUNT));

    for bits in [10u8, 12, 16] {
        let config = Config::from_bits(bits).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("cap_{}", config.capacity())),
            &config,
            |b, &config| {
                b.iter(|| {
                    let (mut producer, mut consumer) = channel::<u64>(config);

                    // Producer thread
                    let producer_handle = thread::spawn(move || {
                        for i in 0..MSG_COUNT {
                            let mut value = i;
                            while let Err(full) = producer.try_push(value) {
                                value = full.into_inner();
                                std::hint::spin_loop();
                            }
                        }
                    });

                    // Consumer on the bench thread
                    let mut sum = 0u64;
                    let mut count = 0u64;
                    while count < MSG_COUNT {
                        match consumer.try_pop() {
                            Some(v) => {
                                sum += v;
                                count += 1;
                            }
                            None => std::hint::spin_loop(),
                        }
                    }

                    producer_handle.join().unwrap();
                    assert_eq!(sum, MSG_COUNT * (MSG_COUNT - 1) / 2);
                    black_box(sum);
                });
            },
        );
    }

    group.finish();
}

fn bench_single_thread(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_thread");
    group.throughput(Throughput::Elements(1));

    group.bench_function("push_pop", |b| {
        let mut ring = Ring::<u64>::new(Config::fixed::<1024>());
        b.iter(|| {
            let _ = ring.push_mut(black_box(7));
            black_box(ring.pop_mut())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_spsc, bench_single_thread);
criterion_main!(benches);
