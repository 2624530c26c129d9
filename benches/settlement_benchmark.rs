use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use settlement_optimizer::optimization::{optimize, Algorithm};
use settlement_optimizer::simulation::stress_test::{generate_random_transfers, NetworkConfig};

fn bench_solvers(c: &mut Criterion) {
    let mut group = c.benchmark_group("settle");

    for participants in [10usize, 50, 200] {
        let config = NetworkConfig {
            participant_count: participants,
            transfer_count: participants * 5,
            seed: Some(participants as u64),
            ..Default::default()
        };
        let debts = generate_random_transfers(&config);

        for algorithm in Algorithm::ALL {
            group.bench_with_input(
                BenchmarkId::new(algorithm.as_str(), participants),
                &debts,
                |b, debts| b.iter(|| optimize(algorithm, black_box(debts))),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_solvers);
criterion_main!(benches);
