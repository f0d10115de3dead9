use criterion::{black_box, criterion_group, criterion_main, Criterion};
use leap::Config;

fn bench_config_creation(c: &mut Criterion) {
    c.bench_function("config_default", |b| b.iter(Config::default));
}

fn bench_config_serialization(c: &mut Criterion) {
    let config = Config::default();

    c.bench_function("config_to_toml", |b| {
        b.iter(|| toml::to_string(&black_box(&config)))
    });

    let toml_str = toml::to_string(&config).unwrap();
    c.bench_function("config_from_toml", |b| {
        b.iter(|| toml::from_str::<Config>(black_box(&toml_str)))
    });

    c.bench_function("config_from_empty_toml", |b| {
        b.iter(|| toml::from_str::<Config>(black_box("")))
    });
}

criterion_group!(benches, bench_config_creation, bench_config_serialization);
criterion_main!(benches);
