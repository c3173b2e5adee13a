use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use perkons_core::{Kit, KitFormat};

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");

    for format in KitFormat::ALL {
        let encoded = Kit::blank(format).unwrap().to_buffer().unwrap();

        group.throughput(Throughput::Bytes(encoded.len() as u64));
        group.bench_with_input(format.to_string(), &encoded, |b, data| {
            b.iter(|| Kit::from_buffer(black_box(data)).unwrap());
        });
    }

    group.finish();
}

fn bench_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("save");

    for format in KitFormat::ALL {
        let kit = Kit::blank(format).unwrap();

        group.throughput(Throughput::Bytes(kit.encoded_len() as u64));
        group.bench_with_input(format.to_string(), &kit, |b, kit| {
            b.iter(|| black_box(kit).to_buffer().unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_load, bench_save);
criterion_main!(benches);
