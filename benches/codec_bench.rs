use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use wire_transport::core::vle;
use wire_transport::ByteBuffer;

#[allow(clippy::unwrap_used)]
fn bench_vle(c: &mut Criterion) {
    let mut group = c.benchmark_group("vle");
    let values = [0u64, 127, 300, 1 << 35, u64::MAX];

    for &value in &values {
        let len = vle::encoded_len(value);
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_function(format!("encode_{len}b"), |b| {
            let mut buf = ByteBuffer::new(vle::MAX_VLE_BYTES);
            b.iter(|| {
                buf.clear();
                buf.put_vle(black_box(value)).unwrap();
            })
        });
        group.bench_function(format!("decode_{len}b"), |b| {
            let mut buf = ByteBuffer::new(vle::MAX_VLE_BYTES);
            buf.put_vle(value).unwrap();
            buf.flip();
            b.iter(|| {
                buf.set_position(0).unwrap();
                black_box(buf.get_vle().unwrap());
            })
        });
    }
    group.finish();
}

#[allow(clippy::unwrap_used)]
fn bench_strings(c: &mut Criterion) {
    let mut group = c.benchmark_group("string");
    let sizes = [8usize, 128, 1024, 16 * 1024];

    for &size in &sizes {
        let text = "é".repeat(size / 2);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_function(format!("put_{size}b"), |b| {
            let mut buf = ByteBuffer::new(size + vle::MAX_VLE_BYTES);
            b.iter(|| {
                buf.clear();
                buf.put_string(black_box(&text)).unwrap();
            })
        });
        group.bench_function(format!("get_{size}b"), |b| {
            let mut buf = ByteBuffer::new(size + vle::MAX_VLE_BYTES);
            buf.put_string(&text).unwrap();
            buf.flip();
            b.iter(|| {
                buf.set_position(0).unwrap();
                black_box(buf.get_string().unwrap());
            })
        });
    }
    group.finish();
}

#[allow(clippy::unwrap_used)]
fn bench_string_array(c: &mut Criterion) {
    let items: Vec<String> = (0..64).map(|i| format!("topic/{i}/value")).collect();

    c.bench_function("string_array_roundtrip_64", |b| {
        b.iter_batched(
            || ByteBuffer::new(4096),
            |mut buf| {
                buf.put_string_array(&items).unwrap();
                buf.flip();
                black_box(buf.get_string_array().unwrap());
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_vle, bench_strings, bench_string_array);
criterion_main!(benches);
