use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::json;

use mesh_baffles::prelude::*;

fn mid_plane_config(n: usize) -> BafflesConfig {
    let x = n as f64 / 2.0;
    BafflesConfig::new().with_baffle(
        BaffleSpec::new("mid", "plane", json!({ "point": [x, 0.5, 0.5], "normal": [1.0, 0.0, 0.0] }))
            .with_patch(PatchSpec::new("m", PatchType::Wall))
            .with_patch(PatchSpec::new("s", PatchType::Wall)),
    )
}

fn bench_create_baffles(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_baffles");
    for &n in &[8usize, 16, 32] {
        let mesh = PolyMesh::block([n, n, n], [n as f64; 3]).unwrap();
        let config = mid_plane_config(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                create_baffles(&mesh, &FieldStore::new(), &config, &PolyTopoChange, &NoComm).unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_create_baffles);
criterion_main!(benches);
