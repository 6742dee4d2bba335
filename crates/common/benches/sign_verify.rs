use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

use signed_reply_common::reply::Reply;

fn sample_reply() -> Reply {
    let mut reply = Reply::success_with("worker", "rig-1");
    reply.add_result("hashrate", 1250.5);
    reply.add_result(
        "pool",
        json!({ "name": "main", "fee": 0.01, "regions": ["eu", "us"] }),
    );
    reply
}

fn bench_sign(c: &mut Criterion) {
    let reply = sample_reply();
    c.bench_function("sign_reply", |b| {
        b.iter(|| black_box(reply.clone()).signed(black_box("mysecret")))
    });
}

fn bench_verify(c: &mut Criterion) {
    let reply = sample_reply().signed("mysecret");
    c.bench_function("verify_reply", |b| {
        b.iter(|| black_box(&reply).verify(black_box("mysecret")))
    });
}

criterion_group!(benches, bench_sign, bench_verify);
criterion_main!(benches);
