// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Envelope Codec Benchmark
//!
//! Measures encode and decode cost through the `Animal` trait object for
//! different name lengths, plus a full FIFO channel pass.

#![allow(clippy::uninlined_format_args)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use menagerie::{from_bytes, to_bytes, Animal, Cat, Channel, Dog, VariantRegistry};
use std::hint::black_box as bb;

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("envelope_encode");
    let registry = VariantRegistry::builtin();

    for len in [8, 64, 512, 4096] {
        let mut dog = Dog::new(&"x".repeat(len));
        dog.set_favorite_toy("ball");
        group.bench_with_input(BenchmarkId::from_parameter(len), &dog, |b, dog| {
            b.iter(|| to_bytes(&registry, bb(dog as &dyn Animal)).expect("encode"));
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("envelope_decode");
    let registry = VariantRegistry::builtin();

    for len in [8, 64, 512, 4096] {
        let bytes = to_bytes(&registry, &Cat::new(&"y".repeat(len))).expect("encode");
        group.bench_with_input(BenchmarkId::from_parameter(len), &bytes, |b, bytes| {
            b.iter(|| from_bytes(&registry, bb(bytes)).expect("decode"));
        });
    }

    group.finish();
}

fn bench_channel(c: &mut Criterion) {
    let registry = VariantRegistry::builtin();
    let cat = Cat::new("Garfield");
    let dog = Dog::new("Snoopy");

    c.bench_function("channel_send_recv_pair", |b| {
        b.iter(|| {
            let mut channel = Channel::new(&registry);
            channel.send(&cat).expect("send");
            channel.send(&dog).expect("send");
            bb(channel.recv().expect("recv"));
            bb(channel.recv().expect("recv"));
        });
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_channel);
criterion_main!(benches);
