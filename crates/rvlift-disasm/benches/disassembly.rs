//! Benchmarks for disassembly performance.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rvlift_disasm::{classify, render, Disassembler, RiscVDisassembler};

/// Sample RV64 code: a small leaf-calling function.
/// This is a realistic mix of stack, arithmetic, control flow, and memory ops.
const RV64_CODE: &[u8] = &[
    0x13, 0x01, 0x01, 0xff, // addi sp, sp, -16
    0x23, 0x34, 0x11, 0x00, // sd ra, 8(sp)
    0x13, 0x05, 0xa0, 0x02, // li a0, 42
    0xef, 0x00, 0x00, 0x02, // jal ra, +0x20
    0x63, 0x04, 0x05, 0x00, // beqz a0, +8
    0x3b, 0x05, 0xb5, 0x00, // addw a0, a0, a1
    0x83, 0x30, 0x81, 0x00, // ld ra, 8(sp)
    0x13, 0x01, 0x01, 0x01, // addi sp, sp, 16
    0x67, 0x80, 0x00, 0x00, // ret
];

/// Larger code block for throughput testing (repeated pattern).
fn generate_large_block(size: usize) -> Vec<u8> {
    RV64_CODE.iter().copied().cycle().take(size).collect()
}

fn bench_riscv_disassembly(c: &mut Criterion) {
    let disasm = RiscVDisassembler::rv64();

    let mut group = c.benchmark_group("riscv_disassembly");

    group.bench_function("single_instruction", |b| {
        b.iter(|| {
            let _ = disasm.decode_instruction(black_box(&RV64_CODE[..4]), 0x1000);
        })
    });

    group.bench_function("small_function", |b| {
        b.iter(|| {
            let _ = disasm.disassemble_block(black_box(RV64_CODE), 0x1000);
        })
    });

    for size in [1024, 4096, 16384, 65536] {
        let code = generate_large_block(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("throughput", size), &code, |b, code| {
            b.iter(|| {
                let _ = disasm.disassemble_block(black_box(code), 0x1000);
            })
        });
    }

    group.finish();
}

fn bench_riscv_classify_render(c: &mut Criterion) {
    let disasm = RiscVDisassembler::rv64();
    let instructions: Vec<_> = disasm
        .disassemble_block(RV64_CODE, 0x1000)
        .into_iter()
        .filter_map(Result::ok)
        .collect();

    let mut group = c.benchmark_group("riscv_presentation");

    group.bench_function("classify", |b| {
        b.iter(|| {
            for inst in &instructions {
                black_box(classify(inst, inst.address, disasm.variant()));
            }
        })
    });

    group.bench_function("render", |b| {
        b.iter(|| {
            for inst in &instructions {
                black_box(render(inst));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_riscv_disassembly, bench_riscv_classify_render);
criterion_main!(benches);
