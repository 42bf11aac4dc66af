use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use completion_edit::{
    Buffer, CachedLine, Completion, Edit, EditContext, EditSettings, EditTransaction, Encoding,
    MarkNamespace, MemoryBuffer, MemoryMarks, Position, RangeEdit,
};

fn large_text(line_count: usize) -> String {
    let mut out = String::with_capacity(line_count * 64);
    for i in 0..line_count {
        out.push_str(&format!(
            "    let value_{i:06} = compute(\"héllo 👋\", {i}); // completion-edit bench\n"
        ));
    }
    out.pop();
    out
}

fn bench_plain_completion(c: &mut Criterion) {
    let text = large_text(50_000);
    let settings = EditSettings::default();
    c.bench_function("apply/plain_mid_file", |b| {
        b.iter_batched(
            || MemoryBuffer::from_text(&text),
            |mut buffer| {
                let row = 25_000;
                let line = buffer.line(row).unwrap_or_default();
                let ctx = EditContext::new(row, 10, line, buffer.line_count());
                let mut marks = MemoryMarks::new();
                let applied = EditTransaction::new(&mut buffer, &mut marks, MarkNamespace(1), &settings)
                    .apply(&ctx, &Completion::new(Edit::plain("value_completed")))
                    .unwrap();
                black_box(applied.cursor);
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_many_secondary_edits(c: &mut Criterion) {
    let text = large_text(5_000);
    let settings = EditSettings::default();
    let secondary: Vec<RangeEdit> = (0..100)
        .map(|i| {
            let row = i * 40;
            RangeEdit::new(Position::new(row, 4), Position::new(row, 7), Encoding::Utf16, "const")
        })
        .collect();

    c.bench_function("plan/100_secondary_edits", |b| {
        let mut buffer = MemoryBuffer::from_text(&text);
        let mut marks = MemoryMarks::new();
        let row = 2_500;
        let line = buffer.line(row).unwrap_or_default();
        let ctx = EditContext::new(row, 10, line, buffer.line_count());
        let completion = Completion::new(Edit::plain("value")).with_secondary(secondary.clone());
        let txn = EditTransaction::new(&mut buffer, &mut marks, MarkNamespace(1), &settings);
        b.iter(|| {
            let plan = txn.plan(black_box(&ctx), black_box(&completion), false).unwrap();
            black_box(plan.instructions.len());
        })
    });
}

fn bench_column_translation(c: &mut Criterion) {
    let line = CachedLine::new("x".repeat(200) + "👋你好" + &"y".repeat(200));
    c.bench_function("lines/utf16_to_utf8_col", |b| {
        b.iter(|| {
            for col in (0..400).step_by(7) {
                black_box(line.to_utf8_col(black_box(col), Encoding::Utf16));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_plain_completion,
    bench_many_secondary_edits,
    bench_column_translation
);
criterion_main!(benches);
