use criterion::{criterion_group, criterion_main, Criterion};
use search_core::{process_queries, DocumentStatus, Execution, SearchEngine, StopWords};

const WORDS: &[&str] = &[
    "rust", "search", "index", "query", "rank", "term", "document", "memory", "thread", "cache",
    "token", "score", "filter", "batch", "window", "the", "and", "of", "to", "in",
];

fn corpus(n: i32) -> SearchEngine {
    let mut engine = SearchEngine::with_stop_words(StopWords::english());
    for id in 0..n {
        let text: Vec<&str> = (0..24)
            .map(|i| WORDS[((id as usize) * 7 + i * 13 + i * i) % WORDS.len()])
            .collect();
        engine
            .add_document(id, &text.join(" "), DocumentStatus::Active, &[id % 10])
            .expect("valid document");
    }
    engine
}

fn bench_search(c: &mut Criterion) {
    let engine = corpus(10_000);
    c.bench_function("find_top_documents", |b| {
        b.iter(|| engine.find_top_documents("rust index -cache score"))
    });
    c.bench_function("find_top_documents_parallel", |b| {
        b.iter(|| {
            engine.find_top_documents_with_policy(
                Execution::Parallel,
                "rust index -cache score",
                DocumentStatus::Active,
            )
        })
    });
    let queries: Vec<String> = WORDS.iter().map(|w| format!("{w} rank -thread")).collect();
    c.bench_function("process_queries", |b| b.iter(|| process_queries(&engine, &queries)));
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
