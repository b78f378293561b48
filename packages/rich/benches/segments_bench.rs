use composer_rich::{
    parse_markup, project_to_plain_text, serialize, Segment, TokenDescriptor, TokenRegistry,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn registry() -> TokenRegistry {
    (0..32)
        .map(|i| {
            TokenDescriptor::new(format!("tok-{i}"), format!("TOKEN_{i}"), format!("<|t{i}|>"))
        })
        .collect()
}

fn conversation(turns: usize) -> Vec<Segment> {
    let mut segments = Vec::new();
    for i in 0..turns {
        segments.push(Segment::token(format!("tok-{}", i % 32)));
        segments.push(Segment::text(format!(
            "Turn {i}: the quick brown fox <jumps> over the lazy dog & friends.\n"
        )));
    }
    segments
}

fn serialize_conversation(c: &mut Criterion) {
    let registry = registry();
    let segments = conversation(200);

    c.bench_function("serialize_200_turns", |b| {
        b.iter(|| serialize(black_box(&segments), black_box(&registry)))
    });
}

fn parse_conversation(c: &mut Criterion) {
    let registry = registry();
    let markup = serialize(&conversation(200), &registry);

    c.bench_function("parse_200_turns", |b| b.iter(|| parse_markup(black_box(&markup))));
}

fn parse_browser_lines(c: &mut Criterion) {
    let mut markup = String::from("first line");
    for i in 0..200 {
        markup.push_str(&format!(
            "<div>line {i} <span contenteditable=\"false\" data-token-id=\"tok-1\">T</span>&nbsp;tail</div>"
        ));
    }
    markup.push_str("<div><br></div>");

    c.bench_function("parse_browser_lines", |b| b.iter(|| parse_markup(black_box(&markup))));
}

fn project_conversation(c: &mut Criterion) {
    let registry = registry();
    let segments = conversation(200);

    c.bench_function("project_200_turns", |b| {
        b.iter(|| project_to_plain_text(black_box(&segments), black_box(&registry)))
    });
}

criterion_group!(
    benches,
    serialize_conversation,
    parse_conversation,
    parse_browser_lines,
    project_conversation
);
criterion_main!(benches);
