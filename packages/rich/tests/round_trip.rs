//! Round-trip and invariant tests across serializer, markup codec and parser

use composer_rich::{
    is_merged, parse, parse_markup, project_to_plain_text, serialize, serialize_with, ChipStyle,
    EditableTree, MemoryTree, Segment, TokenDescriptor, TokenRegistry,
};

fn registry() -> TokenRegistry {
    TokenRegistry::from_tokens([
        TokenDescriptor::new("sys", "SYSTEM", "<|system|>").with_color("bg-violet-100"),
        TokenDescriptor::new("eos", "EOS", "</s>"),
        TokenDescriptor::new("amp", "A&B <x>", "&"),
    ])
}

fn samples() -> Vec<Vec<Segment>> {
    vec![
        vec![],
        vec![Segment::text("plain")],
        vec![Segment::token("eos")],
        vec![Segment::token("sys"), Segment::token("eos")],
        vec![
            Segment::token("sys"),
            Segment::text("You are helpful.\n\nBe brief. "),
            Segment::token("eos"),
        ],
        vec![
            Segment::text("if a < b && c > d { \"quoted\" }"),
            Segment::token("amp"),
            Segment::text("&amp; stays literal"),
        ],
        vec![Segment::text("  leading and trailing  "), Segment::token("sys")],
        vec![Segment::text("unicode: héllo · 日本語 🎉")],
        vec![Segment::text("line\n"), Segment::token("eos"), Segment::text("\n")],
    ]
}

#[test]
fn test_round_trip_through_markup() {
    let registry = registry();
    for segments in samples() {
        let markup = serialize(&segments, &registry);
        assert_eq!(parse_markup(&markup), segments, "markup: {markup}");
    }
}

#[test]
fn test_round_trip_through_tree() {
    let registry = registry();
    for segments in samples() {
        let mut tree = MemoryTree::new();
        let root = tree.root();
        tree.set_inner_markup(&root, &serialize(&segments, &registry));

        assert_eq!(parse(&tree, &root), segments);
    }
}

#[test]
fn test_round_trip_with_custom_chip_style() {
    let style = ChipStyle {
        base_class: String::new(),
        default_color: "chip".to_string(),
        fallback_label: "?".to_string(),
    };
    let segments = vec![Segment::text("x"), Segment::token("nope"), Segment::text("y")];
    let markup = serialize_with(&segments, &registry(), &style);

    assert!(markup.contains(r#"class="chip">?</span>"#));
    assert_eq!(parse_markup(&markup), segments);
}

#[test]
fn test_round_trip_with_unregistered_registry() {
    // the registry only affects labels, never the parsed ids
    let segments = vec![Segment::token("eos"), Segment::text(" tail")];
    let markup = serialize(&segments, &TokenRegistry::new());
    assert_eq!(parse_markup(&markup), segments);
}

#[test]
fn test_serialized_markup_is_stable_in_tree() {
    let registry = registry();
    for segments in samples() {
        let markup = serialize(&segments, &registry);
        let tree = MemoryTree::from_markup(&markup);
        assert_eq!(tree.inner_markup(&tree.root()), markup);
    }
}

#[test]
fn test_parse_never_returns_adjacent_text() {
    let messy = [
        "a<b>b</b>c",
        "<div>a</div>b<div><br></div>c<br>d",
        "x<!--c-->y<span>z</span>",
        "<p>1</p><p>2</p><p><span data-token-id=\"t\">T</span></p>3",
        "&amp;&lt;&gt;&nbsp;",
    ];
    for markup in messy {
        let segments = parse_markup(markup);
        assert!(is_merged(&segments), "{markup} -> {segments:?}");
        assert!(segments
            .iter()
            .all(|s| s.as_text().map(|t| !t.is_empty()).unwrap_or(true)));
    }
}

#[test]
fn test_escaped_text_projects_back_unchanged() {
    let registry = registry();
    let segments = vec![Segment::text("<b>&x</b>")];

    let markup = serialize(&segments, &registry);
    let tree = MemoryTree::from_markup(&markup);
    let root = tree.root();

    // one text node, no elements were injected
    assert_eq!(tree.child_count(&root), 1);
    assert_eq!(tree.text(&tree.child_at(&root, 0).unwrap()).as_deref(), Some("<b>&x</b>"));
    assert_eq!(
        project_to_plain_text(&parse(&tree, &root), &registry),
        "<b>&x</b>"
    );
}

#[test]
fn test_dangling_token_tolerance() {
    let registry = registry();
    let segments = vec![Segment::token("missing-id")];

    let markup = serialize(&segments, &registry);
    assert!(markup.contains(r#"data-token-id="missing-id""#));
    assert!(markup.contains(">TOK</span>"));
    assert_eq!(project_to_plain_text(&segments, &registry), "");
}
