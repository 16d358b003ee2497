use pretty_any::{
    align, always_break, annotate, concat, fill, group, intersperse, layout_fast, layout_smart,
    nest, render_to_string, Annotation, Doc, SDoc, Token, Width,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn render(doc: &Doc, width: Width) -> String {
    render_to_string(layout_smart(doc, width, 1.0))
}

#[test]
fn aligned_doc_lines_up_under_first_word() {
    let doc = concat(vec![
        Doc::text("lorem "),
        align(concat(vec![
            Doc::text("ipsum"),
            Doc::hardline(),
            Doc::text("aligned!"),
        ])),
    ]);
    let expected = "\
lorem ipsum
      aligned!";
    assert_eq!(
        render_to_string(layout_smart(&doc, 20, 0.9)),
        expected
    );
}

#[test]
fn fill_wraps_words_at_the_width() {
    let words = ["lorem", "ipsum", "dolor", "sit", "amet"]
        .iter()
        .cycle()
        .take(20)
        .map(|word| Doc::text(*word));
    let doc = fill(intersperse(Doc::line(), words));

    let expected = "\
lorem ipsum dolor sit
amet lorem ipsum dolor
sit amet lorem ipsum
dolor sit amet lorem
ipsum dolor sit amet";
    assert_eq!(
        render_to_string(layout_smart(&doc, 20, 0.9)),
        expected
    );
}

#[test]
fn fill_never_splits_inside_a_word() {
    let words = ["interdum", "et", "malesuada", "fames", "ac", "ante"]
        .iter()
        .cycle()
        .take(30)
        .map(|word| Doc::text(*word));
    let doc = fill(intersperse(Doc::line(), words));
    let rendered = render_to_string(layout_smart(&doc, 25, 0.9));
    for line in rendered.lines() {
        for word in line.split_whitespace() {
            assert!(
                ["interdum", "et", "malesuada", "fames", "ac", "ante"].contains(&word),
                "word split across lines: {:?}",
                word
            );
        }
    }
}

#[test]
fn ribbon_width_restricts_content_beyond_indentation() {
    // Plenty of page, but a one-column ribbon: every group breaks.
    let doc = group(concat(vec![
        Doc::text("a"),
        Doc::line(),
        Doc::text("b"),
    ]));
    let rendered = render_to_string(layout_smart(&doc, 60, 0.02));
    assert_eq!(rendered, "a\nb");
}

#[test]
fn smart_layout_breaks_groups_whose_later_lines_overflow() {
    // Flat, the group's second line would overflow the page; the one-line
    // lookahead misses that, the smart one does not.
    let tail = concat(vec![
        Doc::hardline(),
        Doc::text("cccccccccc"),
    ]);
    let doc = group(concat(vec![
        Doc::text("aa"),
        Doc::line(),
        nest(6, concat(vec![Doc::text("bb"), tail])),
    ]));

    let fast = render_to_string(layout_fast(&doc, 10, 1.0));
    assert_eq!(fast, "aa bb\n      cccccccccc");

    let smart = render_to_string(layout_smart(&doc, 10, 1.0));
    assert_eq!(smart, "aa\nbb\n      cccccccccc");
}

#[test]
fn hardline_inside_group_always_breaks() {
    let doc = group(concat(vec![
        Doc::text("a"),
        Doc::hardline(),
        Doc::text("b"),
    ]));
    assert_eq!(render(&doc, 80), "a\nb");
}

#[test]
fn always_break_propagates_to_enclosing_group() {
    let doc = group(concat(vec![
        Doc::text("a"),
        Doc::line(),
        always_break(group(concat(vec![
            Doc::text("b"),
            Doc::line(),
            Doc::text("c"),
        ]))),
    ]));
    // The outer group breaks; the inner one may still go flat.
    assert_eq!(render(&doc, 80), "a\nb c");
}

// Random documents in which adjacent texts are always separated by a line
// alternative, so the width bound is achievable.

const WORDS: &[&str] = &["a", "bc", "def", "ghij", "klmno", "pqrstu"];

fn random_doc(rng: &mut StdRng, depth: usize, annotated: bool) -> Doc {
    if depth == 0 || rng.gen_range(0..4) == 0 {
        return Doc::text(WORDS[rng.gen_range(0..WORDS.len())]);
    }
    let children: Vec<Doc> = (0..rng.gen_range(1..5))
        .map(|_| random_doc(rng, depth - 1, annotated))
        .collect();
    let separator = if rng.gen_bool(0.5) {
        Doc::line()
    } else {
        Doc::softline()
    };
    let mut doc = group(concat(intersperse(separator, children)));
    if rng.gen_bool(0.3) {
        doc = nest(rng.gen_range(0..3), doc);
    }
    if annotated && rng.gen_bool(0.3) {
        let token = if rng.gen_bool(0.5) {
            Token::NumberInt
        } else {
            Token::LiteralString
        };
        doc = annotate(token, doc);
    }
    doc
}

#[test]
fn random_docs_stay_within_the_width() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let doc = random_doc(&mut rng, 4, false);
        let rendered = render(&doc, 30);
        for line in rendered.lines() {
            assert!(
                line.chars().count() <= 30,
                "line wider than the page: {:?}\nin:\n{}",
                line,
                rendered
            );
        }
    }
}

#[test]
fn docs_that_fit_flat_are_not_broken() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let doc = group(random_doc(&mut rng, 3, false));
        let flat = render(&doc, 10_000);
        if flat.chars().count() <= 40 {
            assert_eq!(render(&doc, 40), flat);
        }
    }
}

#[test]
fn annotations_are_balanced_and_properly_nested() {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..200 {
        let doc = random_doc(&mut rng, 4, true);
        let mut open: Vec<Annotation> = Vec::new();
        for sdoc in layout_smart(&doc, 30, 1.0) {
            match sdoc {
                SDoc::PushAnn(ann) => open.push(ann),
                SDoc::PopAnn(ann) => {
                    let top = open.pop().expect("pop without matching push");
                    assert_eq!(top, ann, "annotations closed out of order");
                }
                SDoc::Str(_) | SDoc::Line(_) => {}
            }
        }
        assert!(open.is_empty(), "unclosed annotations: {:?}", open);
    }
}

#[test]
fn layout_streams_are_identical_across_runs() {
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..50 {
        let doc = random_doc(&mut rng, 4, true);
        let first: Vec<SDoc> = layout_smart(&doc, 30, 0.9).collect();
        let second: Vec<SDoc> = layout_smart(&doc, 30, 0.9).collect();
        assert_eq!(first, second);
    }
}
