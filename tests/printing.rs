use pretty_any::{
    boxed, pformat, pformat_colored, pformat_with, value_to_sdocs, Bytes, Commented, List,
    Mapping, PrettyConfig, SDoc, Set, Shared, Theme, TrailingCommented, Tuple, Value,
};

fn pformat_cfg(value: &dyn Value, f: impl FnOnce(&mut PrettyConfig)) -> String {
    let mut config = PrettyConfig::default();
    f(&mut config);
    pformat_with(value, &config)
}

#[test]
fn scalars() {
    assert_eq!(pformat(&17i64), "17");
    assert_eq!(pformat(&-3i32), "-3");
    assert_eq!(pformat(&250u8), "250");
    assert_eq!(pformat(&1.5f64), "1.5");
    assert_eq!(pformat(&2.0f64), "2.0");
    assert_eq!(pformat(&f64::INFINITY), "f64::INFINITY");
    assert_eq!(pformat(&f64::NEG_INFINITY), "f64::NEG_INFINITY");
    assert_eq!(pformat(&f64::NAN), "f64::NAN");
    assert_eq!(pformat(&true), "true");
    assert_eq!(pformat(&false), "false");
    assert_eq!(pformat(&()), "()");
}

#[test]
fn strings_use_the_minority_quote() {
    assert_eq!(pformat(&"hello"), "'hello'");
    assert_eq!(pformat(&"don't"), "\"don't\"");
    assert_eq!(pformat(&String::from("say \"hi\"")), "'say \"hi\"'");
    // A tie goes to the single quote.
    assert_eq!(pformat(&"'\""), "'\\'\"'");
}

#[test]
fn string_escapes() {
    assert_eq!(pformat(&"a\nb"), "'a\\nb'");
    assert_eq!(pformat(&"tab\there"), "'tab\\there'");
    assert_eq!(pformat(&"back\\slash"), "'back\\\\slash'");
    assert_eq!(pformat(&"\u{1}"), "'\\u{1}'");
}

#[test]
fn bytes_get_an_affix() {
    assert_eq!(pformat(&Bytes(b"hello".to_vec())), "b'hello'");
    assert_eq!(pformat(&Bytes(b"don't".to_vec())), "b\"don't\"");
    assert_eq!(pformat(&Bytes(vec![0x61, 0xff])), "b'a\\xff'");
}

#[test]
fn small_containers_stay_flat() {
    let list = List(vec![boxed(1i64), boxed(2i64), boxed(3i64)]);
    assert_eq!(pformat(&list), "[1, 2, 3]");

    let tuple = Tuple(vec![boxed(1i64), boxed(2i64)]);
    assert_eq!(pformat(&tuple), "(1, 2)");

    let set = Set(vec![boxed(1i64), boxed(2i64)]);
    assert_eq!(pformat(&set), "{1, 2}");

    let mapping = Mapping(vec![(
        boxed("lorem"),
        boxed(List(vec![boxed(1i64), boxed(2i64)])),
    )]);
    assert_eq!(pformat(&mapping), "{'lorem': [1, 2]}");
}

#[test]
fn empty_containers() {
    assert_eq!(pformat(&List(vec![])), "[]");
    assert_eq!(pformat(&Tuple(vec![])), "()");
    assert_eq!(pformat(&Set(vec![])), "Set()");
    assert_eq!(pformat(&Mapping(vec![])), "{}");
}

#[test]
fn single_element_tuple_dangles_a_comma() {
    assert_eq!(pformat(&Tuple(vec![boxed(1i64)])), "(1,)");
}

#[test]
fn mappings_with_more_than_two_entries_always_break() {
    let mapping = Mapping(vec![
        (boxed("a"), boxed(1i64)),
        (boxed("b"), boxed(2i64)),
        (boxed("c"), boxed(3i64)),
    ]);
    let expected = "\
{
    'a': 1,
    'b': 2,
    'c': 3
}";
    assert_eq!(pformat(&mapping), expected);
}

#[test]
fn mapping_keys_can_be_sorted() {
    let mapping = Mapping(vec![
        (boxed("b"), boxed(1i64)),
        (boxed("a"), boxed(2i64)),
        (boxed(3i64), boxed(9i64)),
    ]);
    let expected = "\
{
    'a': 2,
    'b': 1,
    3: 9
}";
    assert_eq!(
        pformat_cfg(&mapping, |config| config.sort_mapping_keys = true),
        expected
    );
}

#[test]
fn long_mapping_value_breaks_the_whole_mapping() {
    let value: String = ["ab".repeat(20), "   ".to_owned(), "ab".repeat(20)].concat();
    let mapping = Mapping(vec![(boxed("okay"), boxed(value))]);
    let expected = "\
{
    'okay':
        'abababababababababababababababababababab   '
        'abababababababababababababababababababab'
}";
    assert_eq!(pformat(&mapping), expected);
}

#[test]
fn top_level_string_wraps_plain() {
    let expected = "\
'ababababababababababababababababababababababababababababababababababa'
'bababababababababababababababab'";
    assert_eq!(pformat(&"ab".repeat(50)), expected);
}

#[test]
fn second_level_strings_hang() {
    let long = "ab".repeat(50);
    let list = List(vec![boxed(long.clone()), boxed(long)]);
    let expected = "\
[
    'ababababababababababababababababababababababababababababababababababa'
        'bababababababababababababababab',
    'ababababababababababababababababababababababababababababababababababa'
        'bababababababababababababababab'
]";
    assert_eq!(pformat(&list), expected);
}

#[test]
fn sole_string_element_is_not_hang_indented() {
    let list = List(vec![boxed("ab".repeat(50))]);
    let expected = "\
[
    'ababababababababababababababababababababababababababababababababababa'
    'bababababababababababababababab'
]";
    assert_eq!(pformat(&list), expected);
}

#[test]
fn strings_split_at_whitespace_boundaries() {
    let data = "lorem ipsum dolor sit amet ".repeat(10);
    let expected = "\
'lorem ipsum dolor sit amet lorem ipsum dolor sit amet lorem ipsum '
'dolor sit amet lorem ipsum dolor sit amet lorem ipsum dolor sit amet '
'lorem ipsum dolor sit amet lorem ipsum dolor sit amet lorem ipsum '
'dolor sit amet lorem ipsum dolor sit amet lorem ipsum dolor sit amet '";
    assert_eq!(pformat(&data), expected);
}

#[test]
fn cyclic_values_terminate_with_a_placeholder() {
    let shared = Shared::new(Mapping(vec![]));
    shared.replace(Mapping(vec![(boxed("self"), boxed(shared.clone()))]));

    let rendered = pformat(&shared);
    let expected = format!(
        "{{'self': <Recursion on Mapping with id={}>}}",
        shared.identity()
    );
    assert_eq!(rendered, expected);
}

#[test]
fn sibling_occurrences_are_not_recursion() {
    let shared = Shared::new(List(vec![boxed(1i64)]));
    let list = List(vec![boxed(shared.clone()), boxed(shared)]);
    assert_eq!(pformat(&list), "[[1], [1]]");
}

#[test]
fn sequences_are_truncated_to_max_seq_len() {
    let list = List(vec![boxed(1i64), boxed(2i64), boxed(3i64)]);
    let expected = "\
[
    1,
    2,
    # ...and 1 more elements
]";
    assert_eq!(pformat_cfg(&list, |config| config.max_seq_len = 2), expected);
}

#[test]
fn mappings_are_truncated_with_a_trailing_comment() {
    let mapping = Mapping(vec![
        (boxed("a"), boxed(1i64)),
        (boxed("b"), boxed(2i64)),
    ]);
    let expected = "\
{
    'a': 1
    # ...and 1 more elements
}";
    assert_eq!(
        pformat_cfg(&mapping, |config| config.max_seq_len = 1),
        expected
    );
}

#[test]
fn depth_exhaustion_prints_placeholders() {
    let nested = List(vec![boxed(List(vec![boxed(1i64)]))]);
    assert_eq!(
        pformat_cfg(&nested, |config| config.depth = Some(1)),
        "[[...]]"
    );

    let mapping = Mapping(vec![(boxed("k"), boxed(1i64))]);
    assert_eq!(
        pformat_cfg(&mapping, |config| config.depth = Some(0)),
        "{...}"
    );
}

#[test]
fn commented_elements_force_break_and_carry_their_comment() {
    let list = List(vec![
        boxed(1i64),
        boxed(Commented::new(2i64, "two")),
        boxed(3i64),
    ]);
    let expected = "\
[
    1,
    2,  # two
    3
]";
    assert_eq!(pformat(&list), expected);
}

#[test]
fn trailing_comment_on_a_sequence() {
    let value = TrailingCommented::new(List(vec![boxed(1i64), boxed(2i64)]), "and more");
    let expected = "\
[
    1,
    2,
    # and more
]";
    assert_eq!(pformat(&value), expected);
}

#[test]
fn commented_mapping_value_keeps_the_comment_on_its_line() {
    let mapping = Mapping(vec![(boxed("k"), boxed(Commented::new(5i64, "note")))]);
    let expected = "\
{
    'k': 5  # note
}";
    assert_eq!(pformat(&mapping), expected);
}

#[test]
fn top_level_comment_is_rendered() {
    let value = Commented::new(7i64, "lucky");
    assert_eq!(pformat(&value), "7  # lucky");
}

#[test]
fn unregistered_types_fall_back_to_debug() {
    #[derive(Debug)]
    struct Opaque {
        n: i64,
    }
    pretty_any::reflect_value!(Opaque);

    assert_eq!(pformat(&Opaque { n: 3 }), "Opaque { n: 3 }");
}

#[test]
fn colored_output_wraps_tokens_in_escape_sequences() {
    let config = PrettyConfig::default();
    let rendered = pformat_colored(&17i64, &config, &Theme::dark());
    assert!(rendered.contains("\x1b["));
    assert!(rendered.ends_with("\x1b[0m"));
    assert!(rendered.contains("17"));
}

#[test]
fn rendering_is_deterministic() {
    let mapping = Mapping(vec![
        (boxed("key"), boxed(List(vec![boxed(1i64), boxed("x")]))),
        (boxed(2i64), boxed("don't")),
    ]);
    assert_eq!(pformat(&mapping), pformat(&mapping));
}

#[test]
fn sdoc_stream_annotations_are_balanced() {
    let mapping = Mapping(vec![
        (boxed("key"), boxed(List(vec![boxed(1i64), boxed("x'y")]))),
        (boxed("other"), boxed(Tuple(vec![boxed(1.25f64)]))),
        (boxed(3i64), boxed(Bytes(b"raw\xff".to_vec()))),
    ]);
    let mut open = Vec::new();
    for sdoc in value_to_sdocs(&mapping, &PrettyConfig::default()) {
        match sdoc {
            SDoc::PushAnn(ann) => open.push(ann),
            SDoc::PopAnn(ann) => {
                assert_eq!(open.pop(), Some(ann), "annotations closed out of order");
            }
            SDoc::Str(_) | SDoc::Line(_) => {}
        }
    }
    assert!(open.is_empty());
}

#[test]
fn deep_narrow_mappings_stay_readable() {
    let mut value: Box<dyn Value> = boxed(1i64);
    for _ in 0..13 {
        value = boxed(Mapping(vec![(boxed("a"), value)]));
    }
    let rendered = pformat_cfg(&*value, |config| config.width = 30);
    assert!(rendered.starts_with('{'));
    assert!(rendered.contains("'a': 1"));
    assert!(rendered.contains('\n'));
}
