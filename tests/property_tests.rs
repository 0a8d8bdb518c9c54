//! Property-based tests for the nesting engine.
//!
//! Random value trees are replayed through the view API, with or without
//! explicit `close()` calls, and the output must decode back to the same
//! tree.

mod common;

use common::{decode, decode_one, pack_doc};
use proptest::prelude::*;
use vbs_writer::{
    Dict, DictWriter, List, ListWriter, PackOptions, Sink, Value, VbsPacker, Writer,
};

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        any::<f64>()
            .prop_filter("NaN never equals itself", |f| !f.is_nan())
            .prop_map(Value::Float),
        "[a-z0-9 ]{0,40}".prop_map(Value::String),
        prop::collection::vec(any::<u8>(), 0..48).prop_map(Value::Blob),
    ]
}

fn tree() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6)
                .prop_map(|items| Value::List(List::from(items))),
            prop::collection::vec(("[a-z]{1,8}", inner), 0..6)
                .prop_map(|entries| Value::Dict(entries.into_iter().collect::<Dict>())),
        ]
    })
}

fn replay_list<S: Sink>(list: &ListWriter<'_, S>, items: &List, close: bool) {
    for item in items {
        match item {
            Value::List(inner) => replay_list(&list.append_list(), inner, close),
            Value::Dict(inner) => replay_dict(&list.append_dict(), inner, close),
            scalar => list.append(scalar),
        }
    }
    if close {
        list.close();
    }
}

fn replay_dict<S: Sink>(dict: &DictWriter<'_, S>, entries: &Dict, close: bool) {
    for (key, value) in entries {
        match value {
            Value::List(inner) => replay_list(&dict.append_list(key), inner, close),
            Value::Dict(inner) => replay_dict(&dict.append_dict(key), inner, close),
            scalar => dict.append(key, scalar),
        }
    }
    if close {
        dict.close();
    }
}

fn replay(value: &Value, close: bool) -> Vec<u8> {
    pack_doc(|doc| {
        let top = doc.values();
        match value {
            Value::List(items) => replay_list(&top.append_list(), items, close),
            Value::Dict(entries) => replay_dict(&top.append_dict(), entries, close),
            scalar => top.append(scalar),
        }
    })
}

proptest! {
    #[test]
    fn prop_replay_decodes_to_same_tree(value in tree(), close in any::<bool>()) {
        let bytes = replay(&value, close);
        prop_assert_eq!(decode_one(&bytes), value);
    }

    #[test]
    fn prop_explicit_close_is_byte_identical_to_auto_finish(value in tree()) {
        prop_assert_eq!(replay(&value, true), replay(&value, false));
    }

    #[test]
    fn prop_replay_matches_direct_pack(value in tree()) {
        let direct = pack_doc(|doc| doc.values().append(&value));
        prop_assert_eq!(replay(&value, false), direct);
    }

    #[test]
    fn prop_splice_matches_replay(items in prop::collection::vec(tree(), 0..8)) {
        let list = List::from(items);
        let replayed = pack_doc(|doc| {
            doc.values().append_list_from(&list);
        });
        let spliced = pack_doc(|doc| {
            doc.values().append_list_from(&list.clone().with_encoding());
        });
        prop_assert_eq!(spliced, replayed);
    }

    #[test]
    fn prop_buffer_size_does_not_change_output(value in tree(), buffer_size in 1usize..64) {
        let doc = Writer::new(VbsPacker::with_options(
            Vec::new(),
            PackOptions::new().with_buffer_size(buffer_size),
        ));
        doc.values().append(&value);
        let streamed = doc.finish().finish().unwrap();
        prop_assert_eq!(streamed, pack_doc(|doc| doc.values().append(&value)));
    }

    #[test]
    fn prop_segmented_string_matches_contiguous(
        text in "[a-zA-Z0-9]{0,200}",
        cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..6),
    ) {
        let mut points: Vec<usize> = cuts.iter().map(|i| i.index(text.len() + 1)).collect();
        points.push(0);
        points.push(text.len());
        points.sort_unstable();
        let pieces: Vec<&[u8]> = points
            .windows(2)
            .map(|w| &text.as_bytes()[w[0]..w[1]])
            .collect();

        let segmented = pack_doc(|doc| doc.values().append_string(&pieces));
        let contiguous = pack_doc(|doc| doc.values().append(text.as_str()));
        prop_assert_eq!(segmented, contiguous);
    }

    #[test]
    fn prop_integers_round_trip(n in any::<i64>(), u in any::<u32>()) {
        let bytes = pack_doc(|doc| {
            let top = doc.values();
            top.append(n);
            top.append(u);
        });
        prop_assert_eq!(decode(&bytes), vec![Value::Integer(n), Value::Integer(i64::from(u))]);
    }
}
