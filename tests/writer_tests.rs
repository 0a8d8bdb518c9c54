mod common;

use common::{decode, decode_one, pack_doc};
use std::collections::VecDeque;
use std::io::{self, IoSlice, Write};
use std::panic::{catch_unwind, AssertUnwindSafe};
use vbs_writer::{
    vbs, Blob, ContainerState, Decimal64, Dict, Error, Key, List, Null, PackOptions, Raw, Value,
    VbsPacker, Writer,
};

#[test]
fn test_scalar_list_scalar_seals_empty_list() {
    let bytes = pack_doc(|doc| {
        let root = doc.list();
        root.append(1);
        root.append_list();
        root.append(2);
        root.close();
    });

    assert_eq!(bytes, vec![0x02, 0x41, 0x02, 0x01, 0x42, 0x01]);
    assert_eq!(decode_one(&bytes), vbs!([1, [], 2]));
}

#[test]
fn test_closing_root_seals_abandoned_chain() {
    let bytes = pack_doc(|doc| {
        let root = doc.list();
        let child = root.append_list();
        child.append("deep");
        let grandchild = child.append_dict();
        grandchild.append("k", true);
        root.close();
        assert_eq!(child.state(), ContainerState::Closed);
        assert!(!grandchild.is_open());
    });

    assert_eq!(decode_one(&bytes), vbs!([["deep", { "k": true }]]));
    assert_eq!(bytes.iter().rev().take(3).copied().collect::<Vec<_>>(), vec![1, 1, 1]);
}

#[test]
fn test_finish_closes_what_the_caller_left_open() {
    let doc = Writer::new(VbsPacker::new());
    let root = doc.dict();
    let inner = root.append_list("xs");
    inner.append(1);
    assert_eq!(doc.open_containers(), 2);

    let bytes = doc.finish().finish().unwrap();
    assert_eq!(decode_one(&bytes), vbs!({ "xs": [1] }));
}

#[test]
fn test_dict_keeps_insertion_order() {
    let bytes = pack_doc(|doc| {
        let root = doc.dict();
        root.append("zeta", 1);
        root.append("alpha", 2);
        root.append(7, "seven");
        root.append("mid", Null);
        root.close();
    });

    let value = decode_one(&bytes);
    let keys: Vec<Key> = value.as_dict().unwrap().keys().cloned().collect();
    assert_eq!(
        keys,
        vec![Key::from("zeta"), Key::from("alpha"), Key::Integer(7), Key::from("mid")]
    );
}

#[test]
fn test_two_phase_string_matches_single_append() {
    let two_phase = pack_doc(|doc| {
        let root = doc.list();
        root.declare_string_head(5);
        root.append_raw(b"he");
        root.append_raw(b"llo");
        root.close();
    });
    let single = pack_doc(|doc| {
        let root = doc.list();
        root.append("hello");
        root.close();
    });

    assert_eq!(two_phase, single);
}

#[test]
fn test_two_phase_blob_in_dict() {
    let payload = vec![0xAB; 40];
    let two_phase = pack_doc(|doc| {
        let root = doc.dict();
        root.declare_blob_head("data", payload.len());
        root.append_raw(&payload[..10]);
        root.append_raw(&payload[10..]);
        root.close();
    });
    let single = pack_doc(|doc| {
        let root = doc.dict();
        root.append("data", Blob(&payload));
        root.close();
    });

    assert_eq!(two_phase, single);
    assert_eq!(
        decode_one(&single).as_dict().unwrap().get("data"),
        Some(&Value::Blob(payload))
    );
}

#[test]
fn test_head_length_mismatch_is_not_validated() {
    let bytes = pack_doc(|doc| {
        let root = doc.list();
        root.declare_string_head(5);
        root.append_raw(b"he");
        root.close();
    });

    // the TAIL is swallowed as the third payload byte
    assert_eq!(bytes, vec![0x02, 0x25, b'h', b'e', 0x01]);
    assert!(catch_unwind(|| decode(&bytes)).is_err());
}

#[test]
fn test_segmented_sources_match_contiguous() {
    let mut ring = VecDeque::with_capacity(8);
    ring.extend(b"....hello");
    ring.drain(..4);
    ring.extend(b" world");

    let segmented = pack_doc(|doc| {
        let root = doc.list();
        root.append_string(&[IoSlice::new(b"hello"), IoSlice::new(b" world")][..]);
        root.append_string(&ring);
        root.append_blob(&vec![b"ab".to_vec(), b"c".to_vec()]);
        root.close();
    });
    let contiguous = pack_doc(|doc| {
        let root = doc.list();
        root.append("hello world");
        root.append("hello world");
        root.append(Blob(b"abc"));
        root.close();
    });

    assert_eq!(segmented, contiguous);
}

#[test]
fn test_spliced_list_body_matches_replay() {
    let items = List::from(vec![
        Value::from(1),
        Value::from("two"),
        vbs!({ "three": [3.5] }),
    ]);
    let encoded = items.clone().with_encoding();
    assert!(encoded.encoded_body().is_some());

    let replayed = pack_doc(|doc| {
        let root = doc.list();
        for item in &items {
            root.append(item);
        }
        root.close();
    });
    let spliced = pack_doc(|doc| {
        let root = doc.list();
        root.append_all(&encoded);
        root.close();
    });
    let raw = pack_doc(|doc| {
        let root = doc.list();
        root.append_raw(encoded.encoded_body().unwrap());
        root.close();
    });

    assert_eq!(spliced, replayed);
    assert_eq!(raw, replayed);
}

#[test]
fn test_spliced_dict_body_matches_replay() {
    let mut dict = Dict::new();
    dict.insert("a", 1);
    dict.insert(2, vbs!([true, null]));
    let encoded = dict.clone().with_encoding();

    let replayed = pack_doc(|doc| {
        let root = doc.dict();
        for (key, value) in &dict {
            root.append(key, value);
        }
        root.close();
    });
    let spliced = pack_doc(|doc| {
        doc.values().append_dict_from(&encoded);
    });

    assert_eq!(spliced, replayed);
}

#[test]
fn test_from_encoded_rejects_wrong_brackets() {
    assert!(List::from_encoded(vec![], vec![0x02, 0x01]).is_ok());
    assert!(matches!(
        List::from_encoded(vec![], vec![0x03, 0x01]),
        Err(Error::InvalidRaw { .. })
    ));
    assert!(matches!(
        Dict::from_encoded(Default::default(), vec![0x03]),
        Err(Error::InvalidRaw { .. })
    ));
}

#[test]
fn test_formatted_strings() {
    let bytes = pack_doc(|doc| {
        let root = doc.dict();
        root.append_fmt("id", format_args!("{}-{:03}", "node", 7));
        root.append_fmt_with("hex", |w| write!(w, "{:x}", 255)).unwrap();
        root.close();
    });

    assert_eq!(decode_one(&bytes), vbs!({ "id": "node-007", "hex": "ff" }));
}

#[test]
fn test_failing_format_callback_writes_nothing() {
    let bytes = pack_doc(|doc| {
        let root = doc.list();
        let result = root.append_fmt_with(|_| Err(std::fmt::Error));
        assert!(result.is_err());
        root.close();
    });

    assert_eq!(bytes, vec![0x02, 0x01]);
}

#[test]
fn test_numbers_decode_to_their_values() {
    let bytes = pack_doc(|doc| {
        let root = doc.list();
        root.append(i64::MIN);
        root.append(i64::MAX);
        root.append(-1i8);
        root.append(300u16);
        root.append(1.5f64);
        root.append(-0.25f32);
        root.append(f64::INFINITY);
        root.append(1e300);
        root.append(5e-324);
        root.append(Decimal64::new(-1999, -2));
        root.close();
    });

    let value = decode_one(&bytes);
    let items = value.as_list().unwrap().items();
    assert_eq!(items[0], Value::Integer(i64::MIN));
    assert_eq!(items[1], Value::Integer(i64::MAX));
    assert_eq!(items[2], Value::Integer(-1));
    assert_eq!(items[3], Value::Integer(300));
    assert_eq!(items[4], Value::Float(1.5));
    assert_eq!(items[5], Value::Float(-0.25));
    assert_eq!(items[6], Value::Float(f64::INFINITY));
    assert_eq!(items[7], Value::Float(1e300));
    assert_eq!(items[8], Value::Float(5e-324));
    assert_eq!(items[9], Value::Decimal(Decimal64::new(-1999, -2)));
}

#[test]
fn test_top_level_values_have_no_brackets() {
    let bytes = pack_doc(|doc| {
        let top = doc.values();
        top.append(true);
        top.append("x");
        top.append_list().append(1);
        top.append(Null);
    });

    assert_eq!(bytes, vec![0x19, 0x21, b'x', 0x02, 0x41, 0x01, 0x0F]);
    assert_eq!(decode(&bytes).len(), 4);
}

#[test]
fn test_flush_seals_child_without_writing() {
    let doc = Writer::new(VbsPacker::new());
    let root = doc.list();
    let child = root.append_list();
    child.append(1);
    root.flush();

    assert!(!child.is_open());
    assert!(root.is_open());
    assert_eq!(doc.sink().pending(), &[0x02, 0x02, 0x41, 0x01]);
    root.flush();
    assert_eq!(doc.sink().pending().len(), 4);
}

#[test]
fn test_view_aliases_share_state() {
    let doc = Writer::new(VbsPacker::new());
    let root = doc.list();
    let alias = root.clone();
    assert_eq!(root.depth(), 1);

    alias.append(1);
    root.append(2);
    alias.close();
    assert_eq!(root.state(), ContainerState::Closed);

    let bytes = doc.finish().finish().unwrap();
    assert_eq!(bytes, vec![0x02, 0x41, 0x42, 0x01]);
}

#[test]
#[should_panic(expected = "close of a closed container")]
fn test_double_close_panics() {
    let doc = Writer::new(VbsPacker::new());
    let root = doc.list();
    root.close();
    root.close();
}

#[test]
#[should_panic(expected = "write to a closed container")]
fn test_write_after_close_panics() {
    let doc = Writer::new(VbsPacker::new());
    let root = doc.dict();
    root.close();
    root.append("late", 1);
}

#[test]
fn test_double_close_never_emits_second_tail() {
    let doc = Writer::new(VbsPacker::new());
    let root = doc.list();
    root.close();
    let outcome = catch_unwind(AssertUnwindSafe(|| root.close()));
    assert!(outcome.is_err());
    assert_eq!(doc.sink().pending(), &[0x02, 0x01]);
}

#[test]
fn test_dict_pairing_is_not_validated() {
    // a dangling key is the caller's problem; the writer emits it as given
    let bytes = pack_doc(|doc| {
        let root = doc.dict();
        root.append_raw(&[0x21, b'k']);
        root.close();
    });

    assert_eq!(bytes, vec![0x03, 0x21, b'k', 0x01]);
    assert!(catch_unwind(|| decode(&bytes)).is_err());
}

#[test]
fn test_duplicate_keys_are_written_as_given() {
    let bytes = pack_doc(|doc| {
        let root = doc.dict();
        root.append("k", 1);
        root.append("k", 2);
        root.close();
    });

    assert_eq!(bytes, vec![0x03, 0x21, b'k', 0x41, 0x21, b'k', 0x42, 0x01]);
}

#[test]
fn test_raw_marker_splices_verbatim() {
    let bytes = pack_doc(|doc| {
        let root = doc.list();
        root.append(Raw(&[0x41, 0x42]));
        root.close();
    });

    assert_eq!(decode_one(&bytes), vbs!([1, 2]));
}

#[test]
fn test_small_buffer_streams_identical_bytes() {
    let build = |doc: &Writer<VbsPacker<Vec<u8>>>| {
        let root = doc.dict();
        root.append("name", "a fairly long string value");
        let xs = root.append_list("xs");
        for i in 0..50 {
            xs.append(i);
        }
        root.close();
    };

    let doc = Writer::new(VbsPacker::with_options(
        Vec::new(),
        PackOptions::new().with_buffer_size(3),
    ));
    build(&doc);
    let streamed = doc.finish().finish().unwrap();

    assert_eq!(streamed, pack_doc(build));
}

#[test]
fn test_depth_limit_surfaces_on_finish() {
    let doc = Writer::new(VbsPacker::with_options(
        Vec::new(),
        PackOptions::new().with_max_depth(2),
    ));
    let a = doc.list();
    let b = a.append_list();
    b.append_list();

    let err = doc.finish().finish().unwrap_err();
    assert_eq!(err, Error::DepthExceeded { depth: 3, max: 2 });
}

fn pack_with_max_depth(
    max_depth: usize,
    build: impl FnOnce(&Writer<VbsPacker>),
) -> Result<Vec<u8>, Error> {
    let doc = Writer::new(VbsPacker::with_options(
        Vec::new(),
        PackOptions::new().with_max_depth(max_depth),
    ));
    build(&doc);
    doc.finish().finish()
}

#[test]
fn test_spliced_list_counts_toward_depth_limit() {
    let plain = vbs!([[[[1]]]]).as_list().unwrap().clone();
    let encoded = plain.clone().with_encoding();
    let too_deep = Err(Error::DepthExceeded { depth: 3, max: 2 });

    for list in [&plain, &encoded] {
        assert_eq!(
            pack_with_max_depth(2, |doc| {
                doc.values().append_list_from(list);
            }),
            too_deep
        );
        assert_eq!(pack_with_max_depth(2, |doc| doc.values().append(list)), too_deep);
    }

    let replayed = pack_with_max_depth(4, |doc| {
        doc.values().append_list_from(&plain);
    });
    let spliced = pack_with_max_depth(4, |doc| {
        doc.values().append_list_from(&encoded);
    });
    assert!(replayed.is_ok());
    assert_eq!(spliced, replayed);
}

#[test]
fn test_spliced_dict_counts_toward_depth_limit() {
    let plain = vbs!({ "a": { "b": [1, "[\u{2}\u{2}]"] } }).as_dict().unwrap().clone();
    let encoded = plain.clone().with_encoding();

    for dict in [&plain, &encoded] {
        assert_eq!(
            pack_with_max_depth(2, |doc| {
                doc.values().append_dict_from(dict);
            }),
            Err(Error::DepthExceeded { depth: 3, max: 2 })
        );
        // LIST bytes inside the string payload are not containers
        assert!(pack_with_max_depth(3, |doc| doc.values().append(dict)).is_ok());
    }
}

struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_io_failure_is_reported_once_at_finish() {
    let doc = Writer::new(VbsPacker::with_options(
        FailingWriter,
        PackOptions::new().with_buffer_size(1),
    ));
    let root = doc.list();
    for i in 0..10 {
        root.append(i);
    }
    root.close();
    assert!(doc.sink().error().is_some());

    match doc.finish().finish() {
        Err(Error::Io(msg)) => assert!(msg.contains("disk full")),
        Err(other) => panic!("unexpected error {other:?}"),
        Ok(_) => panic!("expected an I/O error"),
    }
}
