//! Property tests: framing does not depend on where the chunks are split.

use completer_openai::stream::{CompletionEvent, Framer, classify};
use proptest::prelude::*;

fn arb_object() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,!?]{0,12}".prop_map(|text| {
        serde_json::json!({ "choices": [{ "text": text, "index": 0 }] }).to_string()
    })
}

/// Anything but braces: SSE prefixes, blank lines, `[DONE]`.
fn arb_filler() -> impl Strategy<Value = String> {
    "(data: |\n|\r|\\[DONE\\]| |:|x){0,6}"
}

fn arb_stream() -> impl Strategy<Value = (Vec<String>, Vec<u8>)> {
    proptest::collection::vec((arb_filler(), arb_object()), 0..8).prop_flat_map(|parts| {
        arb_filler().prop_map(move |tail| {
            let objects: Vec<String> = parts.iter().map(|(_, obj)| obj.clone()).collect();
            let mut wire = String::new();
            for (filler, obj) in &parts {
                wire.push_str(filler);
                wire.push_str(obj);
            }
            wire.push_str(&tail);
            (objects, wire.into_bytes())
        })
    })
}

fn split_at(wire: &[u8], mut cuts: Vec<usize>) -> Vec<&[u8]> {
    cuts.iter_mut().for_each(|cut| *cut %= wire.len() + 1);
    cuts.sort_unstable();
    cuts.dedup();

    let mut chunks = Vec::new();
    let mut from = 0;
    for cut in cuts {
        chunks.push(&wire[from..cut]);
        from = cut;
    }
    chunks.push(&wire[from..]);
    chunks
}

proptest! {
    #[test]
    fn frames_are_independent_of_chunk_boundaries(
        (objects, wire) in arb_stream(),
        cuts in proptest::collection::vec(any::<usize>(), 0..12),
    ) {
        let mut framer = Framer::new();
        let mut frames = Vec::new();
        for chunk in split_at(&wire, cuts) {
            framer.push(chunk, &mut frames).unwrap();
        }

        prop_assert_eq!(framer.depth(), 0);
        prop_assert_eq!(frames.len(), objects.len());
        for (frame, object) in frames.iter().zip(&objects) {
            prop_assert_eq!(frame.as_bytes(), object.as_bytes());
            let is_token = matches!(classify(frame.as_bytes()), CompletionEvent::Token { .. });
            prop_assert!(is_token);
        }
    }

    #[test]
    fn single_byte_chunks_match_one_shot(
        (objects, wire) in arb_stream(),
    ) {
        let mut framer = Framer::new();
        let mut frames = Vec::new();
        for byte in wire.chunks(1) {
            framer.push(byte, &mut frames).unwrap();
        }

        let framed: Vec<&[u8]> = frames.iter().map(|f| f.as_bytes()).collect();
        let expected: Vec<&[u8]> = objects.iter().map(|o| o.as_bytes()).collect();
        prop_assert_eq!(framed, expected);
    }
}
