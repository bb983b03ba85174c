#![no_main]

use arbitrary::Arbitrary;
use gstindex::tree::SuffixTree;
use gstindex::Error;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    texts: Vec<(u8, String)>,
    pattern: String,
}

fuzz_target!(|input: Input| {
    // Arbitrary texts mostly violate the terminator rules; those must be
    // rejected cleanly and every accepted text must keep the tree valid
    let mut tree = SuffixTree::generalized();
    let mut accepted: Vec<String> = Vec::new();

    for (unit, text) in input.texts.iter().take(8) {
        match tree.insert(*unit as u32, text) {
            Ok(_) => accepted.push(text.clone()),
            Err(Error::MalformedInput { .. }) => {}
            Err(other) => panic!("unexpected error: {}", other),
        }
        tree.check_invariants().expect("invariants hold after insertion");
    }

    if accepted.is_empty() {
        return;
    }
    let expected = accepted.iter().any(|t| t.contains(input.pattern.as_str()));
    assert_eq!(tree.contains(&input.pattern).unwrap(), expected);
    assert_eq!(tree.occurrence_count(), tree.global_position());
});
