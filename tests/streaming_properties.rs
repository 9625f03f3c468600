//! Property tests for the streaming contract.
//!
//! Records are generated as field lists, encoded with quoting where needed,
//! and fed in arbitrary chunks. Every chunking must yield the generated
//! records back.

use proptest::prelude::*;
use spp::{ParseOutcome, ParserConfig, RecordParser};

type Record = Vec<Vec<u8>>;

/// Encode one record in the default dialect. Fields containing any special
/// byte are quoted, with quote and escape bytes escaped.
fn encode(record: &Record, config: &ParserConfig, out: &mut Vec<u8>) {
    for (i, field) in record.iter().enumerate() {
        if i > 0 {
            out.push(config.delimiter);
        }
        let special = [config.delimiter, config.quote, config.escape, config.terminator];
        if field.iter().any(|b| special.contains(b)) {
            out.push(config.quote);
            for &b in field {
                if b == config.quote || b == config.escape {
                    out.push(config.escape);
                }
                out.push(b);
            }
            out.push(config.quote);
        } else {
            out.extend_from_slice(field);
        }
    }
    out.push(config.terminator);
}

fn parse_all(parser: &mut RecordParser) -> Vec<Record> {
    let mut records = Vec::new();
    while let Some(record) = parser.parse_record().unwrap() {
        records.push(record);
    }
    records
}

/// Feed `input` split at `cuts` (sorted, deduplicated by the caller),
/// parsing after every chunk.
fn parse_chunked(input: &[u8], cuts: &[usize]) -> Vec<Record> {
    let mut parser = RecordParser::new();
    let mut records = Vec::new();
    let mut start = 0;
    for &cut in cuts.iter().chain(std::iter::once(&input.len())) {
        parser.feed(&input[start..cut]).unwrap();
        records.extend(parse_all(&mut parser));
        start = cut;
    }
    records
}

fn field() -> impl Strategy<Value = Vec<u8>> {
    // Bias towards the interesting bytes
    let byte = prop_oneof![
        4 => b'a'..=b'z',
        1 => Just(b','),
        1 => Just(b'"'),
        1 => Just(b'\\'),
        1 => Just(b'\n'),
        1 => any::<u8>(),
    ];
    prop::collection::vec(byte, 0..8)
}

fn records() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(prop::collection::vec(field(), 1..5), 1..6)
}

fn encoded_with_cuts() -> impl Strategy<Value = (Vec<Record>, Vec<u8>, Vec<usize>)> {
    records().prop_flat_map(|records| {
        let config = ParserConfig::default();
        let mut input = Vec::new();
        for record in &records {
            encode(record, &config, &mut input);
        }
        let len = input.len();
        let cuts = prop::collection::vec(0..=len, 0..8).prop_map(|mut cuts| {
            cuts.sort_unstable();
            cuts.dedup();
            cuts
        });
        (Just(records), Just(input), cuts)
    })
}

proptest! {
    #[test]
    fn prop_chunking_does_not_change_records((records, input, cuts) in encoded_with_cuts()) {
        prop_assert_eq!(parse_chunked(&input, &[]), records.clone());
        prop_assert_eq!(parse_chunked(&input, &cuts), records);
    }

    #[test]
    fn prop_clear_then_fresh_record_always_parses(
        garbage in prop::collection::vec(any::<u8>(), 0..32),
        record in prop::collection::vec(field(), 1..5),
    ) {
        let config = ParserConfig::default();
        let mut parser = RecordParser::new();
        parser.feed(&garbage).unwrap();
        // Whatever the garbage did (complete, unfinished, error), drain it
        while let Ok(Some(_)) = parser.parse_record() {}
        parser.clear();
        prop_assert!(!parser.has_partial());

        let mut input = Vec::new();
        encode(&record, &config, &mut input);
        parser.feed(&input).unwrap();
        prop_assert_eq!(parser.parse_record().unwrap(), Some(record));
    }

    #[test]
    fn prop_complete_is_never_replayed(records in records()) {
        let config = ParserConfig::default();
        let mut input = Vec::new();
        for record in &records {
            encode(record, &config, &mut input);
        }
        let mut parser = RecordParser::new();
        parser.feed(&input).unwrap();

        let mut seen = 0;
        loop {
            match parser.parse(&mut spp::Discard).unwrap() {
                ParseOutcome::Complete { .. } => seen += 1,
                ParseOutcome::Unfinished => break,
            }
        }
        prop_assert_eq!(seen, records.len());
        prop_assert_eq!(parser.parse(&mut spp::Discard).unwrap(), ParseOutcome::Unfinished);
        prop_assert!(!parser.has_partial());
    }
}
