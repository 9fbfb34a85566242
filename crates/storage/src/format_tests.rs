// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn sample() -> Event {
    Event::new(3, 7, 1500)
        .with_dur(250)
        .with_state(EventState::Continued)
        .with_payload(Payload::Tuple(vec![0.5, -1.25]))
        .with_prob(0.75)
        .with_glue(42)
}

#[test]
fn v1_binary_record_layout() {
    let mut out = Vec::new();
    encode_binary(&sample(), SinkVersion::V1, &mut out).unwrap();

    assert_eq!(out.len(), V1_HEADER_LEN + 8);
    assert_eq!(&out[0..4], &3u32.to_le_bytes());
    assert_eq!(&out[4..8], &7u32.to_le_bytes());
    assert_eq!(&out[8..12], &1500u32.to_le_bytes());
    assert_eq!(&out[12..16], &250u32.to_le_bytes());
    assert_eq!(out[16], 1);
    assert_eq!(out[17], PayloadKind::Tuple.as_u8());
    assert_eq!(&out[18..22], &8u32.to_le_bytes());
    assert_eq!(&out[22..26], &0.5f32.to_le_bytes());
}

#[test]
fn v2_binary_record_adds_glue_prob_and_checksum() {
    let mut out = Vec::new();
    encode_binary(&sample(), SinkVersion::V2, &mut out).unwrap();

    assert_eq!(out.len(), V2_HEADER_LEN + 8 + 4);
    assert_eq!(&out[18..22], &42u32.to_le_bytes());
    assert_eq!(&out[22..26], &0.75f32.to_le_bytes());
    let body = out.len() - 4;
    assert_eq!(&out[body..], &crc32fast::hash(&out[..body]).to_le_bytes());
}

#[parameterized(
    v1 = { SinkVersion::V1 },
    v2 = { SinkVersion::V2 },
)]
fn binary_records_decode_in_sequence(version: SinkVersion) {
    let first = sample();
    let second = Event::new(1, 2, 0).with_payload(Payload::String("hello".to_string()));
    let mut out = Vec::new();
    encode_binary(&first, version, &mut out).unwrap();
    encode_binary(&second, version, &mut out).unwrap();

    let mut input = out.as_slice();
    let a = decode_binary(&mut input, version, 0).unwrap().unwrap();
    let b = decode_binary(&mut input, version, 1).unwrap().unwrap();
    assert!(decode_binary(&mut input, version, 2).unwrap().is_none());

    assert_eq!(b, second);
    assert_eq!(a.payload, first.payload);
    assert_eq!(a.time, first.time);
    if version == SinkVersion::V2 {
        assert_eq!(a, first);
    } else {
        // V1 has no room for these
        assert_eq!(a.glue_id, None);
        assert_eq!(a.prob, 1.0);
    }
}

#[test]
fn truncated_binary_record_is_corrupted() {
    let mut out = Vec::new();
    encode_binary(&sample(), SinkVersion::V2, &mut out).unwrap();
    out.truncate(out.len() - 6);

    let err = decode_binary(&mut out.as_slice(), SinkVersion::V2, 4).unwrap_err();
    assert!(matches!(err, SinkError::Corrupted { record: 4, .. }));
}

#[test]
fn flipped_byte_fails_checksum() {
    let mut out = Vec::new();
    encode_binary(&sample(), SinkVersion::V2, &mut out).unwrap();
    out[9] ^= 0x01;

    let err = decode_binary(&mut out.as_slice(), SinkVersion::V2, 0).unwrap_err();
    assert!(matches!(err, SinkError::ChecksumMismatch { record: 0 }));
}

#[parameterized(
    time = { Event::new(1, 1, u64::from(u32::MAX) + 1), "time" },
    dur = { Event::new(1, 1, 0).with_dur(1 << 40), "dur" },
    glue = { Event::new(1, 1, 0).with_glue(u32::MAX), "glue id" },
)]
fn oversized_fields_are_rejected(event: Event, expected: &str) {
    for version in [SinkVersion::V1, SinkVersion::V2] {
        if expected == "glue id" && version == SinkVersion::V1 {
            continue;
        }
        let err = encode_binary(&event, version, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, SinkError::FieldOverflow { field, .. } if field == expected));
        let err = encode_ascii(&event, version).unwrap_err();
        assert!(matches!(err, SinkError::FieldOverflow { field, .. } if field == expected));
    }
}

#[parameterized(
    empty = { Payload::Empty, "" },
    string = { Payload::String("say \"hi\"\tthere".to_string()), r#""say \"hi\"\tthere""# },
    tuple = { Payload::Tuple(vec![1.0, 0.5, -3.25]), "1 0.5 -3.25" },
    map = { Payload::Map(vec![(4, 0.25), (9, 0.75)]), "4=0.25 9=0.75" },
)]
fn ascii_payload_text(payload: Payload, text: &str) {
    let event = Event::new(1, 2, 3).with_payload(payload.clone());
    let line = encode_ascii(&event, SinkVersion::V1).unwrap();
    assert_eq!(line, format!("1\t2\t3\t0\tcompleted\t{}\t{}", payload.kind().name(), text));
    assert_eq!(decode_ascii(&line, SinkVersion::V1, 0).unwrap(), event);
}

#[test]
fn v2_ascii_line_carries_glue_and_prob() {
    let line = encode_ascii(&sample(), SinkVersion::V2).unwrap();
    assert_eq!(line, "3\t7\t1500\t250\tcontinued\ttuple\t42\t0.75\t0.5 -1.25");
    assert_eq!(decode_ascii(&line, SinkVersion::V2, 0).unwrap(), sample());

    let unglued = Event::new(1, 1, 1);
    let line = encode_ascii(&unglued, SinkVersion::V2).unwrap();
    assert_eq!(line, "1\t1\t1\t0\tcompleted\tempty\t-\t1\t");
    assert_eq!(decode_ascii(&line, SinkVersion::V2, 0).unwrap(), unglued);
}

#[test]
fn ascii_floats_keep_their_bits() {
    let quiet = f32::from_bits(0xffc0_0001);
    let signalling = f32::from_bits(0x7f80_0001);
    let values = vec![
        quiet,
        signalling,
        f32::INFINITY,
        f32::NEG_INFINITY,
        -0.0,
        f32::MIN_POSITIVE,
    ];
    let event = Event::new(1, 2, 3)
        .with_prob(f32::from_bits(0x7fc0_0abc))
        .with_payload(Payload::Tuple(values.clone()));

    let line = encode_ascii(&event, SinkVersion::V2).unwrap();
    assert!(line.contains("\t0xffc00001 0x7f800001 inf -inf -0 "));
    let read = decode_ascii(&line, SinkVersion::V2, 0).unwrap();
    assert_eq!(read.prob.to_bits(), 0x7fc0_0abc);
    assert_eq!(read.payload.to_bytes(), event.payload.to_bytes());

    let map = Event::new(1, 2, 3).with_payload(Payload::Map(vec![(5, quiet)]));
    let line = encode_ascii(&map, SinkVersion::V1).unwrap();
    assert!(line.ends_with("\t5=0xffc00001"));
    let read = decode_ascii(&line, SinkVersion::V1, 0).unwrap();
    assert_eq!(read.payload.to_bytes(), map.payload.to_bytes());
}

#[parameterized(
    too_few_fields = { "1\t2\t3" },
    bad_number = { "x\t2\t3\t0\tcompleted\tempty\t" },
    bad_state = { "1\t2\t3\t0\tdone\tempty\t" },
    bad_type = { "1\t2\t3\t0\tcompleted\tblob\t" },
    bad_map = { "1\t2\t3\t0\tcompleted\tmap\t4:0.5" },
    bad_bits = { "1\t2\t3\t0\tcompleted\ttuple\t0xnope" },
)]
fn malformed_ascii_lines_are_corrupted(line: &str) {
    let err = decode_ascii(line, SinkVersion::V1, 12).unwrap_err();
    assert!(matches!(err, SinkError::Corrupted { record: 12, .. }));
}

#[test]
fn ascii_header_names_version() {
    assert_eq!(ascii_header(SinkVersion::V2), "#evboard ascii v2");
    assert!(matches!(
        parse_ascii_header("#evboard ascii v1\n"),
        Some(Ok(SinkVersion::V1))
    ));
    assert!(matches!(
        parse_ascii_header("#evboard ascii v9"),
        Some(Err(SinkError::UnsupportedVersion(9)))
    ));
    assert!(parse_ascii_header("sender\tevent").is_none());
}

#[test]
fn format_names_parse() {
    assert_eq!("ASCII".parse::<SinkFormat>().unwrap(), SinkFormat::Ascii);
    assert_eq!("binary".parse::<SinkFormat>().unwrap(), SinkFormat::Binary);
    assert!("xml".parse::<SinkFormat>().is_err());
    assert_eq!(SinkVersion::default(), SinkVersion::V2);
}
