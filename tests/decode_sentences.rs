use aisfix::{
    ais::{decode_payload, DecodedMessage, MessageOutcome, NavigationalStatus},
    fixes::AisClass,
    nmea::{
        parse_line,
        reassembly::IncompleteReason,
        FragmentReassembler, ReassemblyParams,
    },
    pipeline::{AisMessageStream, FixStream, ProgressExt},
};

mod common;
use common::{assert_position_close, nmea_line, tagged_line};

const WERRA_PARTS: [&str; 3] = [
    "57PBtv01sb5IH`PR221LE986",
    "222222222222220l28?554000",
    ":kQEhhDm31H20DPSmD`880",
];

fn werra_fragment(index: usize, seq: u8) -> String {
    let fill = if index == 3 { 2 } else { 0 };
    nmea_line(&format!(
        "AIVDM,3,{index},{seq},A,{},{fill}",
        WERRA_PARTS[index - 1]
    ))
}

#[test]
fn test_reference_position_report() {
    let line = "\\s:rEV02,c:1334337326*5A\\!AIVDM,1,1,,B,18JSad001i5gcaArTICimQTT068t,0*4A";
    let fixes: Vec<_> = FixStream::new([line].into_iter(), ReassemblyParams::default())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(fixes.len(), 1);

    let fix = &fixes[0];
    assert_eq!(fix.mmsi, Some(564_718_000));
    assert_position_close(fix, -9.491921666666666, 80.32134666666667);
    assert_eq!(fix.time, 1_334_337_326_000);
    assert_eq!(fix.speed_over_ground, Some(11.3));
    assert_eq!(fix.course_over_ground, Some(47.0));
    assert_eq!(fix.heading, Some(50));
    assert_eq!(
        fix.navigational_status,
        Some(NavigationalStatus::UnderWayUsingEngine)
    );
    assert_eq!(fix.ais_class, AisClass::A);
}

#[test]
fn test_three_fragment_reassembly() {
    let mut reassembler = FragmentReassembler::default();
    let mut completed = Vec::new();
    for index in 1..=3 {
        let sentence = parse_line(&werra_fragment(index, 5)).unwrap().unwrap();
        completed.extend(reassembler.push(sentence, 1_000));
    }
    assert_eq!(completed.len(), 1);
    let payload = &completed[0];
    assert_eq!(payload.fragments, 3);
    assert_eq!(payload.fill_bits, 2);
    assert_eq!(payload.payload, WERRA_PARTS.concat());
    assert_eq!(reassembler.pending(), 0);

    let MessageOutcome::Decoded(DecodedMessage::ShipStaticData(data)) =
        decode_payload(&payload.payload, payload.fill_bits).unwrap()
    else {
        panic!("expected ship static data");
    };
    assert_eq!(data.mmsi, 503_627_000);
    assert_eq!(data.name, "WERRA");
    assert_eq!(data.callsign, "VJHH");
    assert_eq!(data.destination, "NEWCASTLE HARBOUR");
}

#[test]
fn test_omitted_fragment_is_reported() {
    let mut reassembler = FragmentReassembler::default();
    for index in [1, 3] {
        let sentence = parse_line(&werra_fragment(index, 2)).unwrap().unwrap();
        assert!(reassembler.push(sentence, 0).is_none());
    }
    let incomplete = reassembler.take_incomplete();
    assert_eq!(incomplete.len(), 1);
    assert_eq!(incomplete[0].reason, IncompleteReason::OutOfOrder);
    assert_eq!(incomplete[0].received, 1);
    assert_eq!(incomplete[0].expected, 3);
    assert_eq!(reassembler.stats().dropped_fragments, 1);
}

#[test]
fn test_stale_group_is_evicted() {
    let params = ReassemblyParams::builder()
        .retention_ms(10_000)
        .build()
        .unwrap();
    let mut reassembler = FragmentReassembler::new(params);
    let first = parse_line(&werra_fragment(1, 1)).unwrap().unwrap();
    assert!(reassembler.push(first, 0).is_none());
    assert_eq!(reassembler.pending(), 1);

    reassembler.evict_stale(10_001);
    assert_eq!(reassembler.pending(), 0);
    let incomplete = reassembler.take_incomplete();
    assert_eq!(incomplete[0].reason, IncompleteReason::Expired);

    // the late remainder cannot complete anything
    for index in [2, 3] {
        let sentence = parse_line(&werra_fragment(index, 1)).unwrap().unwrap();
        assert!(reassembler.push(sentence, 10_002).is_none());
    }
    assert_eq!(reassembler.stats().completed, 0);
}

#[test]
fn test_interleaved_channels() {
    let lines = [
        werra_fragment(1, 7),
        nmea_line("AIVDM,1,1,,B,B7P?n900Irg8IHL4RblF?wRToP06,0"),
        werra_fragment(2, 7),
        werra_fragment(3, 7),
    ];
    let mut stream =
        AisMessageStream::with_clock(lines.iter(), ReassemblyParams::default(), || 42);
    let types: Vec<u8> = stream
        .by_ref()
        .map(|m| m.unwrap().message.message_type())
        .collect();
    assert_eq!(types, vec![18, 5]);
    let stats = stream.stats();
    assert_eq!(stats.reassembly.completed, 1);
    assert_eq!(stats.reassembly.passed_through, 1);
    assert_eq!(stats.reassembly.incomplete_groups, 0);
}

#[test]
fn test_tag_block_time_units() {
    let body = "AIVDM,1,1,,B,18JSad001i5gcaArTICimQTT068t,0";
    let seconds = tagged_line("s:MSQ - Mt Cootha,c:1426803365", body);
    let millis = tagged_line("c:1426803365123,s:MSQ - Mt Cootha", body);

    let seconds = parse_line(&seconds).unwrap().unwrap();
    assert_eq!(seconds.time(), Some(1_426_803_365_000));
    assert_eq!(seconds.source(), Some("MSQ - Mt Cootha"));

    let millis = parse_line(&millis).unwrap().unwrap();
    assert_eq!(millis.time(), Some(1_426_803_365_123));
}

#[test]
fn test_progress_sampling_counts_lines() {
    let lines: Vec<String> = (0..25)
        .map(|_| nmea_line("AIVDM,1,1,,B,18JSad001i5gcaArTICimQTT068t,0"))
        .collect();
    let mut sampled = lines.iter().log_progress("lines", 10);
    let fixes = FixStream::with_clock(sampled.by_ref(), ReassemblyParams::default(), || 0)
        .filter(Result::is_ok)
        .count();
    assert_eq!(fixes, 25);
    assert_eq!(sampled.seen(), 25);
}
