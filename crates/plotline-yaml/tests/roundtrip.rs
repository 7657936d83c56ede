//! Full pipeline: recorder → YAML file sink → decoder.

use plotline_core::{
    CompactorConfig, ManualClock, Recorder, RecorderConfig, Snapshot, Stamp, Value,
};
use plotline_yaml::{FileSink, TimeFormat, decode_series, encode_series};

fn snapshot(pairs: &[(&str, f64)]) -> Snapshot {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), Value::Float(*v)))
        .collect()
}

#[test]
fn recorded_session_survives_the_wire() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("session.yaml");

    let sink = FileSink::open(&path, TimeFormat::Seconds).expect("open sink");
    let mut recorder = Recorder::new(
        &CompactorConfig::default(),
        ManualClock::starting_at(0.0),
        sink,
    );

    recorder.observe_at(0.0, &snapshot(&[("load", 0.2)])).expect("tick");
    recorder.observe_at(0.4, &snapshot(&[("load", 0.2)])).expect("tick");
    recorder.observe_at(0.9, &snapshot(&[("load", 0.7)])).expect("tick");
    recorder.observe_at(2.5, &snapshot(&[("load", 0.7)])).expect("tick");

    let text = std::fs::read_to_string(&path).expect("read back");
    let records = decode_series(&text).expect("decode");

    // keepalive, anchor@0.4, current@0.9, forced full@2.5
    assert_eq!(records.len(), 4);
    assert!(records[0].is_keepalive());
    assert_eq!(records[1].stamp, Stamp::Time(0.4));
    assert_eq!(records[1].fields.get("load"), Some(&Value::Float(0.2)));
    assert_eq!(records[2].stamp, Stamp::Time(0.9));
    assert_eq!(records[2].fields.get("load"), Some(&Value::Float(0.7)));
    assert_eq!(records[3].stamp, Stamp::Time(2.5));
    assert_eq!(records[3].fields.get("load"), Some(&Value::Float(0.7)));

    // Stamps never run backwards on the wire.
    for pair in records.windows(2) {
        assert!(pair[0].stamp.start() <= pair[1].stamp.start());
    }
}

#[test]
fn iso8601_series_round_trips_to_the_same_stamps() {
    let records = vec![
        plotline_core::Record::at(0.0),
        plotline_core::Record::at(1.33).with("a", 1.3),
        plotline_core::Record::over(2.0, 3.5).with("count", 4_i64),
    ];

    let yaml = encode_series(&records, TimeFormat::Iso8601).expect("encode");
    let back = decode_series(&yaml).expect("decode");

    assert_eq!(back.len(), records.len());
    for (original, decoded) in records.iter().zip(&back) {
        let (a, b) = (original.stamp.start(), decoded.stamp.start());
        assert!((a - b).abs() < 1e-3, "stamp drifted: {a} vs {b}");
        assert_eq!(original.fields, decoded.fields);
    }
}

#[test]
fn configured_time_format_drives_the_sink() {
    let config = RecorderConfig::default();
    let format = TimeFormat::from_config(&config.output.timestamps).expect("default is valid");
    assert_eq!(format, TimeFormat::Seconds);
}
