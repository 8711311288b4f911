use eventsync_common::{EventMeta, EventRecord, NewEvent};
use proptest::prelude::*;
use serde_json::Value;

fn any_meta() -> impl Strategy<Value = Option<EventMeta>> {
    proptest::option::of(proptest::collection::btree_map(
        "[a-z]{1,8}",
        prop_oneof![
            any::<i64>().prop_map(Value::from),
            any::<bool>().prop_map(Value::from),
            any::<f64>().prop_filter("JSON has no NaN or infinity", |f| f.is_finite())
                .prop_map(Value::from),
            ".*".prop_map(Value::from),
        ],
        0..4,
    ))
    .prop_map(|maybe| maybe.map(|entries| entries.into_iter().collect::<EventMeta>()))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn any_event_encodes_to_exactly_one_line(
        project in ".*",
        agent in ".*",
        status in ".*",
        message in ".*",
        artifact in proptest::option::of(".*"),
        meta in any_meta(),
    ) {
        let mut event = NewEvent::new(project, agent, status, message);
        event.artifact = artifact.clone();
        event.meta = meta.clone();
        let record = EventRecord::stamp(event);

        let line = record.to_line().expect("record should encode");
        prop_assert!(!line.contains('\n'));
        prop_assert!(!line.contains('\r'));

        let parsed: Value = serde_json::from_str(&line).expect("line should be valid JSON");
        let object = parsed.as_object().expect("line should be a JSON object");
        prop_assert_eq!(object.contains_key("artifact"), artifact.is_some());
        prop_assert_eq!(object.contains_key("meta"), meta.is_some());

        let decoded = EventRecord::from_line(&line).expect("line should decode");
        prop_assert_eq!(decoded, record);
    }
}
