use lazystream::{Break, ErrorHandler, Ignore, Policy, Settle, Stream, StreamError};
use std::cell::Cell;
use std::error::Error;

#[derive(Debug, thiserror::Error)]
#[error("sensor {0} offline")]
struct SensorOffline(u32);

#[test]
fn test_break_aborts_with_operation_context() {
    let error = Stream::new(vec![1, 2, 3, 4])
        .try_map(|x| if x == 3 { Err(format!("bad {}", x)) } else { Ok(x) })
        .collect()
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Error occurred while performing map on 3 at index 2 in iterator: bad 3"
    );
    assert_eq!(error.operation(), Some("map"));
}

#[test]
fn test_break_stops_pulling() {
    let pulled = Cell::new(0);
    let result = Stream::new(1..)
        .inspect(|_| pulled.set(pulled.get() + 1))
        .try_filter(|x| if *x == 2 { Err("stop") } else { Ok(true) })
        .collect();
    assert!(result.is_err());
    assert_eq!(pulled.get(), 2);
}

#[test]
fn test_item_is_rendered_as_passed_to_the_failing_operation() {
    let error = Stream::new(vec!["a", "b"])
        .map(|s| s.to_uppercase())
        .try_filter(|s| if s == "B" { Err("nope") } else { Ok(true) })
        .collect()
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Error occurred while performing filter on \"B\" at index 1 in iterator: nope"
    );
}

#[test]
fn test_index_counts_filtered_pulls() {
    let error = Stream::new(1..=6)
        .filter(|x| x % 2 == 0)
        .try_map(|x| if x == 4 { Err("four") } else { Ok(x) })
        .collect()
        .unwrap_err();
    assert_eq!(error.index(), 3);
}

#[test]
fn test_cycle_error_message_and_source() {
    let error = Stream::try_new(vec![Ok(1), Err(SensorOffline(7))])
        .collect()
        .unwrap_err();
    assert!(error.is_cycle());
    assert_eq!(
        error.to_string(),
        "Error occurred at item at index 1 in iterator: sensor 7 offline"
    );
    assert_eq!(error.source().unwrap().to_string(), "sensor 7 offline");
    assert!(error.cause().downcast_ref::<SensorOffline>().is_some());
}

#[test]
fn test_ignore_drops_failing_items() {
    let data = Stream::with_handler(vec!["1", "two", "3"], Ignore)
        .try_map(|s| s.parse::<i32>())
        .collect();
    assert_eq!(data, vec![1, 3]);
}

#[test]
fn test_ignore_continues_after_cycle_errors() {
    let data = Stream::try_with_handler(vec![Ok(1), Err("gone"), Ok(3)], Ignore)
        .map(|x| x * 2)
        .collect();
    assert_eq!(data, vec![2, 6]);
}

#[test]
fn test_settle_reports_errors_with_data() {
    let settled = Stream::with_handler(vec![1, 2, 3, 4, 5], Settle::new())
        .try_map(|x| if x % 2 == 0 { Err("even") } else { Ok(x) })
        .collect();
    assert_eq!(settled.data, vec![1, 3, 5]);
    let indexes: Vec<_> = settled.errors.iter().map(StreamError::index).collect();
    assert_eq!(indexes, vec![1, 3]);
    assert!(!settled.is_clean());
}

#[test]
fn test_settle_handler_is_shared_by_the_chain() {
    let settle = Settle::new();
    let _ = Stream::try_with_handler(vec![Err("lost"), Ok(2)], settle.clone())
        .take(2)
        .try_inspect(|_| Err("inspect failed"))
        .count();
    assert_eq!(settle.len(), 2);
    let errors = settle.errors();
    assert!(errors[0].is_cycle());
    assert_eq!(errors[1].operation(), Some("inspect"));
}

#[test]
fn test_settled_into_result() {
    let clean = Stream::with_handler(vec![1, 2], Settle::new()).collect();
    assert_eq!(clean.into_result().unwrap(), vec![1, 2]);

    let dirty = Stream::try_with_handler(vec![Err("x"), Ok(1)], Settle::new()).collect();
    let (data, errors) = dirty.into_parts();
    assert_eq!(data, vec![1]);
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_short_circuit_finalizers_route_errors() {
    let mut stream = Stream::with_handler(1..=9, Settle::new())
        .try_map(|x| if x == 2 { Err("two") } else { Ok(x) });
    let found = stream.any(|x| *x == 4);
    assert!(found.data);
    assert_eq!(found.errors.len(), 1);
    assert_eq!(stream.collect().data, vec![5, 6, 7, 8, 9]);
}

#[test]
fn test_policy_tags_and_serde() {
    assert_eq!(Break.policy(), Policy::Break);
    assert_eq!(Ignore.policy(), Policy::Ignore);
    assert_eq!(serde_json::to_string(&Policy::Settle).unwrap(), "\"settle\"");
    let parsed: Policy = serde_json::from_str("\"ignore\"").unwrap();
    assert_eq!(parsed, Policy::Ignore);
    assert!(serde_json::from_str::<Policy>("\"retry\"").is_err());
}
