use lazystream::{OperationKind, Policy, Settle, Stream};
use std::cell::RefCell;

#[test]
fn test_borrowed_source_is_left_intact() {
    let items = vec![1, 2, 3];
    let doubled = Stream::new(&items).map(|x| x * 2).collect().unwrap();
    assert_eq!(doubled, vec![2, 4, 6]);
    assert_eq!(items, vec![1, 2, 3]);
}

#[test]
fn test_nothing_runs_without_a_finalizer() {
    let calls = RefCell::new(0);
    let stream = Stream::new(1..=3)
        .map(|x| {
            *calls.borrow_mut() += 1;
            x
        })
        .filter(|_| true);
    assert_eq!(stream.pending_operations(), &[OperationKind::Map, OperationKind::Filter]);
    assert_eq!(*calls.borrow(), 0);
    drop(stream);
    assert_eq!(*calls.borrow(), 0);
}

#[test]
fn test_each_item_runs_the_whole_queue_before_the_next_pull() {
    let log = RefCell::new(Vec::new());
    Stream::new(vec![1, 2])
        .inspect(|x| log.borrow_mut().push(format!("pull {}", x)))
        .map(|x| x + 10)
        .inspect(|x| log.borrow_mut().push(format!("out {}", x)))
        .collect()
        .unwrap();
    assert_eq!(*log.borrow(), vec!["pull 1", "out 11", "pull 2", "out 12"]);
}

#[test]
fn test_filter_map_changes_item_type() {
    let numbers = Stream::new(vec!["4", "x", "16"])
        .filter_map(|s| s.parse::<u32>().ok())
        .collect()
        .unwrap();
    assert_eq!(numbers, vec![4, 16]);
}

#[test]
fn test_read_resumes_where_it_stopped() {
    let mut stream = Stream::new(1..=5).map(|x| x * 10);
    let head: Vec<_> = stream.read().take(2).map(Result::unwrap).collect();
    assert_eq!(head, vec![10, 20]);
    assert_eq!(stream.pulled(), 2);
    assert_eq!(stream.collect().unwrap(), vec![30, 40, 50]);
}

#[test]
fn test_pulled_counts_filtered_items() {
    let mut stream = Stream::new(1..=6).filter(|x| x % 3 == 0);
    assert_eq!(stream.first().unwrap(), Some(3));
    assert_eq!(stream.pulled(), 3);
}

#[test]
fn test_exhausted_stream_yields_nothing_more() {
    let mut stream = Stream::new(vec![1]);
    let all: Vec<_> = stream.read().collect();
    assert_eq!(all.len(), 1);
    assert!(stream.is_exhausted());
    assert!(stream.read().next().is_none());
}

#[test]
fn test_abort_ends_traversal() {
    let mut stream = Stream::try_new(vec![Ok(1), Err("bad"), Ok(3)]);
    let pulls: Vec<_> = stream.read().collect();
    assert_eq!(pulls.len(), 2);
    assert_eq!(*pulls[0].as_ref().unwrap(), 1);
    assert!(pulls[1].as_ref().unwrap_err().is_cycle());
    assert!(stream.is_exhausted());
    assert!(stream.read().next().is_none());
}

#[test]
fn test_by_ref_leaves_remainder() {
    let mut stream = Stream::new(vec!['a', 'b', 'c', 'd']);
    let head = stream.by_ref().take(1).collect().unwrap();
    assert_eq!(head, vec!['a']);
    assert_eq!(stream.collect().unwrap(), vec!['b', 'c', 'd']);
}

#[test]
fn test_independent_streams_over_one_slice() {
    let items = [5, 6, 7, 8];
    let odd = |x: &i32| x % 2 == 1;
    let first = Stream::new(items.iter().copied()).filter(odd).collect().unwrap();
    let second = Stream::new(items.iter().copied()).filter(odd).collect().unwrap();
    assert_eq!(first, second);
    assert_eq!(first, vec![5, 7]);
}

#[test]
fn test_policy_and_debug() {
    let stream = Stream::with_handler(vec![1], Settle::new()).map(|x| x + 1);
    assert_eq!(stream.policy(), Policy::Settle);
    let shown = format!("{:?}", stream);
    assert!(shown.contains("policy: Settle"));
    assert!(shown.contains("queue: [Map]"));
}

#[test]
fn test_into_iterator_yields_results() {
    let mut total = 0;
    for pulled in Stream::new(1..=4).filter(|x| x % 2 == 0) {
        total += pulled.unwrap();
    }
    assert_eq!(total, 6);
}

#[test]
fn test_by_ref_lookahead_adapter_consumes_pending_item() {
    let mut stream = Stream::new(1..=5);
    let head = stream.by_ref().intersperse(0).take(2).collect().unwrap();
    assert_eq!(head, vec![1, 0]);
    assert_eq!(stream.collect().unwrap(), vec![3, 4, 5]);
}
