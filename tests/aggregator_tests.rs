use flamecafe::aggregator::{SampleAggregator, WindowStats};
use flamecafe::sampler::{stack_hash, SampleKey, MAX_STACK_DEPTH};

#[test]
fn test_equal_prefixes_share_a_bucket() {
    let mut aggregator = SampleAggregator::new();

    let short = SampleKey::from_frames(&[0x10, 0x20]);
    let padded = SampleKey::from_frames(&[0x10, 0x20, 0, 0, 0]);
    let truncated = SampleKey::from_frames(&[0x10, 0x20, 0, 0x30]);

    assert_eq!(stack_hash(&short), stack_hash(&padded));
    assert_eq!(short, truncated);

    aggregator.record(short);
    aggregator.record(padded);
    aggregator.record(truncated);

    assert_eq!(aggregator.len(), 1);
    assert_eq!(aggregator.count(&short), 3);
}

#[test]
fn test_counts_sum_to_samples() {
    let mut aggregator = SampleAggregator::new();
    let keys = [
        SampleKey::from_frames(&[1]),
        SampleKey::from_frames(&[1, 2]),
        SampleKey::from_frames(&[2, 1]),
        SampleKey::from_frames(&[1, 2, 3]),
    ];

    for round in 0..5 {
        for key in keys.iter().take(round % keys.len() + 1) {
            aggregator.record(*key);
        }
    }

    let total = aggregator.total_samples();
    let drained = aggregator.drain();
    let sum: u64 = drained.iter().map(|(_, count)| u64::from(*count)).sum();

    assert_eq!(total, 11);
    assert_eq!(sum, total);
    assert_eq!(drained.len(), 4);
}

#[test]
fn test_drain_resets_counts() {
    let mut aggregator = SampleAggregator::new();
    let key = SampleKey::from_frames(&[0xAA, 0xBB]);

    for _ in 0..10 {
        aggregator.record(key);
    }
    assert_eq!(aggregator.drain(), vec![(key, 10)]);
    assert!(aggregator.drain().is_empty());

    aggregator.record(key);
    assert_eq!(aggregator.count(&key), 1);
    assert_eq!(aggregator.total_samples(), 1);
}

#[test]
fn test_zero_padding_holds_for_all_keys() {
    let inputs: [&[u32]; 4] = [&[], &[5, 0, 6], &[1; 40], &[9, 8, 7]];

    for frames in inputs {
        let key = SampleKey::from_frames(frames);
        let slots = key.as_array();
        if let Some(first_zero) = slots.iter().position(|&a| a == 0) {
            assert!(slots[first_zero..].iter().all(|&a| a == 0));
        } else {
            assert_eq!(key.depth(), MAX_STACK_DEPTH);
        }
    }
}

#[test]
fn test_window_stats_from_drained_entries() {
    let mut aggregator = SampleAggregator::new();
    aggregator.record(SampleKey::from_frames(&[1, 2, 3]));
    aggregator.record(SampleKey::from_frames(&[1]));
    aggregator.record(SampleKey::from_frames(&[1]));

    let entries = aggregator.drain();
    let stats = WindowStats::from_depths(entries.iter().map(|(k, c)| (k.depth(), *c)));

    assert_eq!(stats.total_samples, 3);
    assert_eq!(stats.distinct_stacks, 2);
    assert_eq!(stats.max_depth, 3);
    assert_eq!(stats.hottest_count, 2);
}
