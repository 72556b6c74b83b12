#![allow(dead_code)]

use mmstack::meta::AxisLengths;
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Axis lengths with between one and a few entries on each stacked axis.
pub fn arb_axes() -> BoxedStrategy<AxisLengths> {
    (1usize..6, 1usize..4, 1usize..6)
        .prop_map(|(z, channel, time)| AxisLengths {
            x: 64,
            y: 64,
            z,
            channel,
            time,
        })
        .boxed()
}

/// An axis length as a header might declare it: either a handful of planes
/// or something far past what an acquisition can hold.
pub fn arb_declared_extent() -> BoxedStrategy<usize> {
    prop_oneof![1usize..4, (1usize << 32)..usize::MAX].boxed()
}

/// Channel names usable inside V1 file names, including embedded `_`.
pub fn arb_channel_names(count: usize) -> BoxedStrategy<Vec<String>> {
    prop::collection::btree_set("[A-Z][A-Za-z0-9]{0,5}(_[0-9]{1,3})?", count..=count)
        .prop_map(|names| names.into_iter().collect())
        .boxed()
}

/// Arbitrary lines built from the characters the metadata grammar cares
/// about, so the lexer sees plenty of half-formed structure.
pub fn arb_metadata_noise() -> BoxedStrategy<String> {
    let line = prop::collection::vec(
        prop_oneof![
            Just("{".to_string()),
            Just("}".to_string()),
            Just("[".to_string()),
            Just("]".to_string()),
            Just("\"".to_string()),
            Just(":".to_string()),
            Just(",".to_string()),
            Just("FrameKey-".to_string()),
            Just("Coords-".to_string()),
            Just("UserData".to_string()),
            Just("MicroManagerVersion\": \"1.4".to_string()),
            Just("MicroManagerVersion\": \"2.0".to_string()),
            "[a-zA-Z0-9_ -]{0,8}",
        ],
        0..12,
    )
    .prop_map(|tokens| tokens.concat());
    prop::collection::vec(line, 0..40)
        .prop_map(|lines| lines.join("\n"))
        .boxed()
}
