//! End-to-end rename runs over temporary vendor directories.

use futconv_core::config::{CsvInstrumentConfig, CsvRollConfig};
use futconv_core::tables::CodeMapping;
use futconv_runner::{BatchError, BatchOrchestrator, ConfigValidator, Relocation};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

const INSTRUMENTS: &str = "\
Instrument,Description,Pointsize,Currency,AssetClass,Slippage,PerBlock,Percentage,PerTrade,Region
SP500_micro,Micro E-mini S&P 500,5,USD,Equity,0.125,0.25,0,0,US
GOLD,Gold,100,USD,Metals,0.1,2.5,0,0,US
CORN,Corn,50,USD,Ags,0.25,2.5,0,0,US
COFFEE,Coffee,375,USD,Ags,,2.5,0,0,US
";

const ROLLS: &str = "\
Instrument,HoldRollCycle,RollOffsetDays,CarryOffset,PricedRollCycle,ExpiryOffset
SP500_micro,HMUZ,-5,1,HMUZ,18
GOLD,GJMQVZ,-30,-1,GJMQVZ,26
COFFEE,HKNUZ,-20,1,HKNUZ,20
";

struct Fixture {
    _tmp: tempfile::TempDir,
    source: PathBuf,
    conv: PathBuf,
    instruments: CsvInstrumentConfig,
    rolls: CsvRollConfig,
    mapping: CodeMapping,
}

impl Fixture {
    fn new(files: &[&str]) -> Self {
        let tmp = tempfile::tempdir().unwrap();
        // Runs report resolved paths; compare against the same form.
        let root = tmp.path().canonicalize().unwrap();
        let source = root.join("Futures");
        let conv = root.join("Futures_conv");
        fs::create_dir(&source).unwrap();
        fs::create_dir(&conv).unwrap();
        for name in files {
            fs::write(source.join(name), format!("contents of {name}")).unwrap();
        }
        Self {
            _tmp: tmp,
            source,
            conv,
            instruments: CsvInstrumentConfig::from_reader(INSTRUMENTS.as_bytes()).unwrap(),
            rolls: CsvRollConfig::from_reader(ROLLS.as_bytes()).unwrap(),
            mapping: CodeMapping::norgate(),
        }
    }

    fn orchestrator(&self) -> BatchOrchestrator<'_> {
        BatchOrchestrator::new(
            &self.mapping,
            ConfigValidator::new(&self.instruments, &self.rolls),
        )
    }
}

fn names_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn es_dry_run_plans_canonical_name() {
    let fx = Fixture::new(&["ES-2011U.csv"]);
    let report = fx.orchestrator().run(&fx.source, Some("ES"), true).unwrap();

    assert_eq!(report.buckets.mapped, set(&["SP500_micro"]));
    assert_eq!(
        report.relocations,
        vec![Relocation::Planned {
            from: fx.source.join("ES-2011U.csv"),
            to: fx.conv.join("SP500_micro_20110900.csv"),
        }]
    );
    assert_eq!(names_in(&fx.source), vec!["ES-2011U.csv"]);
    assert!(names_in(&fx.conv).is_empty());
}

#[test]
fn es_execute_moves_exactly_once() {
    let fx = Fixture::new(&["ES-2011U.csv"]);
    let report = fx.orchestrator().run(&fx.source, Some("ES"), false).unwrap();

    assert_eq!(report.buckets.mapped, set(&["SP500_micro"]));
    assert!(!report.has_failures());
    assert!(names_in(&fx.source).is_empty());
    assert_eq!(names_in(&fx.conv), vec!["SP500_micro_20110900.csv"]);
    assert_eq!(
        fs::read_to_string(fx.conv.join("SP500_micro_20110900.csv")).unwrap(),
        "contents of ES-2011U.csv"
    );

    // Second run finds nothing left to rename.
    let again = fx.orchestrator().run(&fx.source, Some("ES"), false).unwrap();
    assert!(again.buckets.mapped.is_empty());
    assert!(again
        .to_string()
        .starts_with("No files named ES-*.csv found at"));
}

#[test]
fn unmapped_code_lands_only_in_unmapped() {
    let fx = Fixture::new(&["ZZZ-2020F.csv"]);
    let report = fx.orchestrator().run(&fx.source, None, false).unwrap();

    assert_eq!(report.buckets.unmapped, set(&["ZZZ"]));
    assert!(report.buckets.mapped.is_empty());
    assert!(report.buckets.misconfigured.is_empty());
    assert!(report.buckets.no_roll_config.is_empty());
    assert!(report.relocations.is_empty());
    assert_eq!(names_in(&fx.source), vec!["ZZZ-2020F.csv"]);
}

#[test]
fn missing_roll_config_blocks_move_and_is_stable() {
    // ZC → CORN: metadata present, roll config absent.
    let fx = Fixture::new(&["ZC-2021H.csv"]);
    let first = fx.orchestrator().run(&fx.source, None, false).unwrap();
    assert_eq!(first.buckets.no_roll_config, set(&["CORN"]));
    assert!(first.buckets.mapped.is_empty());
    assert!(first.buckets.misconfigured.is_empty());
    assert_eq!(names_in(&fx.source), vec!["ZC-2021H.csv"]);

    let second = fx.orchestrator().run(&fx.source, None, false).unwrap();
    assert_eq!(first.buckets, second.buckets);
    assert!(names_in(&fx.conv).is_empty());
}

#[test]
fn incomplete_metadata_blocks_move() {
    // KC → COFFEE: roll config present, slippage blank.
    let fx = Fixture::new(&["KC-2020H.csv"]);
    let report = fx.orchestrator().run(&fx.source, None, false).unwrap();
    assert_eq!(report.buckets.misconfigured, set(&["COFFEE"]));
    assert!(report.relocations.is_empty());
    assert_eq!(names_in(&fx.source), vec!["KC-2020H.csv"]);
}

#[test]
fn filter_skips_other_codes_before_parsing() {
    let fx = Fixture::new(&["ES-2011U.csv", "GC-2019Z.csv", "garbage.csv"]);
    let report = fx.orchestrator().run(&fx.source, Some("GC"), false).unwrap();
    assert_eq!(report.buckets.mapped, set(&["GOLD"]));
    assert!(report.buckets.unparsed.is_empty());
    assert_eq!(names_in(&fx.source), vec!["ES-2011U.csv", "garbage.csv"]);
    assert_eq!(names_in(&fx.conv), vec!["GOLD_20191200.csv"]);
}

#[test]
fn malformed_names_are_unparsed() {
    let fx = Fixture::new(&["garbage.csv", "ES-11U.csv", "ES-2011Y.csv", "ES-2011U.csv"]);
    let report = fx.orchestrator().run(&fx.source, None, true).unwrap();
    assert_eq!(
        report.buckets.unparsed,
        set(&["ES-11U.csv", "ES-2011Y.csv", "garbage.csv"])
    );
    assert_eq!(report.buckets.mapped, set(&["SP500_micro"]));
}

#[test]
fn relocation_failure_is_recorded_and_batch_continues() {
    let fx = Fixture::new(&["ES-2011U.csv", "GC-2019Z.csv"]);
    fs::write(fx.conv.join("GOLD_20191200.csv"), "already normalized").unwrap();

    let report = fx.orchestrator().run(&fx.source, None, false).unwrap();
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].file, "GC-2019Z.csv");
    assert_eq!(report.buckets.mapped, set(&["SP500_micro"]));
    assert_eq!(
        fs::read_to_string(fx.conv.join("GOLD_20191200.csv")).unwrap(),
        "already normalized"
    );
    assert!(fx.source.join("GC-2019Z.csv").exists());
}

#[test]
fn missing_destination_dir_fails_every_eligible_file() {
    let fx = Fixture::new(&["ES-2011U.csv", "ET-2011Z.csv"]);
    fs::remove_dir(&fx.conv).unwrap();

    let report = fx.orchestrator().run(&fx.source, None, false).unwrap();
    assert_eq!(report.failed.len(), 2);
    assert!(report.buckets.mapped.is_empty());
    assert_eq!(names_in(&fx.source), vec!["ES-2011U.csv", "ET-2011Z.csv"]);
}

#[test]
fn aliased_codes_dedupe_into_one_instrument() {
    let fx = Fixture::new(&["ES-2011U.csv", "ET-2011Z.csv", "ES-2012H.csv"]);
    let report = fx.orchestrator().run(&fx.source, None, false).unwrap();
    assert_eq!(report.buckets.mapped, set(&["SP500_micro"]));
    assert_eq!(report.relocations.len(), 3);
    assert_eq!(
        names_in(&fx.conv),
        vec![
            "SP500_micro_20110900.csv",
            "SP500_micro_20111200.csv",
            "SP500_micro_20120300.csv",
        ]
    );
}

#[test]
fn dotted_source_path_still_targets_sibling_conv_dir() {
    let fx = Fixture::new(&["ES-2011U.csv", "GC-2019Z.csv"]);
    fs::create_dir(fx.source.join("nested")).unwrap();

    let dotted = fx.source.join("nested").join("..").join(".");
    let report = fx.orchestrator().run(&dotted, Some("ES"), true).unwrap();
    assert_eq!(report.source_dir, fx.source);
    assert_eq!(
        report.relocations,
        vec![Relocation::Planned {
            from: fx.source.join("ES-2011U.csv"),
            to: fx.conv.join("SP500_micro_20110900.csv"),
        }]
    );

    let report = fx
        .orchestrator()
        .run(&fx.source.join("nested").join(".."), Some("GC"), false)
        .unwrap();
    assert!(!report.has_failures());
    assert_eq!(names_in(&fx.conv), vec!["GOLD_20191200.csv"]);
    assert!(!fx.source.join("_conv").exists());
    assert!(!fx.source.join("nested").join("_conv").exists());
}

#[test]
fn missing_source_dir_is_a_run_level_error() {
    let fx = Fixture::new(&[]);
    let err = fx
        .orchestrator()
        .run(&fx.source.join("gone"), None, true)
        .unwrap_err();
    assert!(matches!(err, BatchError::Listing { .. }));
}

#[test]
fn report_serializes_to_json() {
    let fx = Fixture::new(&["ES-2011U.csv", "ZZZ-2020F.csv"]);
    let report = fx.orchestrator().run(&fx.source, None, true).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["buckets"]["mapped"][0], "SP500_micro");
    assert_eq!(json["buckets"]["unmapped"][0], "ZZZ");
    assert_eq!(json["relocations"][0]["kind"], "planned");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Buckets are the same sorted, deduplicated sets whatever files exist
    /// and in whatever order they were created.
    #[test]
    fn buckets_sorted_and_deduped(
        picks in prop::collection::vec(
            prop::sample::select(vec![
                "ES-2011U.csv", "ET-2011Z.csv", "ZZZ-2020F.csv", "ZZZ-2021F.csv",
                "ZC-2021H.csv", "KC-2020H.csv", "GC-2019Z.csv", "bogus.csv",
            ]),
            1..8,
        )
    ) {
        let fx = Fixture::new(&picks);
        let report = fx.orchestrator().run(&fx.source, None, true).unwrap();

        let unique: BTreeSet<&str> = picks.iter().copied().collect();
        let b = &report.buckets;
        prop_assert_eq!(b.unmapped.contains("ZZZ"), unique.iter().any(|f| f.starts_with("ZZZ")));
        prop_assert_eq!(b.unparsed.contains("bogus.csv"), unique.contains("bogus.csv"));
        prop_assert!(b.unmapped.len() <= 1);
        prop_assert_eq!(report.relocations.len(),
            unique.iter().filter(|f| ["ES", "ET", "GC"].iter().any(|c| f.starts_with(&format!("{c}-")))).count());

        let all: Vec<&BTreeSet<String>> = vec![&b.mapped, &b.misconfigured, &b.no_roll_config];
        for bucket in all {
            let v: Vec<&String> = bucket.iter().collect();
            prop_assert!(v.windows(2).all(|w| w[0] < w[1]));
        }
        for name in b.mapped.iter() {
            prop_assert!(!b.misconfigured.contains(name));
            prop_assert!(!b.no_roll_config.contains(name));
        }
    }
}
