//! Property-based tests for museum-eda
//!
//! - Test counting invariants over random collections with nulls
//! - Test binning and truncation invariants
//! - Run with ProptestConfig::with_cases(100)

use museum_eda::collection::{Collection, Record};
use museum_eda::summary::Summarizer;
use museum_eda::temporal::bin_year;
use proptest::prelude::*;

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Optional category drawn from a small alphabet so groups collide
fn arb_category() -> impl Strategy<Value = Option<String>> {
    prop::option::weighted(0.8, "[A-F]").prop_map(|c| c.map(String::from))
}

/// Optional year, including BCE
fn arb_year() -> impl Strategy<Value = Option<i64>> {
    prop::option::weighted(0.7, -3000i64..2025)
}

/// Collection with `cat`, `artist` and `year` columns, every one nullable
fn arb_collection() -> impl Strategy<Value = Collection> {
    prop::collection::vec((arb_category(), arb_category(), arb_year()), 1..200).prop_map(
        |rows| {
            let records: Vec<Record> = rows
                .into_iter()
                .map(|(cat, artist, year)| {
                    Record::new()
                        .with("cat", cat)
                        .with("artist", artist)
                        .with("year", year)
                })
                .collect();
            Collection::from_records("generated", &records).unwrap()
        },
    )
}

fn non_null_count(collection: &Collection, column: &str) -> usize {
    collection
        .cells(column)
        .unwrap()
        .filter(|cell| !cell.is_absent())
        .count()
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: total count equals row count regardless of nulls
    #[test]
    fn prop_total_count_is_row_count(collection in arb_collection()) {
        let summarizer = Summarizer::new(&collection);
        prop_assert_eq!(summarizer.total_count(), collection.num_rows());
    }

    /// Property: distinct count never exceeds total count
    #[test]
    fn prop_distinct_at_most_total(collection in arb_collection()) {
        let summarizer = Summarizer::new(&collection);
        let distinct = summarizer.distinct_count("artist").unwrap();
        prop_assert!(distinct <= summarizer.total_count());
        prop_assert!(distinct <= non_null_count(&collection, "artist"));
    }

    /// Property: distinct == total iff every identity value is present and unique
    #[test]
    fn prop_distinct_equals_total_iff_unique_and_present(collection in arb_collection()) {
        let summarizer = Summarizer::new(&collection);
        let distinct = summarizer.distinct_count("artist").unwrap();

        let labels: Vec<Option<String>> = collection
            .cells("artist")
            .unwrap()
            .map(|cell| cell.label().map(|label| label.into_owned()))
            .collect();
        let all_present = labels.iter().all(Option::is_some);
        let mut present: Vec<&String> = labels.iter().flatten().collect();
        present.sort();
        present.dedup();
        let all_unique = present.len() == labels.iter().flatten().count();

        prop_assert_eq!(distinct == summarizer.total_count(), all_present && all_unique);
    }

    /// Property: category counts sum to the non-null rows of the column
    #[test]
    fn prop_category_counts_sum_to_non_null(collection in arb_collection()) {
        let dist = Summarizer::new(&collection).categorical("cat", None).unwrap();
        prop_assert_eq!(dist.total(), non_null_count(&collection, "cat"));
    }

    /// Property: distribution is sorted by count descending
    #[test]
    fn prop_distribution_count_descending(collection in arb_collection()) {
        let dist = Summarizer::new(&collection).categorical("cat", None).unwrap();
        for pair in dist.entries().windows(2) {
            prop_assert!(pair[0].count >= pair[1].count);
        }
    }

    /// Property: top-N is a prefix of the untruncated distribution
    #[test]
    fn prop_top_n_is_prefix(collection in arb_collection(), n in 1usize..8) {
        let summarizer = Summarizer::new(&collection);
        let full = summarizer.categorical("cat", None).unwrap();
        let top = summarizer.categorical("cat", Some(n)).unwrap();

        prop_assert_eq!(top.len(), n.min(full.len()));
        prop_assert_eq!(top.entries(), &full.entries()[..top.len()]);
    }

    /// Property: normalized fractions lie in [0, 1] and sum to 1
    #[test]
    fn prop_normalized_fractions(collection in arb_collection()) {
        let dist = Summarizer::new(&collection).normalized("cat", None).unwrap();
        for entry in dist.entries() {
            prop_assert!((0.0..=1.0).contains(&entry.fraction));
        }
        if !dist.is_empty() {
            prop_assert!((dist.fraction_sum() - 1.0).abs() < 1e-9);
        }
    }

    /// Property: binning is idempotent
    #[test]
    fn prop_bin_idempotent(year in -100_000i64..100_000, width in 1i64..500) {
        let once = bin_year(year, width).unwrap();
        prop_assert_eq!(bin_year(once, width).unwrap(), once);
        prop_assert!(once <= year && year - once < width);
    }

    /// Property: binned counts cover exactly the non-null years, count descending
    #[test]
    fn prop_binned_counts_cover_years(collection in arb_collection(), width in 1i64..300) {
        let dist = Summarizer::new(&collection).binned("year", width).unwrap();
        prop_assert_eq!(dist.total(), non_null_count(&collection, "year"));
        for pair in dist.entries().windows(2) {
            prop_assert!(pair[0].count >= pair[1].count);
        }

        let axis = dist.into_label_order();
        for pair in axis.entries().windows(2) {
            prop_assert!(pair[0].label < pair[1].label);
        }
    }

    /// Property: earliest <= latest whenever defined; undefined only if no years
    #[test]
    fn prop_date_bounds_ordered(collection in arb_collection()) {
        let bounds = Summarizer::new(&collection).date_bounds("year").unwrap();
        match bounds {
            Some((earliest, latest)) => prop_assert!(earliest <= latest),
            None => prop_assert_eq!(non_null_count(&collection, "year"), 0),
        }
    }
}
