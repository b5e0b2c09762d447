//! Cross-module scenarios from spec.md §8, exercised through the public API
//! rather than any single module's internals.

use dawg_rs::builder::BuilderConfig;
use dawg_rs::builder::DawgBuilder;
use dawg_rs::search::EnumerateSpec;
use dawg_rs::symbol::from_symbols;
use dawg_rs::symbol::to_symbols;

fn words(b: &DawgBuilder, spec: &EnumerateSpec) -> Vec<String> {
	b.enumerate(spec).map(|w| from_symbols(&w).unwrap()).collect()
}

fn build(strings: &[&str]) -> DawgBuilder {
	let mut b = DawgBuilder::new();
	for s in strings {
		b.add(&to_symbols(s));
	}
	b
}

#[test]
fn scenario_1_minimal_construction() {
	let b = build(&["a", "xe", "xes", "xs"]);
	assert_eq!(b.len(), 4);

	let compact = b.compress();
	assert_eq!(compact.node_count(), 4);

	assert_eq!(words(&b, &EnumerateSpec::all()), vec!["a", "xe", "xes", "xs"]);
	assert_eq!(words(&b, &EnumerateSpec::all().with_prefix(to_symbols("xe"))), vec!["xe", "xes"]);

	let mut ending_in_s: Vec<String> =
		words(&b, &EnumerateSpec::all()).into_iter().filter(|w| w.ends_with('s')).collect();
	ending_in_s.sort();
	assert_eq!(ending_in_s, vec!["xes", "xs"]);
}

#[test]
fn scenario_2_permutation_invariance() {
	let base = ["assiez", "assions", "eriez", "erions", "eront", "iez", "ions"];
	let mut expected = base.to_vec();
	expected.sort_unstable();

	// A handful of distinct insertion permutations, including the sorted one.
	let permutations: Vec<Vec<&str>> = vec![
		base.to_vec(),
		expected.clone(),
		base.iter().rev().copied().collect(),
		{
			let mut v = base.to_vec();
			v.rotate_left(3);
			v
		},
	];

	let reference = build(&expected.iter().map(|s| s.as_str()).collect::<Vec<_>>());
	let reference_compact = reference.compress();

	for perm in permutations {
		let b = build(&perm);
		assert_eq!(b.len(), 7);
		assert_eq!(words(&b, &EnumerateSpec::all()), expected);
		assert_eq!(b.compress(), reference_compact);
	}
}

#[test]
fn scenario_3_overlap_with_empty_string() {
	let mut b = build(&["", "add", "a", "ad"]);
	assert_eq!(words(&b, &EnumerateSpec::all()), vec!["", "a", "ad", "add"]);

	assert!(b.remove(&to_symbols("")));
	assert_eq!(b.len(), 3);
	assert_eq!(words(&b, &EnumerateSpec::all()), vec!["a", "ad", "add"]);
}

#[test]
fn scenario_4_range_slicing() {
	let strings = [
		"aa", "aaa", "aab", "baaaa", "baba", "babb", "babbc", "bac", "baca", "bacb", "bacba", "bada", "badb", "badbc",
		"badd", "bb", "bcd", "cac", "cc",
	];
	let b = build(&strings);

	let spec = EnumerateSpec::all()
		.with_prefix(to_symbols("ba"))
		.with_from(to_symbols("bac"), true)
		.with_to(to_symbols("bad"), true);
	assert_eq!(words(&b, &spec), vec!["bac", "baca", "bacb", "bacba"]);

	let descending = spec.descending(true);
	assert_eq!(words(&b, &descending), vec!["bacba", "bacb", "baca", "bac"]);
}

#[test]
fn scenario_5_suffix_query() {
	let b = build(&["tet", "tetatet"]);

	let ends_tet = EnumerateSpec::all().with_suffix(to_symbols("tet"));
	let mut got: Vec<String> = words(&b, &ends_tet);
	got.sort();
	assert_eq!(got, vec!["tet", "tetatet"]);

	let ends_atet = EnumerateSpec::all().with_suffix(to_symbols("atet"));
	assert_eq!(words(&b, &ends_atet), vec!["tetatet"]);

	let starts_teta = EnumerateSpec::all().with_prefix(to_symbols("teta"));
	assert_eq!(words(&b, &starts_teta), vec!["tetatet"]);
}

#[test]
fn scenario_5_suffix_query_with_incoming_index_matches_prefix_mode() {
	let mut b = DawgBuilder::with_config(BuilderConfig { with_incoming: true });
	for w in ["tet", "tetatet"] {
		b.add(&to_symbols(w));
	}

	let ends_tet = EnumerateSpec::all().with_suffix(to_symbols("tet"));
	let mut got: Vec<String> = words(&b, &ends_tet);
	got.sort();
	assert_eq!(got, vec!["tet", "tetatet"]);

	let ends_atet = EnumerateSpec::all().with_suffix(to_symbols("atet"));
	assert_eq!(words(&b, &ends_atet), vec!["tetatet"]);
}

#[test]
fn scenario_6_delete_by_confluence() {
	let mut b = build(&["ant", "ants", "ant"]);
	assert!(b.remove(&to_symbols("ants")));
	assert!(b.contains(&to_symbols("ant")));
	assert!(!b.contains(&to_symbols("ants")));

	let fresh = build(&["ant"]);
	assert_eq!(b.len(), fresh.len());
	assert_eq!(b.compress(), fresh.compress());
}

#[test]
fn compression_faithfulness_and_round_trip() {
	let strings = ["a", "xe", "xes", "xs", "", "xeon"];
	let b = build(&strings);

	let mut expected: Vec<String> = strings.iter().map(|s| s.to_string()).collect();
	expected.sort();

	let compact = b.compress();
	let compact_words: Vec<String> = compact.enumerate(&EnumerateSpec::all()).map(|w| from_symbols(&w).unwrap()).collect();
	assert_eq!(compact_words, expected);

	let restored = compact.uncompress();
	assert_eq!(restored.len(), b.len());
	for s in &strings {
		assert_eq!(restored.contains(&to_symbols(s)), b.contains(&to_symbols(s)));
	}
}

#[test]
fn map_facade_round_trips_through_the_set_layer() {
	let mut m = dawg_rs::map::DawgMap::new();
	m.put(&to_symbols("host"), &to_symbols("10.0.0.1")).unwrap();
	m.put(&to_symbols("port"), &to_symbols("8080")).unwrap();

	assert_eq!(
		m.get(&to_symbols("host")).map(|v| from_symbols(&v).unwrap()),
		Some("10.0.0.1".to_string())
	);
	assert_eq!(m.get(&to_symbols("missing")), None);
}
