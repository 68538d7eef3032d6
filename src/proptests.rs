use super::*;

use proptest::prelude::*;
use std::collections::BTreeMap;

/// Naive reference: stored keys plus per-prefix marker counters.
#[derive(Debug, Default)]
struct Model {
    keys: BTreeMap<String, i64>,
    markers: BTreeMap<String, i64>,
}

impl Model {
    /// A trie node exists for every prefix of a stored key, the empty one included.
    fn node_exists(&self, prefix: &str) -> bool {
        prefix.is_empty() || self.keys.keys().any(|k| k.starts_with(prefix))
    }

    fn insert(&mut self, key: &str, value: i64) -> Outcome {
        if key.ends_with(SELECTOR) {
            return Outcome::SelectorNotAllowed;
        }
        if self.keys.contains_key(key) {
            return Outcome::KeyAlreadyExists;
        }
        self.keys.insert(key.to_owned(), value);
        Outcome::Ok
    }

    fn inc(&mut self, pattern: &str) -> Outcome {
        match pattern.strip_suffix(SELECTOR) {
            Some(prefix) => {
                if !self.node_exists(prefix) {
                    return Outcome::KeyNotFound;
                }
                *self.markers.entry(prefix.to_owned()).or_default() += 1;
                if self.keys.contains_key(prefix) {
                    Outcome::Ok
                } else {
                    Outcome::KeyNotFound
                }
            }
            None => match self.keys.get_mut(pattern) {
                Some(value) => {
                    *value += 1;
                    Outcome::Ok
                }
                None => Outcome::KeyNotFound,
            },
        }
    }

    fn get_value(&self, pattern: &str) -> i64 {
        match pattern.strip_suffix(SELECTOR) {
            Some(prefix) => {
                if !self.node_exists(prefix) {
                    return 0;
                }
                self.keys
                    .iter()
                    .filter(|(k, _)| k.starts_with(prefix))
                    .map(|(k, v)| {
                        let delta: i64 = self
                            .markers
                            .iter()
                            .filter(|(m, _)| m.starts_with(prefix) && k.starts_with(m.as_str()))
                            .map(|(_, d)| d)
                            .sum();
                        v + delta
                    })
                    .sum()
            }
            None => {
                if !self.node_exists(pattern) {
                    return 0;
                }
                self.keys.get(pattern).copied().unwrap_or(0)
                    + self.markers.get(pattern).copied().unwrap_or(0)
            }
        }
    }

    fn get_map(&self, pattern: &str) -> BTreeMap<String, i64> {
        match pattern.strip_suffix(SELECTOR) {
            Some(prefix) => {
                if !self.node_exists(prefix) {
                    return BTreeMap::new();
                }
                let stored = self
                    .keys
                    .iter()
                    .filter(|(k, _)| k.starts_with(prefix))
                    .map(|(k, v)| (k.clone(), *v));
                let markers = self
                    .markers
                    .iter()
                    .filter(|(m, _)| m.starts_with(prefix))
                    .map(|(m, v)| (format!("{m}{SELECTOR}"), *v));
                stored.chain(markers).collect()
            }
            None => self
                .keys
                .get_key_value(pattern)
                .map(|(k, v)| (k.clone(), *v))
                .into_iter()
                .collect(),
        }
    }

    fn contains(&self, pattern: &str) -> bool {
        match pattern.strip_suffix(SELECTOR) {
            Some(prefix) => {
                self.node_exists(prefix)
                    && (self.keys.keys().any(|k| k.starts_with(prefix))
                        || self.markers.contains_key(prefix))
            }
            None => self.keys.contains_key(pattern),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Ok,
    KeyAlreadyExists,
    KeyNotFound,
    SelectorNotAllowed,
}

impl From<Result<()>> for Outcome {
    fn from(result: Result<()>) -> Self {
        match result {
            Ok(()) => Outcome::Ok,
            Err(Error::KeyAlreadyExists { .. }) => Outcome::KeyAlreadyExists,
            Err(Error::KeyNotFound { .. }) => Outcome::KeyNotFound,
            Err(Error::SelectorNotAllowed { .. }) => Outcome::SelectorNotAllowed,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}

#[derive(Clone, Debug)]
enum Op {
    Insert(String, i64),
    Inc(String),
    GetValue(String),
    GetMap(String),
    Contains(String),
}

fn raw_strategy() -> impl Strategy<Value = String> + Clone {
    // A tiny alphabet keeps prefixes heavily shared.
    "[ab/]{1,5}"
}

fn pattern_strategy() -> impl Strategy<Value = String> + Clone {
    prop_oneof![
        raw_strategy(),
        "[ab/]{0,4}".prop_map(|p| format!("{p}{SELECTOR}")),
    ]
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let pattern = pattern_strategy();
    let op = prop_oneof![
        35 => (pattern.clone(), -100i64..100).prop_map(|(k, v)| Op::Insert(k, v)),
        25 => pattern.clone().prop_map(Op::Inc),
        15 => pattern.clone().prop_map(Op::GetValue),
        15 => pattern.clone().prop_map(Op::GetMap),
        10 => pattern.clone().prop_map(Op::Contains),
    ];
    prop::collection::vec(op, 0..=300)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in ops_strategy()) {
        let repo = Repository::new();
        let mut model = Model::default();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let got = Outcome::from(repo.insert(&key, value));
                    prop_assert_eq!(got, model.insert(&key, value), "insert {}", key);
                }
                Op::Inc(pattern) => {
                    let got = Outcome::from(repo.inc(&pattern));
                    prop_assert_eq!(got, model.inc(&pattern), "inc {}", pattern);
                }
                Op::GetValue(pattern) => {
                    let got = repo.get_value(&pattern).unwrap();
                    prop_assert_eq!(got, model.get_value(&pattern), "get_value {}", pattern);
                }
                Op::GetMap(pattern) => {
                    let got = repo.get_map(&pattern).unwrap();
                    prop_assert_eq!(got, model.get_map(&pattern), "get_map {}", pattern);
                }
                Op::Contains(pattern) => {
                    let got = repo.contains(&pattern).unwrap();
                    prop_assert_eq!(got, model.contains(&pattern), "contains {}", pattern);
                }
            }

            prop_assert_eq!(repo.size(), model.keys.len());
        }

        prop_assert!(repo.verify_integrity().is_empty(), "{:?}", repo.verify_integrity());
        prop_assert_eq!(repo.get_map("*").unwrap(), model.get_map("*"));
        prop_assert_eq!(repo.get_value("*").unwrap(), model.get_value("*"));
    }

    #[test]
    fn prop_insert_then_contains(keys in prop::collection::btree_set(raw_strategy(), 0..50)) {
        let repo = Repository::new();
        for key in &keys {
            repo.insert(key, 1).unwrap();
            prop_assert!(repo.contains(key).unwrap());
            let duplicate = matches!(repo.insert(key, 2), Err(Error::KeyAlreadyExists { .. }));
            prop_assert!(duplicate, "second insert of {} was accepted", key);
            prop_assert_eq!(repo.get_value(key).unwrap(), 1);
        }
        prop_assert_eq!(repo.size(), keys.len());
    }

    #[test]
    fn prop_reads_do_not_mutate(ops in ops_strategy(), query in pattern_strategy()) {
        let repo = Repository::new();
        for op in ops {
            match op {
                Op::Insert(key, value) => { let _ = repo.insert(&key, value); }
                Op::Inc(pattern) => { let _ = repo.inc(&pattern); }
                _ => {}
            }
        }
        let before = repo.to_string();
        let first = (
            repo.get_value(&query).unwrap(),
            repo.get_map(&query).unwrap(),
            repo.contains(&query).unwrap(),
            repo.size(),
        );
        let second = (
            repo.get_value(&query).unwrap(),
            repo.get_map(&query).unwrap(),
            repo.contains(&query).unwrap(),
            repo.size(),
        );
        prop_assert_eq!(first, second);
        prop_assert_eq!(before, repo.to_string());
    }
}

/// Calls `f` once for every ordering of `items` (Heap's algorithm, iterative).
fn each_ordering<T: Clone>(items: &[T], mut f: impl FnMut(&[T])) {
    let mut order = items.to_vec();
    let mut counters = vec![0usize; order.len()];
    f(&order);

    let mut level = 1;
    while level < order.len() {
        if counters[level] < level {
            let other = if level % 2 == 0 { 0 } else { counters[level] };
            order.swap(other, level);
            f(&order);
            counters[level] += 1;
            level = 1;
        } else {
            counters[level] = 0;
            level += 1;
        }
    }
}

#[test]
fn each_ordering_visits_every_permutation_once() {
    let mut seen = std::collections::BTreeSet::new();
    each_ordering(&[1, 2, 3, 4], |order| {
        assert!(seen.insert(order.to_vec()), "{order:?} repeated");
    });
    assert_eq!(seen.len(), 24);
}

#[test]
fn exhaustive_insert_order_delta_composition() {
    let keys = ["a", "aa", "ab", "aaa", "aab"];

    each_ordering(&keys, |order| {
        let repo = Repository::new();
        for key in order {
            repo.insert(key, 0).unwrap();
        }
        repo.inc("a*").unwrap();
        repo.inc("aa*").unwrap();

        // a:1 + ab:1 + aa:2 + aaa:2 + aab:2
        assert_eq!(repo.get_value("*").unwrap(), 8);
        assert_eq!(repo.size(), 5);
        assert!(repo.verify_integrity().is_empty());
    });
}

#[test]
fn exhaustive_inc_order_small_set() {
    let patterns = ["t*", "t1*", "t1", "t11", "*"];

    each_ordering(&patterns, |order| {
        let repo = Repository::new();
        let mut model = Model::default();
        for (k, v) in [("t1", 1), ("t2", 2), ("t3", 3), ("t11", 11), ("t12", 12)] {
            repo.insert(k, v).unwrap();
            model.insert(k, v);
        }
        for pattern in order {
            assert_eq!(Outcome::from(repo.inc(pattern)), model.inc(pattern));
        }
        for query in ["*", "t*", "t1*", "t1", "t11", "t2"] {
            assert_eq!(repo.get_value(query).unwrap(), model.get_value(query), "{query}");
            assert_eq!(repo.get_map(query).unwrap(), model.get_map(query), "{query}");
        }
    });
}
