use regex::{Regex, RegexBuilder};

use crate::process::{ProcessRecord, Snapshot};

/// Indices into a [`Snapshot`] of the records matching the current pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredView {
    indices: Vec<usize>,
}

impl FilteredView {
    /// Rebuilds the view from scratch. An empty pattern keeps every record;
    /// a pattern that does not compile keeps none.
    pub fn recompute(snapshot: &Snapshot, pattern: &str) -> Self {
        if pattern.is_empty() {
            return Self {
                indices: (0..snapshot.len()).collect(),
            };
        }

        let Some(regex) = compile(pattern) else {
            return Self::default();
        };

        let indices = snapshot
            .records()
            .iter()
            .enumerate()
            .filter(|(_, record)| matches_record(&regex, record))
            .map(|(index, _)| index)
            .collect();

        Self { indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn get<'a>(&self, snapshot: &'a Snapshot, position: usize) -> Option<&'a ProcessRecord> {
        self.indices
            .get(position)
            .and_then(|index| snapshot.get(*index))
    }

    pub fn records<'a>(
        &'a self,
        snapshot: &'a Snapshot,
    ) -> impl Iterator<Item = &'a ProcessRecord> + 'a {
        self.indices.iter().filter_map(|index| snapshot.get(*index))
    }
}

/// Initial pattern for a pid or process name given on the command line.
pub fn target_pattern(target: &str) -> String {
    if !target.is_empty() && target.bytes().all(|b| b.is_ascii_digit()) {
        format!("^{target}$")
    } else {
        regex::escape(target)
    }
}

fn compile(pattern: &str) -> Option<Regex> {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(regex) => Some(regex),
        Err(err) => {
            log::debug!("pattern {pattern:?} does not compile: {err}");
            None
        }
    }
}

fn matches_record(regex: &Regex, record: &ProcessRecord) -> bool {
    regex.is_match(&record.command) || regex.is_match(&record.user) || regex.is_match(&record.pid)
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    fn sample() -> Snapshot {
        Snapshot::from_records(vec![
            ProcessRecord::new("alice", "100", "bash"),
            ProcessRecord::new("bob", "200", "vim"),
            ProcessRecord::new("root", "1", "systemd"),
            ProcessRecord::new("alice", "1200", "Xorg"),
        ])
    }

    fn pids(view: &FilteredView, snapshot: &Snapshot) -> Vec<String> {
        view.records(snapshot).map(|r| r.pid.clone()).collect()
    }

    #[test]
    fn empty_pattern_is_identity() {
        let snapshot = sample();
        let view = FilteredView::recompute(&snapshot, "");
        let all: Vec<&ProcessRecord> = view.records(&snapshot).collect();
        let expected: Vec<&ProcessRecord> = snapshot.records().iter().collect();
        assert_eq!(all, expected);
    }

    #[test]
    fn command_match_selects_single_record() {
        let snapshot = Snapshot::from_records(vec![
            ProcessRecord::new("alice", "100", "bash"),
            ProcessRecord::new("bob", "200", "vim"),
        ]);
        let view = FilteredView::recompute(&snapshot, "vim");
        assert_eq!(view.len(), 1);
        assert_eq!(
            view.get(&snapshot, 0),
            Some(&ProcessRecord::new("bob", "200", "vim"))
        );
    }

    #[test]
    fn any_field_may_match() {
        let snapshot = sample();
        assert_eq!(pids(&FilteredView::recompute(&snapshot, "alice"), &snapshot), vec!["100", "1200"]);
        assert_eq!(pids(&FilteredView::recompute(&snapshot, "20"), &snapshot), vec!["200", "1200"]);
        assert_eq!(pids(&FilteredView::recompute(&snapshot, "sys"), &snapshot), vec!["1"]);
    }

    #[test]
    fn matching_ignores_case() {
        let snapshot = sample();
        assert_eq!(pids(&FilteredView::recompute(&snapshot, "xORG"), &snapshot), vec!["1200"]);
        assert_eq!(pids(&FilteredView::recompute(&snapshot, "BOB"), &snapshot), vec!["200"]);
    }

    #[test]
    fn pattern_is_a_regex() {
        let snapshot = sample();
        assert_eq!(pids(&FilteredView::recompute(&snapshot, "^b"), &snapshot), vec!["100", "200"]);
        assert_eq!(pids(&FilteredView::recompute(&snapshot, "vim|xorg"), &snapshot), vec!["200", "1200"]);
    }

    #[test]
    fn broken_pattern_matches_nothing() {
        let snapshot = sample();
        assert!(FilteredView::recompute(&snapshot, "(").is_empty());
        assert!(FilteredView::recompute(&snapshot, "[a-").is_empty());
        assert_eq!(FilteredView::recompute(&snapshot, "(b)").len(), 2);
    }

    #[test]
    fn recompute_is_idempotent() {
        let snapshot = sample();
        let before = snapshot.records().to_vec();
        let first = FilteredView::recompute(&snapshot, "a");
        let second = FilteredView::recompute(&snapshot, "a");
        assert_eq!(first, second);
        assert_eq!(snapshot.records(), before.as_slice());
    }

    #[test]
    fn target_pattern_pins_pids_and_escapes_names() {
        let snapshot = sample();
        let by_pid = FilteredView::recompute(&snapshot, &target_pattern("1"));
        assert_eq!(pids(&by_pid, &snapshot), vec!["1"]);

        assert_eq!(target_pattern("a.out"), r"a\.out");
        let by_name = FilteredView::recompute(&snapshot, &target_pattern("x.rg"));
        assert!(by_name.is_empty());
    }

    fn record_strategy() -> impl Strategy<Value = ProcessRecord> {
        ("[a-c]{1,4}", "[0-9]{1,4}", "[a-cA-C]{1,6}")
            .prop_map(|(user, pid, command)| ProcessRecord::new(user, pid, command))
    }

    proptest! {
        #[test]
        fn view_holds_exactly_the_matching_records(
            records in prop::collection::vec(record_strategy(), 0..40),
            pattern in "[a-c0-9]{1,3}",
        ) {
            let snapshot = Snapshot::from_records(records);
            let view = FilteredView::recompute(&snapshot, &pattern);

            // the generated patterns carry no metacharacters, so a match is a
            // case-insensitive substring hit on some field
            let needle = pattern.to_lowercase();
            let expected: Vec<usize> = snapshot
                .records()
                .iter()
                .enumerate()
                .filter(|(_, r)| {
                    r.command.to_lowercase().contains(&needle)
                        || r.user.contains(&needle)
                        || r.pid.contains(&needle)
                })
                .map(|(i, _)| i)
                .collect();
            prop_assert_eq!(&view.indices, &expected);
        }
    }
}
