// Historical processes: the four kinds of change a dialect can undergo.
//
// - `segment.rs`: `SegmentRule`, context-sensitive rewrites of segment spans
// - `harmony.rs`: `HarmonyRule`, agreement along one axis across the word
// - `syllabify.rs`: `SyllabifyRule`, nucleus assignment by sonority
// - `stress.rs`: `StressRule`, weight-driven stress placement
//
// `Process` is the closed sum over them. Every variant is a pure function
// from `Word` to `Word` and never fails.

pub mod harmony;
pub mod segment;
pub mod stress;
pub mod syllabify;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::word::Word;

pub use harmony::{HarmonyAxis, HarmonyRule};
pub use segment::{Correspondence, ReferenceShape, SegmentRule};
pub use stress::{StressRule, TailPolicy};
pub use syllabify::SyllabifyRule;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Process {
    Segment(SegmentRule),
    Harmony(HarmonyRule),
    Syllabify(SyllabifyRule),
    Stress(StressRule),
}

impl Process {
    pub fn apply(&self, word: &Word) -> Word {
        match self {
            Process::Segment(rule) => rule.apply(word),
            Process::Harmony(rule) => rule.apply(word),
            Process::Syllabify(rule) => rule.apply(word),
            Process::Stress(rule) => rule.apply(word),
        }
    }

    /// The rule-file keyword for this kind of process.
    pub fn kind(&self) -> &'static str {
        match self {
            Process::Segment(_) => "mute",
            Process::Harmony(_) => "harmonia",
            Process::Syllabify(_) => "silabe",
            Process::Stress(_) => "acente",
        }
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Process::Segment(rule) => rule.fmt(f),
            Process::Harmony(rule) => rule.fmt(f),
            Process::Syllabify(rule) => rule.fmt(f),
            Process::Stress(rule) => rule.fmt(f),
        }
    }
}

impl From<SegmentRule> for Process {
    fn from(rule: SegmentRule) -> Self {
        Process::Segment(rule)
    }
}

impl From<HarmonyRule> for Process {
    fn from(rule: HarmonyRule) -> Self {
        Process::Harmony(rule)
    }
}

impl From<SyllabifyRule> for Process {
    fn from(rule: SyllabifyRule) -> Self {
        Process::Syllabify(rule)
    }
}

impl From<StressRule> for Process {
    fn from(rule: StressRule) -> Self {
        Process::Stress(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use crate::ipa::default_ipa_table;
    use crate::word::strategy::arb_word;
    use proptest::prelude::*;

    #[test]
    fn test_dispatch_matches_variant() {
        let table = default_ipa_table();
        let word = table.decode("tatata").unwrap();
        let stress = StressRule::default_placement();
        assert_eq!(Process::from(stress).apply(&word), stress.apply(&word));
        assert_eq!(Process::from(stress).kind(), "acente");
    }

    #[test]
    fn test_identity_process() {
        let table = default_ipa_table();
        let word = table.decode("ˈanta").unwrap();
        assert_eq!(Process::from(SegmentRule::identity()).apply(&word), word);
    }

    #[test]
    fn test_serde_tagging() {
        let process = Process::from(SyllabifyRule::new(2.0, -1));
        let json = serde_json::to_string(&process).unwrap();
        assert!(json.contains("\"kind\":\"syllabify\""));
        let back: Process = serde_json::from_str(&json).unwrap();
        assert_eq!(back, process);
    }

    proptest! {
        #[test]
        fn test_unmatched_source_is_noop(pick in any::<prop::sample::Index>(), input in arb_word(10)) {
            let rules: Vec<&SegmentRule> = default_catalog()
                .iter()
                .filter_map(|e| match &e.process {
                    Process::Segment(rule) if !rule.source().is_empty() => Some(rule),
                    _ => None,
                })
                .collect();
            let rule = rules[pick.index(rules.len())];
            let touched = input
                .iter()
                .any(|sound| rule.source().iter().any(|class| class.matches(sound)));
            if !touched {
                prop_assert_eq!(rule.apply(&input), input);
            }
        }

        #[test]
        fn test_length_changes_only_where_allowed(
            pick in any::<prop::sample::Index>(),
            input in arb_word(10),
        ) {
            let entries = default_catalog().entries();
            let process = &entries[pick.index(entries.len())].process;
            let output = process.apply(&input);
            match process {
                Process::Segment(rule) => {
                    let in_place = rule.target().len() == rule.source().len()
                        && rule
                            .correspondence()
                            .iter()
                            .all(|link| matches!(link, Correspondence::Source(_)));
                    if in_place {
                        prop_assert_eq!(output.len(), input.len());
                    }
                }
                Process::Harmony(_) | Process::Stress(_) => {
                    prop_assert_eq!(output.len(), input.len());
                }
                Process::Syllabify(_) => prop_assert!(output.len() >= input.len()),
            }
        }
    }
}
