// Lineages: chains of dialects descended from a proto-language.
//
// A proto lineage has no changes of its own; it only places default stress
// on the words it is given. Each descendant keeps a reference to its parent
// and a list of changes picked from the catalog when it split off: every
// entry is kept independently with probability equal to its weight, so
// common changes recur across sister dialects and rare ones stay rare. A
// word is aged by running it through the whole chain, oldest changes
// first.
//
// Dialects that share an ancestor `DEVIATION_TIME` splits up (their
// macrolanguage) are mutually intelligible.
//
// All randomness comes from the `Rng` passed to `descend`/`evolve`. Given
// the same seed and catalog, the same lineage comes out.

use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info, trace};

use crate::catalog::{Catalog, CatalogEntry};
use crate::process::StressRule;
use crate::word::Word;

/// Splits after which a dialect no longer understands its cousins.
pub const DEVIATION_TIME: usize = 2;

#[derive(Debug)]
pub struct Lineage {
    parent: Option<Arc<Lineage>>,
    changes: Vec<CatalogEntry>,
    depth: usize,
    proto_stress: Option<StressRule>,
}

impl Lineage {
    /// A proto-language that stresses its words with
    /// `StressRule::default_placement()`.
    pub fn proto() -> Arc<Lineage> {
        Lineage::proto_with_stress(Some(StressRule::default_placement()))
    }

    /// A proto-language with the given stress system, or none.
    pub fn proto_with_stress(stress: Option<StressRule>) -> Arc<Lineage> {
        Arc::new(Lineage {
            parent: None,
            changes: Vec::new(),
            depth: 0,
            proto_stress: stress,
        })
    }

    /// Split off a daughter dialect, picking its changes from `catalog`.
    pub fn descend<R: Rng + ?Sized>(self: &Arc<Self>, catalog: &Catalog, rng: &mut R) -> Arc<Lineage> {
        let changes: Vec<CatalogEntry> = catalog
            .iter()
            .filter(|entry| rng.gen_bool(entry.weight.clamp(0.0, 1.0)))
            .cloned()
            .collect();
        let depth = self.depth + 1;
        info!(depth, changes = changes.len(), "new dialect");
        for entry in &changes {
            trace!(depth, line = entry.line, process = %entry.process, "picked change");
        }
        Arc::new(Lineage {
            parent: Some(Arc::clone(self)),
            changes,
            depth,
            proto_stress: self.proto_stress,
        })
    }

    /// Age a proto-language word down to this dialect.
    pub fn apply(&self, word: &Word) -> Word {
        let inherited = match (&self.parent, &self.proto_stress) {
            (Some(parent), _) => parent.apply(word),
            (None, Some(stress)) => stress.apply(word),
            (None, None) => word.clone(),
        };
        self.changes.iter().fold(inherited, |word, entry| {
            let changed = entry.process.apply(&word);
            if changed != word {
                debug!(
                    depth = self.depth,
                    line = entry.line,
                    process = %entry.process,
                    "sound change applied"
                );
            }
            changed
        })
    }

    /// The lineage `n` generations up, or the proto-language if the chain
    /// is shorter than that.
    pub fn ancestor(self: &Arc<Self>, n: usize) -> Arc<Lineage> {
        let mut current = Arc::clone(self);
        for _ in 0..n {
            let Some(parent) = current.parent.clone() else {
                break;
            };
            current = parent;
        }
        current
    }

    /// The ancestor that groups this dialect with the ones it can
    /// understand.
    pub fn macrolanguage(self: &Arc<Self>) -> Arc<Lineage> {
        self.ancestor(DEVIATION_TIME)
    }

    pub fn is_intelligible(self: &Arc<Self>, other: &Arc<Lineage>) -> bool {
        Arc::ptr_eq(&self.macrolanguage(), &other.macrolanguage())
    }

    /// Generations since the proto-language.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn parent(&self) -> Option<&Arc<Lineage>> {
        self.parent.as_ref()
    }

    /// The changes this dialect added on top of its parent, in catalog
    /// order.
    pub fn changes(&self) -> &[CatalogEntry] {
        &self.changes
    }
}

/// Apply `generations` processes drawn from `catalog` to `word`, one per
/// generation. Returns the starting word followed by the word after each
/// generation.
pub fn evolve<R: Rng + ?Sized>(
    word: &Word,
    catalog: &Catalog,
    generations: usize,
    rng: &mut R,
) -> Vec<Word> {
    let mut history = Vec::with_capacity(generations + 1);
    history.push(word.clone());
    for generation in 0..generations {
        let current = &history[history.len() - 1];
        let next = match catalog.draw_entry(rng) {
            Some(entry) => {
                debug!(generation, line = entry.line, process = %entry.process, "drawn change");
                entry.process.apply(current)
            }
            None => current.clone(),
        };
        history.push(next);
    }
    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use crate::compiler::compile;
    use crate::ipa::default_ipa_table;
    use crate::word::strategy::arb_word;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn word(text: &str) -> Word {
        default_ipa_table().decode(text).unwrap()
    }

    fn text(word: &Word) -> String {
        default_ipa_table().encode(word)
    }

    #[test]
    fn test_proto_places_default_stress() {
        assert_eq!(text(&Lineage::proto().apply(&word("tatata"))), "tatˈata");
        let unstressed = Lineage::proto_with_stress(None);
        assert_eq!(text(&unstressed.apply(&word("tatata"))), "tatata");
    }

    #[test]
    fn test_descend_keeps_certain_and_drops_impossible_changes() {
        let catalog = compile("1000 harmonia front vowel\n0 harmonia round vowel\n").unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let child = Lineage::proto().descend(&catalog, &mut rng);
        assert_eq!(child.changes().len(), 1);
        assert_eq!(child.changes()[0].line, 1);
        assert_eq!(child.depth(), 1);
    }

    #[test]
    fn test_changes_apply_oldest_first() {
        let voicing = compile("1000 mute [ +OBSTRUENT ] > [ +VOICED ] / [ +VOWEL ] _ [ +VOWEL ]")
            .unwrap();
        let lenition = compile("1000 mute [ +VOICED +OBSTRUENT ] > [ +FRICATIVE ] / [ +VOWEL ] _")
            .unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let root = Lineage::proto_with_stress(None);
        let parent = root.descend(&voicing, &mut rng);
        let child = parent.descend(&lenition, &mut rng);
        assert_eq!(text(&parent.apply(&word("ata"))), "ada");
        assert_eq!(text(&child.apply(&word("ata"))), "aða");
    }

    #[test]
    fn test_ancestor() {
        let mut rng = StdRng::seed_from_u64(5);
        let catalog = Catalog::default();
        let root = Lineage::proto();
        let parent = root.descend(&catalog, &mut rng);
        let child = parent.descend(&catalog, &mut rng);
        assert_eq!(child.depth(), 2);
        assert!(Arc::ptr_eq(&child.ancestor(0), &child));
        assert!(Arc::ptr_eq(&child.ancestor(1), &parent));
        assert!(Arc::ptr_eq(&child.ancestor(2), &root));
        assert!(Arc::ptr_eq(&child.ancestor(9), &root));
        assert!(root.parent().is_none());
    }

    #[test]
    fn test_intelligibility_follows_macrolanguage() {
        let mut rng = StdRng::seed_from_u64(3);
        let catalog = Catalog::default();
        let root = Lineage::proto();
        let west = root.descend(&catalog, &mut rng);
        let east = root.descend(&catalog, &mut rng);
        let west_a = west.descend(&catalog, &mut rng);
        let west_a_1 = west_a.descend(&catalog, &mut rng);
        let west_b_1 = west.descend(&catalog, &mut rng).descend(&catalog, &mut rng);
        let east_1 = east.descend(&catalog, &mut rng).descend(&catalog, &mut rng);

        assert!(Arc::ptr_eq(&west_a_1.macrolanguage(), &west));
        assert!(Arc::ptr_eq(&west.macrolanguage(), &root));
        assert!(west.is_intelligible(&east));
        assert!(west_a.is_intelligible(&east));
        assert!(west_a_1.is_intelligible(&west_b_1));
        assert!(!west_a_1.is_intelligible(&east_1));
        assert!(!west_a_1.is_intelligible(&west_a));
        assert!(west_a_1.is_intelligible(&west_a_1));
    }

    #[test]
    fn test_evolve_history() {
        let mut rng = StdRng::seed_from_u64(9);
        let start = word("ˈkanta");
        let history = evolve(&start, default_catalog(), 12, &mut rng);
        assert_eq!(history.len(), 13);
        assert_eq!(history[0], start);
    }

    #[test]
    fn test_evolve_with_empty_catalog_is_still() {
        let mut rng = StdRng::seed_from_u64(9);
        let start = word("ˈkanta");
        let history = evolve(&start, &Catalog::default(), 3, &mut rng);
        assert!(history.iter().all(|w| *w == start));
    }

    proptest! {
        #[test]
        fn test_same_seed_same_dialect(seed in any::<u64>(), input in arb_word(10)) {
            let descend = |seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                let parent = Lineage::proto().descend(default_catalog(), &mut rng);
                parent.descend(default_catalog(), &mut rng)
            };
            let (first, second) = (descend(seed), descend(seed));
            prop_assert_eq!(first.changes(), second.changes());
            prop_assert_eq!(first.apply(&input), second.apply(&input));
        }

        #[test]
        fn test_same_seed_same_history(seed in any::<u64>(), input in arb_word(10)) {
            let run = |seed| evolve(&input, default_catalog(), 8, &mut StdRng::seed_from_u64(seed));
            prop_assert_eq!(run(seed), run(seed));
        }
    }
}
