// Weighted catalog of compiled processes.
//
// Built once by the rule compiler and never mutated. Each entry keeps the
// rule-file line it came from so that a change seen in a lineage can be
// traced back to its source text. Weights are per-generation chances in
// `[0, 1]`; `draw` also treats them as relative weights for picking a
// single process.
//
// `default_catalog()` compiles the embedded `data/sound_changes.txt` on
// first use and shares the result.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::process::Process;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub weight: f64,
    pub process: Process,
    /// 1-based line of the rule text.
    pub line: usize,
    /// The comment above the rule, if any.
    pub note: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Catalog { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, in rule-file order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogEntry> {
        self.entries.iter()
    }

    pub fn total_weight(&self) -> f64 {
        self.entries.iter().map(|e| e.weight).sum()
    }

    /// Pick one entry with probability proportional to its weight. `None`
    /// if no entry has positive weight.
    pub fn draw_entry<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&CatalogEntry> {
        let total = self.total_weight();
        if total <= 0.0 {
            return None;
        }
        let mut remaining = rng.gen_range(0.0..total);
        let mut last = None;
        for entry in self.entries.iter().filter(|e| e.weight > 0.0) {
            if remaining < entry.weight {
                return Some(entry);
            }
            remaining -= entry.weight;
            last = Some(entry);
        }
        // Rounding can leave a sliver past the last entry.
        last
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Process> {
        self.draw_entry(rng).map(|entry| &entry.process)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogEntry;
    type IntoIter = std::slice::Iter<'a, CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// The catalog compiled from the embedded `data/sound_changes.txt`.
///
/// Panics if the embedded rules fail to compile, which the tests rule out.
pub fn default_catalog() -> &'static Catalog {
    static CATALOG: OnceLock<Catalog> = OnceLock::new();
    CATALOG.get_or_init(|| {
        let text = include_str!("../../data/sound_changes.txt");
        crate::compiler::compile(text).expect("embedded sound_changes.txt is malformed")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{HarmonyAxis, HarmonyRule, SyllabifyRule};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn entry(weight: f64, process: Process) -> CatalogEntry {
        CatalogEntry {
            weight,
            process,
            line: 1,
            note: None,
        }
    }

    #[test]
    fn test_empty_catalog_draws_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(Catalog::default().draw(&mut rng).is_none());
        let weightless = Catalog::new(vec![entry(
            0.0,
            SyllabifyRule::new(4.0, 0).into(),
        )]);
        assert!(weightless.draw(&mut rng).is_none());
    }

    #[test]
    fn test_draw_skips_weightless_entries() {
        let harmony: Process = HarmonyRule::new(HarmonyAxis::Round, true).into();
        let catalog = Catalog::new(vec![
            entry(0.0, SyllabifyRule::new(4.0, 0).into()),
            entry(0.5, harmony.clone()),
            entry(0.0, SyllabifyRule::new(2.0, 1).into()),
        ]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(catalog.draw(&mut rng), Some(&harmony));
        }
    }

    #[test]
    fn test_draw_is_proportional() {
        let light: Process = SyllabifyRule::new(4.0, 0).into();
        let heavy: Process = SyllabifyRule::new(2.0, 0).into();
        let catalog = Catalog::new(vec![entry(0.1, light), entry(0.3, heavy.clone())]);
        let mut rng = StdRng::seed_from_u64(42);
        let draws = 4000;
        let heavy_count = (0..draws)
            .filter(|_| catalog.draw(&mut rng) == Some(&heavy))
            .count();
        let share = heavy_count as f64 / draws as f64;
        assert!((share - 0.75).abs() < 0.05, "heavy share was {share}");
    }

    #[test]
    fn test_draw_is_deterministic_per_seed() {
        let catalog = default_catalog();
        let lines = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..20)
                .map(|_| catalog.draw_entry(&mut rng).map(|e| e.line))
                .collect::<Vec<_>>()
        };
        assert_eq!(lines(3), lines(3));
    }

    #[test]
    fn test_default_catalog_loads() {
        let catalog = default_catalog();
        assert!(!catalog.is_empty());
        assert!(catalog.iter().all(|e| e.weight > 0.0 && e.weight <= 1.0));
        assert!(catalog.iter().all(|e| e.line > 0));
    }
}
