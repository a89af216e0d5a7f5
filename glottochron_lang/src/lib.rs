// Phonological feature model and historical sound-change engine.
//
// Ages the words of a procedurally generated proto-language into
// descendant dialects through weighted, internally consistent sound
// changes. Sounds are bundles of articulatory features; rules match and
// rewrite them through feature classes; a compiler turns a plain-text
// rule file into a weighted catalog that lineages draw from.
//
// Architecture:
// - `feature.rs`: `Feature` and its dimensions (`Manner`, `Place`, ...),
//   the derived `Quality` predicates, and copy slots
// - `sound.rs`: `Phone` (one feature bundle) and `Sound` (phone or pause)
// - `class.rs`: `FeatureClass` matching/instantiation and phonotactic
//   normalization
// - `word.rs`: `Word`, an immutable sequence of sounds
// - `ipa.rs`: `IpaTable`, decoding and encoding IPA text
// - `process/`: `Process` and its four kinds (segment, harmony,
//   syllabify, stress)
// - `compiler.rs`: `RuleCompiler`, rule text to `Catalog`
// - `catalog.rs`: `Catalog`, the weighted list of compiled processes
// - `lineage.rs`: `Lineage` and `evolve`, descendant dialects
// - `config.rs`: `DriftConfig` for the `drift` binary
// - `error.rs`: error types
//
// The IPA table and the default rule catalog are embedded from `data/` at
// compile time (`default_ipa_table()`, `default_catalog()`), following the
// same JSON-in, typed-struct-out pattern throughout.
//
// Determinism constraint: applying a process is a pure function of its
// input. All randomness comes from an `Rng` the caller passes in.

pub mod catalog;
pub mod class;
pub mod compiler;
pub mod config;
pub mod error;
pub mod feature;
pub mod ipa;
pub mod lineage;
pub mod process;
pub mod sound;
pub mod word;

// Re-export key types at crate root for convenience.
pub use catalog::{Catalog, CatalogEntry, default_catalog};
pub use class::FeatureClass;
pub use compiler::{RuleCompiler, compile};
pub use config::DriftConfig;
pub use error::{ConfigError, IpaError, RuleError, ShapeError};
pub use feature::{CopySlot, Feature, Quality};
pub use ipa::{IpaTable, default_ipa_table};
pub use lineage::{DEVIATION_TIME, Lineage, evolve};
pub use process::{
    HarmonyAxis, HarmonyRule, Process, SegmentRule, StressRule, SyllabifyRule, TailPolicy,
};
pub use sound::{Phone, Sound};
pub use word::Word;
