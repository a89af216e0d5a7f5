// Feature space: the primitive phonological dimensions and derived qualities.
//
// A `Sound` (see `sound.rs`) is one value from each of eight closed
// dimensions: manner, place, voicing, syllabicity, length, laterality,
// secondary articulation and nasality. `Quality` lists the derived
// predicates (LABIAL, SONORANT, VOWEL, ...) that are computed from those
// values and never stored. `Feature` is the sum of all nine so that rule
// patterns can mix primitives and qualities freely.
//
// Declaration order is significant: `Feature::parse` resolves abbreviated
// names by prefix, searching the qualities first and then each primitive
// dimension in the order listed in `LOOKUP_ORDER`.
//
// See also: `class.rs` for how features are tested and applied,
// `compiler.rs` for the `+NAME`/`-NAME`/`±slot` rule notation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::sound::Sound;

/// Declares a closed dimension enum together with its canonical upper-case
/// labels and an ordered `ALL` table.
macro_rules! dimension {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical rule-notation name, e.g. `NEAR_CLOSE`.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.label().to_ascii_lowercase())
            }
        }
    };
}

dimension! {
    /// Manner of articulation.
    Manner {
        Stop => "STOP",
        Affricate => "AFFRICATE",
        Fricative => "FRICATIVE",
        Nasal => "NASAL",
        Tap => "TAP",
        Trill => "TRILL",
        Close => "CLOSE",
        Open => "OPEN",
        NearClose => "NEAR_CLOSE",
        NearOpen => "NEAR_OPEN",
        CloseMid => "CLOSE_MID",
        OpenMid => "OPEN_MID",
        Click => "CLICK",
    }
}

dimension! {
    /// Place of articulation. The last two are double articulations.
    Place {
        Bilabial => "BILABIAL",
        Labiodental => "LABIODENTAL",
        Linguolabial => "LINGUOLABIAL",
        Dental => "DENTAL",
        Alveolar => "ALVEOLAR",
        Postalveolar => "POSTALVEOLAR",
        Retroflex => "RETROFLEX",
        Palatal => "PALATAL",
        Central => "CENTRAL",
        Velar => "VELAR",
        Uvular => "UVULAR",
        Epiglottal => "EPIGLOTTAL",
        Glottal => "GLOTTAL",
        Labiocoronal => "LABIOCORONAL",
        Labiovelar => "LABIOVELAR",
    }
}

dimension! {
    /// Phonation. `Ejective` on a vowel marks a vowel that was raised past
    /// the top of the height scale and should be diphthongized.
    Voicing {
        Voiced => "VOICED",
        Breathy => "BREATHY",
        Tenuis => "TENUIS",
        Aspirated => "ASPIRATED",
        Ejective => "EJECTIVE",
    }
}

dimension! {
    /// Syllabicity doubles as the stress level of a syllable nucleus.
    Syllabicity {
        PrimaryStressed => "PRIMARY_STRESSED",
        SecondaryStressed => "SECONDARY_STRESSED",
        Unstressed => "UNSTRESSED",
        Nonsyllabic => "NONSYLLABIC",
    }
}

dimension! {
    Length {
        Long => "LONG",
        Short => "SHORT",
    }
}

dimension! {
    Laterality {
        Lateral => "LATERAL",
        Median => "MEDIAN",
    }
}

dimension! {
    /// Secondary articulation. `Unrounded` is the absence of one.
    Secondary {
        Unrounded => "UNROUNDED",
        Labialized => "LABIALIZED",
        Palatalized => "PALATALIZED",
        Velarized => "VELARIZED",
        Pharyngealized => "PHARYNGEALIZED",
    }
}

dimension! {
    Nasality {
        Nasalized => "NASALIZED",
        Oral => "ORAL",
    }
}

dimension! {
    /// Derived predicates over a whole sound.
    ///
    /// Most are testable in rule patterns; only a subset can be applied in
    /// a rule target (see `is_appliable`). `Raised` and `Lowered` are
    /// contextual: they only make sense as targets and resolve against the
    /// sound being changed (see `resolve_contextual`).
    Quality {
        Labial => "LABIAL",
        Coronal => "CORONAL",
        Dorsal => "DORSAL",
        Guttural => "GUTTURAL",
        Alveolar => "ALVEOLAR",
        Nasal => "NASAL",
        Continuant => "CONTINUANT",
        Occlusive => "OCCLUSIVE",
        Sonorant => "SONORANT",
        Obstruent => "OBSTRUENT",
        Vibrant => "VIBRANT",
        High => "HIGH",
        Mid => "MID",
        Low => "LOW",
        Raised => "RAISED",
        Lowered => "LOWERED",
        Tense => "TENSE",
        Lax => "LAX",
        Palatal => "PALATAL",
        Velar => "VELAR",
        Pharyngeal => "PHARYNGEAL",
        Sibilant => "SIBILANT",
        Rhotic => "RHOTIC",
        Liquid => "LIQUID",
        Wibbly => "WIBBLY",
        Vocoid => "VOCOID",
        Glide => "GLIDE",
        Vowel => "VOWEL",
        Sordid => "SORDID",
        Stressed => "STRESSED",
        Syllabic => "SYLLABIC",
        Spoken => "SPOKEN",
    }
}

impl Manner {
    /// Rank on the sonority scale. Vowel heights sit at 4 and above, so
    /// `sonority() >= 4.0` is the approximant/vowel threshold used by the
    /// derived predicates.
    pub fn sonority(self) -> f64 {
        match self {
            Manner::Stop => 0.0,
            Manner::Affricate | Manner::Fricative => 1.0,
            Manner::Nasal => 2.0,
            Manner::Tap | Manner::Trill => 3.0,
            Manner::Close | Manner::NearClose => 4.0,
            Manner::CloseMid | Manner::OpenMid => 4.1,
            Manner::Open | Manner::NearOpen => 4.2,
            Manner::Click => -1.0,
        }
    }

    /// True for the lax vowel heights.
    pub fn is_lax(self) -> bool {
        matches!(self, Manner::NearClose | Manner::OpenMid | Manner::NearOpen)
    }
}

/// The active articulator that a place of articulation uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Articulator {
    Lips,
    Tongue,
    Dorsum,
    Pharynx,
    Multiple,
}

impl Place {
    pub fn articulator(self) -> Articulator {
        match self {
            Place::Bilabial | Place::Labiodental => Articulator::Lips,
            Place::Linguolabial
            | Place::Dental
            | Place::Alveolar
            | Place::Postalveolar
            | Place::Retroflex => Articulator::Tongue,
            Place::Palatal | Place::Central | Place::Velar | Place::Uvular => Articulator::Dorsum,
            Place::Epiglottal | Place::Glottal => Articulator::Pharynx,
            Place::Labiocoronal | Place::Labiovelar => Articulator::Multiple,
        }
    }
}

impl Quality {
    /// Whether the quality may appear in a rule target. Each of these has a
    /// defined way to push a sound into the class.
    pub fn is_appliable(self) -> bool {
        matches!(
            self,
            Quality::Alveolar
                | Quality::Nasal
                | Quality::High
                | Quality::Mid
                | Quality::Low
                | Quality::Raised
                | Quality::Lowered
                | Quality::Tense
                | Quality::Lax
                | Quality::Palatal
                | Quality::Velar
                | Quality::Syllabic
        )
    }

    /// Whether the quality may appear in a pattern or context.
    pub fn is_testable(self) -> bool {
        !self.is_contextual()
    }

    /// `Raised` and `Lowered` mean different things depending on the sound
    /// they are applied to.
    pub fn is_contextual(self) -> bool {
        matches!(self, Quality::Raised | Quality::Lowered)
    }
}

// ---------------------------------------------------------------------------
// Feature: the union of every dimension plus the derived qualities
// ---------------------------------------------------------------------------

/// One of the eight stored dimensions. Used to track which parts of a
/// sound a rule has set explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimension {
    Manner,
    Place,
    Voicing,
    Syllabicity,
    Length,
    Laterality,
    Secondary,
    Nasality,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Manner(Manner),
    Place(Place),
    Voicing(Voicing),
    Syllabicity(Syllabicity),
    Length(Length),
    Laterality(Laterality),
    Secondary(Secondary),
    Nasality(Nasality),
    Quality(Quality),
}

macro_rules! feature_from {
    ($($dim:ident),+) => {
        $(impl From<$dim> for Feature {
            fn from(value: $dim) -> Self {
                Feature::$dim(value)
            }
        })+
    };
}

feature_from!(Manner, Place, Voicing, Syllabicity, Length, Laterality, Secondary, Nasality, Quality);

impl Feature {
    pub fn label(self) -> &'static str {
        match self {
            Feature::Manner(v) => v.label(),
            Feature::Place(v) => v.label(),
            Feature::Voicing(v) => v.label(),
            Feature::Syllabicity(v) => v.label(),
            Feature::Length(v) => v.label(),
            Feature::Laterality(v) => v.label(),
            Feature::Secondary(v) => v.label(),
            Feature::Nasality(v) => v.label(),
            Feature::Quality(v) => v.label(),
        }
    }

    /// The stored dimension this feature sets, or `None` for qualities.
    pub fn dimension(self) -> Option<Dimension> {
        match self {
            Feature::Manner(_) => Some(Dimension::Manner),
            Feature::Place(_) => Some(Dimension::Place),
            Feature::Voicing(_) => Some(Dimension::Voicing),
            Feature::Syllabicity(_) => Some(Dimension::Syllabicity),
            Feature::Length(_) => Some(Dimension::Length),
            Feature::Laterality(_) => Some(Dimension::Laterality),
            Feature::Secondary(_) => Some(Dimension::Secondary),
            Feature::Nasality(_) => Some(Dimension::Nasality),
            Feature::Quality(_) => None,
        }
    }

    /// Whether this feature can be written in a rule target.
    pub fn is_appliable(self) -> bool {
        match self {
            Feature::Quality(q) => q.is_appliable(),
            _ => true,
        }
    }

    /// Whether this feature can be written in a rule pattern or context.
    pub fn is_testable(self) -> bool {
        match self {
            Feature::Quality(q) => q.is_testable(),
            _ => true,
        }
    }

    /// Resolve a rule-notation feature name.
    ///
    /// Names are case-insensitive and may be abbreviated to any unambiguous
    /// prefix; ties go to the first match in lookup order (qualities, then
    /// place, manner, voicing, syllabicity, length, laterality, nasality,
    /// secondary). An exact name always wins over a longer name it is a
    /// prefix of. A leading `!` skips the qualities, so `!NASAL` is the
    /// nasal manner while `NASAL` is the derived predicate.
    pub fn parse(name: &str) -> Option<Feature> {
        let (skip_qualities, name) = match name.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, name),
        };
        if name.is_empty() {
            return None;
        }
        let name = name.to_ascii_uppercase();
        let candidates = lookup_order(skip_qualities);
        candidates
            .clone()
            .find(|f| f.label() == name)
            .or_else(|| candidates.clone().find(|f| f.label().starts_with(&name)))
    }
}

fn lookup_order(skip_qualities: bool) -> impl Iterator<Item = Feature> + Clone {
    let quality_count = if skip_qualities { 0 } else { Quality::ALL.len() };
    Quality::ALL
        .iter()
        .copied()
        .take(quality_count)
        .map(Feature::Quality)
        .chain(Place::ALL.iter().copied().map(Feature::Place))
        .chain(Manner::ALL.iter().copied().map(Feature::Manner))
        .chain(Voicing::ALL.iter().copied().map(Feature::Voicing))
        .chain(Syllabicity::ALL.iter().copied().map(Feature::Syllabicity))
        .chain(Length::ALL.iter().copied().map(Feature::Length))
        .chain(Laterality::ALL.iter().copied().map(Feature::Laterality))
        .chain(Nasality::ALL.iter().copied().map(Feature::Nasality))
        .chain(Secondary::ALL.iter().copied().map(Feature::Secondary))
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Copy slots and contextual resolution
// ---------------------------------------------------------------------------

/// A dimension that a rule target copies from a reference sound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopySlot {
    Place,
    Voicing,
    Secondary,
}

impl CopySlot {
    /// Accepts both the English slot names and the historical short forms
    /// (`loke`, `voze`, `minorLoke`) used by older rule files.
    pub fn parse(name: &str) -> Option<CopySlot> {
        match name.to_ascii_lowercase().as_str() {
            "place" | "loke" => Some(CopySlot::Place),
            "voicing" | "voice" | "voze" => Some(CopySlot::Voicing),
            "secondary" | "minorloke" => Some(CopySlot::Secondary),
            _ => None,
        }
    }

    pub fn dimension(self) -> Dimension {
        match self {
            CopySlot::Place => Dimension::Place,
            CopySlot::Voicing => Dimension::Voicing,
            CopySlot::Secondary => Dimension::Secondary,
        }
    }
}

impl fmt::Display for CopySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CopySlot::Place => "place",
            CopySlot::Voicing => "voicing",
            CopySlot::Secondary => "secondary",
        })
    }
}

/// Outcome of resolving a possibly-contextual feature against a sound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Apply this concrete feature.
    Feature(Feature),
    /// A high vowel cannot be raised further. The change is recorded by
    /// marking the vowel with `Voicing::Ejective`.
    NeedsDiphthongization,
    /// The feature has no meaning for this sound; the change is vetoed.
    Unresolvable,
}

/// Turn `RAISED`/`LOWERED` into the next step on the height scale for
/// `sound`. Every other feature resolves to itself.
pub fn resolve_contextual(feature: Feature, sound: &Sound) -> Resolution {
    match feature {
        Feature::Quality(Quality::Raised) => {
            if sound.has(Quality::Low) {
                Resolution::Feature(Quality::Mid.into())
            } else if sound.has(Quality::Mid) {
                Resolution::Feature(Quality::High.into())
            } else if sound.has(Quality::High) {
                Resolution::NeedsDiphthongization
            } else {
                Resolution::Unresolvable
            }
        }
        Feature::Quality(Quality::Lowered) => {
            if sound.has(Quality::High) {
                Resolution::Feature(Quality::Mid.into())
            } else if sound.has(Quality::Vocoid) {
                Resolution::Feature(Quality::Low.into())
            } else {
                Resolution::Unresolvable
            }
        }
        other => Resolution::Feature(other),
    }
}
