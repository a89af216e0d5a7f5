// Sound: one fully specified segment, or a pause.
//
// `Phone` carries one value from each primitive dimension in `feature.rs`.
// `Sound` wraps it together with `Pause`, the word-boundary sentinel. A
// pause has no features at all: `has` is false for every feature, which is
// what lets a class of purely negative features (`#`, or `[-SPOKEN]`) match
// a word edge.
//
// Derived qualities are computed here from the stored tuple. Nothing
// about a quality is cached, so a Sound is just its eight values and
// equality of Sounds is equality of those values (equivalently, of `key`).
//
// See also: `class.rs` for `FeatureClass::instantiate`, which is the only
// way a Sound changes, and `ipa.rs` for turning Sounds into text.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::class::FeatureClass;
use crate::feature::{
    Articulator, Dimension, Feature, Laterality, Length, Manner, Nasality, Place, Quality,
    Secondary, Syllabicity, Voicing,
};

/// A segment with a value in every primitive dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Phone {
    pub manner: Manner,
    pub place: Place,
    pub voicing: Voicing,
    pub syllabicity: Syllabicity,
    pub length: Length,
    pub laterality: Laterality,
    pub secondary: Secondary,
    pub nasality: Nasality,
}

impl Phone {
    /// A short, oral, median, unrounded, voiced, nonsyllabic segment.
    pub fn new(manner: Manner, place: Place) -> Phone {
        Phone {
            manner,
            place,
            voicing: Voicing::Voiced,
            syllabicity: Syllabicity::Nonsyllabic,
            length: Length::Short,
            laterality: Laterality::Median,
            secondary: Secondary::Unrounded,
            nasality: Nasality::Oral,
        }
    }

    /// Overwrite one primitive dimension. Qualities are not stored and are
    /// ignored here; `FeatureClass` decides how a quality maps onto
    /// primitives.
    pub fn assign(&mut self, feature: Feature) {
        match feature {
            Feature::Manner(v) => self.manner = v,
            Feature::Place(v) => self.place = v,
            Feature::Voicing(v) => self.voicing = v,
            Feature::Syllabicity(v) => self.syllabicity = v,
            Feature::Length(v) => self.length = v,
            Feature::Laterality(v) => self.laterality = v,
            Feature::Secondary(v) => self.secondary = v,
            Feature::Nasality(v) => self.nasality = v,
            Feature::Quality(_) => {}
        }
    }

    /// Copy one dimension's value from `other`.
    pub fn copy_dimension(&mut self, other: &Phone, dimension: Dimension) {
        match dimension {
            Dimension::Manner => self.manner = other.manner,
            Dimension::Place => self.place = other.place,
            Dimension::Voicing => self.voicing = other.voicing,
            Dimension::Syllabicity => self.syllabicity = other.syllabicity,
            Dimension::Length => self.length = other.length,
            Dimension::Laterality => self.laterality = other.laterality,
            Dimension::Secondary => self.secondary = other.secondary,
            Dimension::Nasality => self.nasality = other.nasality,
        }
    }

    pub fn differs_in(&self, other: &Phone, dimension: Dimension) -> bool {
        match dimension {
            Dimension::Manner => self.manner != other.manner,
            Dimension::Place => self.place != other.place,
            Dimension::Voicing => self.voicing != other.voicing,
            Dimension::Syllabicity => self.syllabicity != other.syllabicity,
            Dimension::Length => self.length != other.length,
            Dimension::Laterality => self.laterality != other.laterality,
            Dimension::Secondary => self.secondary != other.secondary,
            Dimension::Nasality => self.nasality != other.nasality,
        }
    }

    pub fn has(&self, feature: Feature) -> bool {
        match feature {
            Feature::Manner(v) => self.manner == v,
            Feature::Place(v) => self.place == v,
            Feature::Voicing(v) => self.voicing == v,
            Feature::Syllabicity(v) => self.syllabicity == v,
            Feature::Length(v) => self.length == v,
            Feature::Laterality(v) => self.laterality == v,
            Feature::Secondary(v) => self.secondary == v,
            Feature::Nasality(v) => self.nasality == v,
            Feature::Quality(q) => self.is(q),
        }
    }

    /// Evaluate a derived quality.
    pub fn is(&self, quality: Quality) -> bool {
        let articulator = self.place.articulator();
        let rank = self.manner.sonority();
        match quality {
            Quality::Labial => {
                articulator == Articulator::Lips || self.secondary == Secondary::Labialized
            }
            Quality::Coronal => articulator == Articulator::Tongue,
            Quality::Dorsal => articulator == Articulator::Dorsum,
            Quality::Guttural => {
                articulator == Articulator::Pharynx || self.secondary == Secondary::Pharyngealized
            }
            Quality::Alveolar => {
                self.place == Place::Alveolar
                    || (self.place == Place::Dental && !self.is_sibilant_manner())
            }
            Quality::Nasal => self.manner == Manner::Nasal || self.nasality == Nasality::Nasalized,
            Quality::Continuant => {
                matches!(self.manner, Manner::Fricative | Manner::Trill) || rank >= 4.0
            }
            Quality::Occlusive => !self.is(Quality::Continuant),
            Quality::Sonorant => rank >= 2.0,
            Quality::Obstruent => rank < 2.0,
            Quality::Vibrant => matches!(self.manner, Manner::Tap | Manner::Trill),
            Quality::High => {
                self.is(Quality::Vocoid) && matches!(self.manner, Manner::Close | Manner::NearClose)
            }
            Quality::Mid => {
                self.is(Quality::Vocoid) && matches!(self.manner, Manner::CloseMid | Manner::OpenMid)
            }
            Quality::Low => {
                self.is(Quality::Vocoid) && matches!(self.manner, Manner::NearOpen | Manner::Open)
            }
            Quality::Raised | Quality::Lowered => false,
            Quality::Tense => {
                matches!(self.manner, Manner::Close | Manner::CloseMid | Manner::Open)
            }
            Quality::Lax => self.manner.is_lax(),
            Quality::Palatal => {
                !self.is(Quality::Low)
                    && (matches!(self.place, Place::Palatal | Place::Postalveolar)
                        || self.secondary == Secondary::Palatalized)
            }
            Quality::Velar => {
                !self.is(Quality::Low)
                    && (self.place == Place::Velar || self.secondary == Secondary::Velarized)
            }
            Quality::Pharyngeal => {
                self.place == Place::Epiglottal || self.secondary == Secondary::Pharyngealized
            }
            Quality::Sibilant => {
                self.is_sibilant_manner()
                    && matches!(self.place, Place::Alveolar | Place::Postalveolar)
            }
            Quality::Liquid => {
                self.voicing == Voicing::Voiced
                    && ((rank >= 2.0
                        && self.manner != Manner::Nasal
                        && (articulator == Articulator::Tongue || self.place == Place::Uvular))
                        || (self.manner == Manner::Fricative && self.place == Place::Uvular))
            }
            Quality::Rhotic => self.is(Quality::Liquid) && self.laterality != Laterality::Lateral,
            Quality::Wibbly => {
                self.is(Quality::Labial)
                    && (rank >= 2.0
                        || (self.voicing == Voicing::Voiced && self.manner == Manner::Fricative))
                    && self.syllabicity == Syllabicity::Nonsyllabic
            }
            Quality::Vocoid => {
                rank >= 4.0
                    && self.laterality == Laterality::Median
                    && articulator == Articulator::Dorsum
            }
            Quality::Glide => {
                self.is(Quality::Vocoid) && self.syllabicity == Syllabicity::Nonsyllabic
            }
            Quality::Vowel => {
                self.is(Quality::Vocoid) && self.syllabicity != Syllabicity::Nonsyllabic
            }
            Quality::Sordid => !matches!(self.voicing, Voicing::Voiced | Voicing::Breathy),
            Quality::Stressed => matches!(
                self.syllabicity,
                Syllabicity::PrimaryStressed | Syllabicity::SecondaryStressed
            ),
            Quality::Syllabic => self.syllabicity != Syllabicity::Nonsyllabic,
            Quality::Spoken => true,
        }
    }

    fn is_sibilant_manner(&self) -> bool {
        matches!(self.manner, Manner::Affricate | Manner::Fricative)
    }

    pub fn sonority(&self) -> f64 {
        let mut sonority = self.manner.sonority();
        if self.laterality == Laterality::Lateral {
            sonority -= 1.5;
        }
        if self.voicing == Voicing::Voiced {
            sonority += 0.75;
        }
        if self.is(Quality::Vocoid) {
            sonority += 1.0;
        }
        sonority
    }

    /// Lossless compact encoding: two-letter codes for the small
    /// dimensions followed by the full place and manner names.
    pub fn key(&self) -> String {
        let short = |label: &str| label[..2].to_ascii_lowercase();
        format!(
            "{}{}{}{}{}{} {} {}",
            short(self.syllabicity.label()),
            short(self.length.label()),
            short(self.secondary.label()),
            short(self.nasality.label()),
            short(self.laterality.label()),
            short(self.voicing.label()),
            self.place,
            self.manner,
        )
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {} {}",
            self.voicing,
            self.syllabicity,
            self.length,
            self.laterality,
            self.secondary,
            self.nasality,
            self.place,
            self.manner
        )
    }
}

// ---------------------------------------------------------------------------
// Sound
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sound {
    /// Word boundary or silence.
    Pause,
    Spoken(Phone),
}

impl From<Phone> for Sound {
    fn from(phone: Phone) -> Self {
        Sound::Spoken(phone)
    }
}

impl Sound {
    pub fn phone(&self) -> Option<&Phone> {
        match self {
            Sound::Pause => None,
            Sound::Spoken(phone) => Some(phone),
        }
    }

    pub fn is_pause(&self) -> bool {
        matches!(self, Sound::Pause)
    }

    /// Whether the sound has a primitive value or satisfies a quality. A
    /// pause has nothing.
    pub fn has(&self, feature: impl Into<Feature>) -> bool {
        let feature = feature.into();
        self.phone().is_some_and(|phone| phone.has(feature))
    }

    /// This sound pushed into `feature`, through the same path a rule
    /// target takes. A no-op when the sound already has it or when the
    /// change is impossible.
    pub fn with(&self, feature: impl Into<Feature>) -> Sound {
        let feature = feature.into();
        if self.has(feature) {
            *self
        } else {
            FeatureClass::with_present(vec![feature]).instantiate(self, None)
        }
    }

    /// Sonority rank; a pause is below everything.
    pub fn sonority(&self) -> f64 {
        self.phone().map_or(f64::NEG_INFINITY, Phone::sonority)
    }

    /// A vowel that was raised past the top of the height scale.
    pub fn needs_diphthongization(&self) -> bool {
        self.phone()
            .is_some_and(|p| p.is(Quality::Vocoid) && p.voicing == Voicing::Ejective)
    }

    pub fn key(&self) -> String {
        self.phone().map(Phone::key).unwrap_or_default()
    }
}

impl fmt::Display for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sound::Pause => f.write_str("pause"),
            Sound::Spoken(phone) => phone.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipa::default_ipa_table;

    fn ipa(symbol: &str) -> Sound {
        default_ipa_table()
            .symbol(symbol)
            .unwrap_or_else(|| panic!("no symbol {symbol}"))
    }

    #[test]
    fn test_primitive_membership() {
        assert!(ipa("t").has(Manner::Stop));
        assert!(ipa("ɸ").has(Place::Bilabial));
        assert!(!ipa("f").has(Place::Bilabial));
        assert!(ipa("t").has(Quality::Coronal));
        assert!(!ipa("c").has(Quality::Coronal));
    }

    #[test]
    fn test_nasal_quality() {
        assert!(ipa("n").has(Quality::Nasal));
        assert!(!ipa("t").has(Quality::Nasal));
        assert!(ipa("a").with(Nasality::Nasalized).has(Quality::Nasal));
    }

    #[test]
    fn test_obstruents() {
        assert!(ipa("t").has(Quality::Obstruent));
        assert!(!ipa("r").has(Quality::Obstruent));
        assert!(!ipa("j").has(Quality::Obstruent));
    }

    #[test]
    fn test_sibilants() {
        assert!(ipa("s").has(Quality::Sibilant));
        assert!(ipa("ʃ").has(Quality::Sibilant));
        assert!(!ipa("θ").has(Quality::Sibilant));
        assert!(!ipa("ɬ").has(Quality::Sibilant));
        assert!(!ipa("t").has(Quality::Sibilant));
    }

    #[test]
    fn test_glides() {
        assert!(ipa("j").has(Quality::Glide));
        assert!(!ipa("i").has(Quality::Glide));
        assert!(ipa("i").has(Quality::Vowel));
        assert!(!ipa("ɹ").with(Syllabicity::Unstressed).has(Quality::Glide));
    }

    #[test]
    fn test_liquids_and_rhotics() {
        assert!(ipa("l").has(Quality::Liquid));
        assert!(!ipa("l").has(Quality::Rhotic));
        assert!(ipa("r").has(Quality::Rhotic));
        assert!(ipa("ʁ").has(Quality::Rhotic));
        assert!(!ipa("n").has(Quality::Liquid));
    }

    #[test]
    fn test_heights() {
        assert!(ipa("i").has(Quality::High));
        assert!(ipa("e").has(Quality::Mid));
        assert!(ipa("a").has(Quality::Low));
        assert!(ipa("ɪ").has(Quality::Lax));
        assert!(ipa("i").has(Quality::Tense));
        // Low vowels are neither palatal nor velar.
        assert!(!ipa("a").has(Quality::Palatal));
        assert!(!ipa("ɑ").has(Quality::Velar));
    }

    #[test]
    fn test_pause_has_nothing() {
        assert!(!Sound::Pause.has(Quality::Spoken));
        assert!(!Sound::Pause.has(Manner::Stop));
        assert_eq!(Sound::Pause.sonority(), f64::NEG_INFINITY);
        assert_eq!(Sound::Pause.to_string(), "pause");
        assert_eq!(Sound::Pause.with(Quality::Nasal), Sound::Pause);
    }

    #[test]
    fn test_sonority_order() {
        let order = ["t", "s", "n", "l", "r", "j", "a"];
        for pair in order.windows(2) {
            assert!(
                ipa(pair[0]).sonority() < ipa(pair[1]).sonority(),
                "{} should be less sonorous than {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_key_distinguishes_sounds() {
        assert_ne!(ipa("t").key(), ipa("d").key());
        assert_ne!(ipa("i").key(), ipa("j").key());
        assert_eq!(ipa("t").key(), ipa("t").key());
        assert_eq!(Sound::Pause.key(), "");
    }

    #[test]
    fn test_with_is_noop_when_present() {
        let t = ipa("t");
        assert_eq!(t.with(Manner::Stop), t);
        assert_eq!(ipa("d").with(Voicing::Tenuis), t);
    }

    #[test]
    fn test_display() {
        let text = ipa("t").to_string();
        assert!(text.contains("dental"));
        assert!(text.contains("stop"));
        assert!(text.contains("tenuis"));
    }
}
