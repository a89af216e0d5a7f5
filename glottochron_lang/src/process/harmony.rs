// Vowel (and optionally consonant) harmony along one binary axis.
//
// The first participating segment that sits on either pole of the axis
// fixes the word's value; every later participating segment on the other
// pole is pushed over with `Sound::with`. Segments on neither pole are
// transparent. With `vowels_only`, consonants neither set nor receive the
// value.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::feature::{Feature, Place, Quality, Secondary};
use crate::sound::Sound;
use crate::word::Word;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarmonyAxis {
    /// Back (velar) against front (palatal).
    Front,
    /// Low against high.
    Height,
    /// Unrounded against rounded.
    Round,
    /// Lax against tense.
    Tense,
}

impl HarmonyAxis {
    /// The two poles, in the order they are looked for.
    pub fn poles(self) -> [Feature; 2] {
        match self {
            HarmonyAxis::Front => [Place::Velar.into(), Place::Palatal.into()],
            HarmonyAxis::Height => [Quality::Low.into(), Quality::High.into()],
            HarmonyAxis::Round => [Secondary::Unrounded.into(), Secondary::Labialized.into()],
            HarmonyAxis::Tense => [Quality::Lax.into(), Quality::Tense.into()],
        }
    }

    /// Accepts `front`, `height` (or the older `hight`), `round`, `tense`.
    pub fn parse(name: &str) -> Option<HarmonyAxis> {
        match name.to_ascii_lowercase().as_str() {
            "front" => Some(HarmonyAxis::Front),
            "height" | "hight" => Some(HarmonyAxis::Height),
            "round" => Some(HarmonyAxis::Round),
            "tense" => Some(HarmonyAxis::Tense),
            _ => None,
        }
    }
}

impl fmt::Display for HarmonyAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HarmonyAxis::Front => "front",
            HarmonyAxis::Height => "height",
            HarmonyAxis::Round => "round",
            HarmonyAxis::Tense => "tense",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarmonyRule {
    pub axis: HarmonyAxis,
    pub vowels_only: bool,
}

impl HarmonyRule {
    pub fn new(axis: HarmonyAxis, vowels_only: bool) -> Self {
        HarmonyRule { axis, vowels_only }
    }

    fn participates(&self, sound: &Sound) -> bool {
        !self.vowels_only || sound.has(Quality::Vowel)
    }

    pub fn apply(&self, word: &Word) -> Word {
        let poles = self.axis.poles();
        let mut value: Option<Feature> = None;
        word.iter()
            .map(|sound| {
                if !self.participates(sound) {
                    return *sound;
                }
                let Some(pole) = poles.iter().copied().find(|&p| sound.has(p)) else {
                    return *sound;
                };
                match value {
                    Some(fixed) => sound.with(fixed),
                    None => {
                        value = Some(pole);
                        *sound
                    }
                }
            })
            .collect()
    }
}

impl fmt::Display for HarmonyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = if self.vowels_only { "vowel" } else { "all" };
        write!(f, "{} harmony ({scope})", self.axis)
    }
}
