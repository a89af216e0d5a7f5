// Stress placement from syllable weight.
//
// Each nucleus gets a weight, counted from the right edge of the word: 2 for
// a long nucleus, 1 if at least two consonant slots follow it before the
// next nucleus (a long consonant fills two), 0 otherwise. A pause starts the
// count afresh, as a word edge does.
//
// The nuclei are then walked from the stressed edge (the right one when
// `reverse` is set). A nucleus at least as heavy as `attractors` always
// takes stress. Failing that, the nucleus at `head_size` takes it if nothing
// has been stressed yet, or the last nucleus if nothing has been stressed
// at all. The tail policy governs the rest: `Lapse` stresses any nucleus
// after an unstressed one unless the next nucleus is an attractor or this
// is the last; `Clash` stresses after every unstressed nucleus regardless;
// `PrimaryOnly` leaves everything else unstressed.
//
// The first stressed nucleus in walk order is primary and the others are
// secondary. Every nucleus is rewritten, so old stress never survives.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::feature::{Length, Quality, Syllabicity};
use crate::sound::Sound;
use crate::word::Word;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TailPolicy {
    Lapse,
    Clash,
    #[serde(rename = "none")]
    PrimaryOnly,
}

impl TailPolicy {
    pub const ALL: [TailPolicy; 3] = [TailPolicy::Clash, TailPolicy::Lapse, TailPolicy::PrimaryOnly];
}

impl fmt::Display for TailPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TailPolicy::Lapse => "lapse",
            TailPolicy::Clash => "clash",
            TailPolicy::PrimaryOnly => "none",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StressRule {
    /// Count from the right edge of the word.
    pub reverse: bool,
    /// Unstressed nuclei between the edge and the first regular stress.
    pub head_size: usize,
    /// Minimum weight that attracts stress. Weights never exceed 2, so 3
    /// disables attraction.
    pub attractors: u8,
    pub tail: TailPolicy,
    /// Lengthen stressed light nuclei and shorten unstressed long ones.
    pub lengthen_stressed_open: bool,
}

#[derive(Clone, Copy, Debug)]
struct Nucleus {
    index: usize,
    weight: u8,
}

impl StressRule {
    pub fn new(
        reverse: bool,
        head_size: usize,
        attractors: u8,
        tail: TailPolicy,
        lengthen_stressed_open: bool,
    ) -> Self {
        StressRule {
            reverse,
            head_size,
            attractors,
            tail,
            lengthen_stressed_open,
        }
    }

    /// Penultimate stress with weight-sensitive attraction; applied to
    /// proto-language words before any sound change.
    pub fn default_placement() -> Self {
        StressRule::new(true, 1, 1, TailPolicy::Lapse, false)
    }

    /// Nuclei with their weights, ordered from the right edge.
    fn weigh(word: &Word) -> Vec<Nucleus> {
        let mut nuclei = Vec::new();
        let mut coda = 1u32;
        for (index, sound) in word.iter().enumerate().rev() {
            if sound.is_pause() {
                coda = 1;
            } else if sound.has(Quality::Syllabic) {
                let weight = if sound.has(Length::Long) {
                    2
                } else if coda > 1 {
                    1
                } else {
                    0
                };
                nuclei.push(Nucleus { index, weight });
                coda = 0;
            } else {
                coda += if sound.has(Length::Long) { 2 } else { 1 };
            }
        }
        nuclei
    }

    fn place(&self, nuclei: &[Nucleus]) -> Vec<bool> {
        let n = nuclei.len();
        let mut stress = Vec::with_capacity(n);
        let mut lapse = 0usize;
        for (i, nucleus) in nuclei.iter().enumerate() {
            let next_attracts = nuclei
                .get(i + 1)
                .is_some_and(|next| next.weight >= self.attractors);
            let attracts = nucleus.weight >= self.attractors;
            let at_head = lapse == i && (i == self.head_size || i + 1 == n);
            let stressed = if attracts || at_head {
                true
            } else if lapse == i && i < self.head_size {
                false
            } else if self.tail == TailPolicy::Lapse && (i + 1 >= n || next_attracts) {
                false
            } else {
                self.tail != TailPolicy::PrimaryOnly && lapse >= 1
            };
            lapse = if stressed { 0 } else { lapse + 1 };
            stress.push(stressed);
        }
        stress
    }

    pub fn apply(&self, word: &Word) -> Word {
        let mut nuclei = Self::weigh(word);
        if !self.reverse {
            nuclei.reverse();
        }
        let stress = self.place(&nuclei);

        let mut segments = word.segments().to_vec();
        let mut first = true;
        for (nucleus, stressed) in nuclei.iter().zip(stress) {
            let sound = &mut segments[nucleus.index];
            if stressed {
                let level = if first {
                    Syllabicity::PrimaryStressed
                } else {
                    Syllabicity::SecondaryStressed
                };
                first = false;
                *sound = sound.with(level);
                if self.lengthen_stressed_open && nucleus.weight == 0 {
                    *sound = sound.with(Length::Long);
                }
            } else {
                *sound = sound.with(Syllabicity::Unstressed);
                if self.lengthen_stressed_open && nucleus.weight == 2 {
                    *sound = sound.with(Length::Short);
                }
            }
        }
        Word::new(segments)
    }
}

impl fmt::Display for StressRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let edge = if self.reverse { "right" } else { "left" };
        write!(
            f,
            "stress from the {edge} (head {}, attractors {}, tail {}{})",
            self.head_size,
            self.attractors,
            self.tail,
            if self.lengthen_stressed_open {
                ", lengthening"
            } else {
                ""
            }
        )
    }
}
