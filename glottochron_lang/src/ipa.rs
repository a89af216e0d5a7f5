// IPA symbol table: a two-way mapping between graphemes and Sounds.
//
// The table is loaded from JSON (`data/ipa_symbols.json` by default, via
// `default_ipa_table()`), where each entry names a place, a manner and any
// of the modifiers `voiceless`, `breathy`, `vowel`, `lateral`, `rounded`
// and `velarized`. Everything else defaults to voiced, nonsyllabic, short,
// median, unrounded and oral.
//
// Decoding is greedy longest-match over the tabulated graphemes. Stress
// marks before a segment and diacritics after it are applied with
// `Sound::with`. `#` and whitespace are pauses and `.` is ignored.
//
// Encoding tries an exact lookup first. Failing that it searches for the
// smallest set of entries from the `MARKS` list whose modifiers, stripped
// from the sound, leave a tabulated base, and writes the corresponding
// diacritics around that base. Double articulations are written as two
// tied symbols. A sound with no renderable base comes out as `⟨key⟩`.
//
// If the same grapheme appears twice in the table the later entry decodes;
// if the same sound appears twice the earlier grapheme encodes.

use serde::Deserialize;
use std::collections::{HashMap, VecDeque};
use std::sync::OnceLock;

use crate::error::IpaError;
use crate::feature::{
    Feature, Laterality, Length, Manner, Nasality, Place, Secondary, Syllabicity, Voicing,
};
use crate::sound::{Phone, Sound};
use crate::word::Word;

const TIE: char = '\u{361}';

#[derive(Debug, Deserialize)]
struct SymbolFile {
    sounds: Vec<SymbolEntry>,
}

#[derive(Debug, Deserialize)]
struct SymbolEntry {
    symbol: String,
    features: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Placement {
    /// Written before the base symbol.
    Prefix,
    /// A combining diacritic, written directly after the base.
    Combining,
    /// A spacing modifier letter, written after any combining marks.
    Spacing,
}

/// A diacritic meaning "this sound has `present` where the base symbol
/// has `plain`".
struct Mark {
    symbol: char,
    placement: Placement,
    present: Feature,
    plain: Feature,
}

const fn mark(symbol: char, placement: Placement, present: Feature, plain: Feature) -> Mark {
    Mark {
        symbol,
        placement,
        present,
        plain,
    }
}

const MARKS: &[Mark] = &[
    mark(
        'ˈ',
        Placement::Prefix,
        Feature::Syllabicity(Syllabicity::PrimaryStressed),
        Feature::Syllabicity(Syllabicity::Unstressed),
    ),
    mark(
        'ˌ',
        Placement::Prefix,
        Feature::Syllabicity(Syllabicity::SecondaryStressed),
        Feature::Syllabicity(Syllabicity::Unstressed),
    ),
    mark('ː', Placement::Spacing, Feature::Length(Length::Long), Feature::Length(Length::Short)),
    mark(
        '\u{303}',
        Placement::Combining,
        Feature::Nasality(Nasality::Nasalized),
        Feature::Nasality(Nasality::Oral),
    ),
    mark(
        'ʰ',
        Placement::Spacing,
        Feature::Voicing(Voicing::Aspirated),
        Feature::Voicing(Voicing::Tenuis),
    ),
    mark(
        'ʼ',
        Placement::Spacing,
        Feature::Voicing(Voicing::Ejective),
        Feature::Voicing(Voicing::Tenuis),
    ),
    mark(
        '\u{324}',
        Placement::Combining,
        Feature::Voicing(Voicing::Breathy),
        Feature::Voicing(Voicing::Voiced),
    ),
    mark(
        '\u{325}',
        Placement::Combining,
        Feature::Voicing(Voicing::Tenuis),
        Feature::Voicing(Voicing::Voiced),
    ),
    mark(
        '\u{32C}',
        Placement::Combining,
        Feature::Voicing(Voicing::Voiced),
        Feature::Voicing(Voicing::Tenuis),
    ),
    mark(
        'ʷ',
        Placement::Spacing,
        Feature::Secondary(Secondary::Labialized),
        Feature::Secondary(Secondary::Unrounded),
    ),
    mark(
        'ʲ',
        Placement::Spacing,
        Feature::Secondary(Secondary::Palatalized),
        Feature::Secondary(Secondary::Unrounded),
    ),
    mark(
        'ˠ',
        Placement::Spacing,
        Feature::Secondary(Secondary::Velarized),
        Feature::Secondary(Secondary::Unrounded),
    ),
    mark(
        'ˤ',
        Placement::Spacing,
        Feature::Secondary(Secondary::Pharyngealized),
        Feature::Secondary(Secondary::Unrounded),
    ),
    mark(
        '\u{329}',
        Placement::Combining,
        Feature::Syllabicity(Syllabicity::Unstressed),
        Feature::Syllabicity(Syllabicity::Nonsyllabic),
    ),
    mark(
        '\u{32F}',
        Placement::Combining,
        Feature::Syllabicity(Syllabicity::Nonsyllabic),
        Feature::Syllabicity(Syllabicity::Unstressed),
    ),
    mark(
        'ˡ',
        Placement::Spacing,
        Feature::Laterality(Laterality::Lateral),
        Feature::Laterality(Laterality::Median),
    ),
];

fn find_mark(symbol: char) -> Option<&'static Mark> {
    MARKS.iter().find(|m| m.symbol == symbol)
}

#[derive(Debug, Clone)]
pub struct IpaTable {
    entries: Vec<(String, Sound)>,
    by_symbol: HashMap<String, Sound>,
    by_phone: HashMap<Phone, String>,
    /// Length in chars of the longest grapheme.
    longest: usize,
}

impl IpaTable {
    /// Parse a symbol table from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, IpaError> {
        let file: SymbolFile = serde_json::from_str(json)?;
        let mut entries = Vec::with_capacity(file.sounds.len());
        for entry in file.sounds {
            let phone = parse_entry(&entry)?;
            entries.push((entry.symbol, Sound::Spoken(phone)));
        }
        Ok(IpaTable::from_entries(entries))
    }

    fn from_entries(entries: Vec<(String, Sound)>) -> Self {
        let mut by_symbol = HashMap::new();
        let mut by_phone = HashMap::new();
        let mut longest = 0;
        for (symbol, sound) in &entries {
            by_symbol.insert(symbol.clone(), *sound);
            if let Some(phone) = sound.phone() {
                by_phone.entry(*phone).or_insert_with(|| symbol.clone());
            }
            longest = longest.max(symbol.chars().count());
        }
        IpaTable {
            entries,
            by_symbol,
            by_phone,
            longest,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Sound)> {
        self.entries.iter().map(|(symbol, sound)| (symbol.as_str(), sound))
    }

    /// Exact lookup of a tabulated grapheme.
    pub fn symbol(&self, grapheme: &str) -> Option<Sound> {
        self.by_symbol.get(grapheme).copied()
    }

    /// Exact lookup of a tabulated sound.
    pub fn grapheme(&self, sound: &Sound) -> Option<&str> {
        sound
            .phone()
            .and_then(|phone| self.by_phone.get(phone))
            .map(String::as_str)
    }

    /// Read an IPA string into a Word.
    pub fn decode(&self, text: &str) -> Result<Word, IpaError> {
        let chars: Vec<char> = text.chars().collect();
        let mut segments: Vec<Sound> = Vec::new();
        let mut stress: Option<Feature> = None;
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            let position = i;
            let unknown = move || IpaError::UnknownSymbol {
                symbol: c.to_string(),
                position,
            };
            if c == '.' {
                i += 1;
            } else if c == '#' || c.is_whitespace() {
                segments.push(Sound::Pause);
                i += 1;
            } else if c == TIE {
                let (second, len) = self.longest_match(&chars[i + 1..]).ok_or_else(unknown)?;
                let first = segments.last_mut().ok_or_else(unknown)?;
                *first = tie(first, &second).ok_or_else(unknown)?;
                i += 1 + len;
            } else if let Some(mark) = find_mark(c) {
                if mark.placement == Placement::Prefix {
                    stress = Some(mark.present);
                } else {
                    let last = segments.last_mut().filter(|s| !s.is_pause()).ok_or_else(unknown)?;
                    *last = last.with(mark.present);
                }
                i += 1;
            } else {
                let (sound, len) = self.longest_match(&chars[i..]).ok_or_else(unknown)?;
                segments.push(match stress.take() {
                    Some(feature) => sound.with(feature),
                    None => sound,
                });
                i += len;
            }
        }
        Ok(Word::new(segments))
    }

    fn longest_match(&self, chars: &[char]) -> Option<(Sound, usize)> {
        (1..=self.longest.min(chars.len())).rev().find_map(|len| {
            let candidate: String = chars[..len].iter().collect();
            self.symbol(&candidate).map(|sound| (sound, len))
        })
    }

    /// Write a Word as IPA. Pauses are written as `#`.
    pub fn encode(&self, word: &Word) -> String {
        word.iter().map(|sound| self.encode_sound(sound)).collect()
    }

    pub fn encode_sound(&self, sound: &Sound) -> String {
        match sound {
            Sound::Pause => "#".to_string(),
            Sound::Spoken(phone) => self.encode_phone(phone),
        }
    }

    fn encode_phone(&self, phone: &Phone) -> String {
        // Breadth-first over index-ordered subsets of `MARKS`, so the
        // rendering with the fewest diacritics wins and ties go to list
        // order. Each step only considers marks after the last one used.
        let mut queue = VecDeque::from([(*phone, 0usize, Vec::<&Mark>::new())]);
        while let Some((base, next, used)) = queue.pop_front() {
            if let Some(grapheme) = self.render_base(&base) {
                return spell(&grapheme, &used);
            }
            for (index, mark) in MARKS.iter().enumerate().skip(next) {
                if base.has(mark.present) {
                    let mut stripped = base;
                    stripped.assign(mark.plain);
                    let mut marks = used.clone();
                    marks.push(mark);
                    queue.push_back((stripped, index + 1, marks));
                }
            }
        }
        format!("⟨{}⟩", phone.key())
    }

    fn render_base(&self, phone: &Phone) -> Option<String> {
        if let Some(grapheme) = self.by_phone.get(phone) {
            return Some(grapheme.clone());
        }
        let (front, back) = match phone.place {
            Place::Labiovelar => (Place::Velar, Place::Bilabial),
            Place::Labiocoronal => (Place::Dental, Place::Bilabial),
            _ => return None,
        };
        let first = self.by_phone.get(&Phone { place: front, ..*phone })?;
        let second = self.by_phone.get(&Phone { place: back, ..*phone })?;
        Some(format!("{first}{TIE}{second}"))
    }
}

fn spell(grapheme: &str, marks: &[&Mark]) -> String {
    let placed = |placement| {
        marks
            .iter()
            .filter(move |m| m.placement == placement)
            .map(|m| m.symbol)
    };
    let mut text: String = placed(Placement::Prefix).collect();
    text.push_str(grapheme);
    text.extend(placed(Placement::Combining));
    text.extend(placed(Placement::Spacing));
    text
}

/// Combine two tied symbols into one doubly articulated sound.
fn tie(first: &Sound, second: &Sound) -> Option<Sound> {
    let (a, b) = (first.phone()?, second.phone()?);
    let labial = |p: Place| p == Place::Bilabial;
    let place = match (a.place, b.place) {
        (Place::Velar, p) | (p, Place::Velar) if labial(p) => Place::Labiovelar,
        (Place::Dental | Place::Alveolar, p) | (p, Place::Dental | Place::Alveolar)
            if labial(p) =>
        {
            Place::Labiocoronal
        }
        _ => return None,
    };
    Some(Sound::Spoken(Phone { place, ..*a }))
}

fn parse_entry(entry: &SymbolEntry) -> Result<Phone, IpaError> {
    let mut manner = None;
    let mut place = None;
    let mut modifiers = Vec::new();
    for name in &entry.features {
        let label = name.trim().replace([' ', '-'], "_").to_ascii_uppercase();
        if let Some(&p) = Place::ALL.iter().find(|p| p.label() == label) {
            place = Some(p);
        } else if let Some(&m) = Manner::ALL.iter().find(|m| m.label() == label) {
            manner = Some(m);
        } else {
            modifiers.push(match label.as_str() {
                "VOICELESS" => Feature::Voicing(Voicing::Tenuis),
                "BREATHY" => Feature::Voicing(Voicing::Breathy),
                "VOWEL" => Feature::Syllabicity(Syllabicity::Unstressed),
                "LATERAL" => Feature::Laterality(Laterality::Lateral),
                "ROUNDED" => Feature::Secondary(Secondary::Labialized),
                "VELARIZED" => Feature::Secondary(Secondary::Velarized),
                _ => return Err(IpaError::UnknownFeature(name.clone())),
            });
        }
    }
    let (Some(manner), Some(place)) = (manner, place) else {
        return Err(IpaError::IncompleteSymbol {
            symbol: entry.symbol.clone(),
        });
    };
    let mut phone = Phone::new(manner, place);
    for modifier in modifiers {
        phone.assign(modifier);
    }
    Ok(phone)
}

/// The default symbol table, embedded at compile time from
/// `data/ipa_symbols.json` and parsed once.
///
/// Panics if the embedded JSON is malformed (should never happen in a
/// released build).
pub fn default_ipa_table() -> &'static IpaTable {
    static TABLE: OnceLock<IpaTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        let json = include_str!("../../data/ipa_symbols.json");
        IpaTable::from_json(json).expect("embedded ipa_symbols.json should be valid")
    })
}
