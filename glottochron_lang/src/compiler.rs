// Rule compiler: sound-change rule text in, weighted catalog out.
//
// A rule file is a list of lines `<weight> <kind> <body>`, where the weight
// is an integer in thousandths (the per-generation chance that a dialect
// picks the rule up). Blank lines are skipped. Lines starting with `%` are
// comments; the last comment before a rule is kept as that rule's note.
//
// Kinds:
// - `mute`: a segment rule in bracket notation (see `RuleCompiler::segment`)
// - `harmonia <axis> <vowel|all>`: a harmony rule
// - `silabe <minimum sonority>`: three syllabifiers, one per bias, each at
//   a third of the weight
// - `acente <left|right> <head size>`: eighteen stress rules, one per
//   attractor threshold (1..=3), tail policy and lengthening flag, each at
//   an eighteenth of the weight
//
// The expansions flatten every parameterization into the catalog so that
// drawing from it needs no knowledge of rule kinds.
//
// Compilation is all-or-nothing. The first bad line is logged and returned
// as a `RuleError` carrying its 1-based line number.

use tracing::{info, warn};

use crate::catalog::{Catalog, CatalogEntry};
use crate::class::FeatureClass;
use crate::error::RuleError;
use crate::feature::{CopySlot, Feature};
use crate::ipa::IpaTable;
use crate::process::{
    Correspondence, HarmonyAxis, HarmonyRule, Process, SegmentRule, StressRule, SyllabifyRule,
    TailPolicy,
};
use crate::sound::Sound;

/// Characters that end a bare IPA run in a `mute` body.
const STRUCTURAL: &[char] = &['[', ']', '>', '/', '_', '#'];

pub struct RuleCompiler<'t> {
    table: &'t IpaTable,
}

impl<'t> RuleCompiler<'t> {
    /// `table` resolves bare IPA symbols in rule bodies.
    pub fn new(table: &'t IpaTable) -> Self {
        RuleCompiler { table }
    }

    pub fn compile(&self, text: &str) -> Result<Catalog, RuleError> {
        let mut entries = Vec::new();
        let mut note: Option<String> = None;
        let mut rules = 0usize;
        for (i, raw) in text.lines().enumerate() {
            let line = i + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(comment) = trimmed.strip_prefix('%') {
                note = Some(comment.trim().to_string()).filter(|c| !c.is_empty());
                continue;
            }
            let (weight, processes) = self.compile_line(trimmed, line).inspect_err(|error| {
                warn!(line, %error, "rejected sound-change rule");
            })?;
            let note = note.take();
            let share = weight / processes.len() as f64;
            entries.extend(processes.into_iter().map(|process| CatalogEntry {
                weight: share,
                process,
                line,
                note: note.clone(),
            }));
            rules += 1;
        }
        let catalog = Catalog::new(entries);
        info!(
            rules,
            entries = catalog.len(),
            total_weight = catalog.total_weight(),
            "compiled sound-change catalog"
        );
        Ok(catalog)
    }

    /// One rule line: its weight and the processes it expands into.
    fn compile_line(&self, text: &str, line: usize) -> Result<(f64, Vec<Process>), RuleError> {
        let malformed = |message: String| RuleError::MalformedRuleSyntax { line, message };
        let (weight, rest) = split_word(text);
        let (kind, body) = split_word(rest);
        let weight: u32 = weight
            .parse()
            .map_err(|_| malformed(format!("weight `{weight}` is not an integer")))?;
        let weight = f64::from(weight) / 1000.0;

        let processes: Vec<Process> = match kind {
            "mute" => vec![self.segment(body, line)?.into()],
            "harmonia" => vec![harmony(body, line)?.into()],
            "silabe" => {
                let minimum: i32 = body
                    .parse()
                    .map_err(|_| malformed(format!("minimum sonority `{body}` is not an integer")))?;
                (-1..=1)
                    .map(|bias| SyllabifyRule::new(f64::from(minimum), bias).into())
                    .collect()
            }
            "acente" => stress_family(body, line)?,
            "" => return Err(malformed("missing rule kind".to_string())),
            other => return Err(malformed(format!("unknown rule kind `{other}`"))),
        };
        Ok((weight, processes))
    }

    /// Compile a `mute` body: `source > target / left _ right`.
    ///
    /// Each section is a sequence of bracketed classes (`[ +VOWEL -LONG ]`),
    /// `#` for the word boundary, or bare IPA symbols standing for the class
    /// of exactly that sound. A target class may carry `±place`,
    /// `±voicing` or `±secondary` to copy that dimension from a reference
    /// segment, and may be closed with `]N` to name the source segment it
    /// rewrites; an index at or past the end of the source inserts a new
    /// segment instead. Unindexed targets rewrite source
    /// `min(position, len - 1)`; bare symbols in the target are inserted.
    /// `ε` marks an empty section.
    pub fn segment(&self, body: &str, line: usize) -> Result<SegmentRule, RuleError> {
        let mut parser = SegmentParser::new(line);
        for token in lex(body, line)? {
            match token {
                Token::Literal(run) => {
                    for sound in self.literal(&run, line)? {
                        parser.literal(sound)?;
                    }
                }
                other => parser.feed(other)?,
            }
        }
        parser.finish(body)
    }

    fn literal(&self, run: &str, line: usize) -> Result<Vec<Sound>, RuleError> {
        let unknown = || RuleError::UnknownSymbol {
            line,
            symbol: run.to_string(),
        };
        let word = self.table.decode(run).map_err(|_| unknown())?;
        if word.iter().any(Sound::is_pause) {
            return Err(unknown());
        }
        Ok(word.segments().to_vec())
    }
}

/// Compile rule text against the default IPA table.
pub fn compile(text: &str) -> Result<Catalog, RuleError> {
    RuleCompiler::new(crate::ipa::default_ipa_table()).compile(text)
}

fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], text[end..].trim()),
        None => (text, ""),
    }
}

fn harmony(body: &str, line: usize) -> Result<HarmonyRule, RuleError> {
    let malformed = |message: String| RuleError::MalformedRuleSyntax { line, message };
    let mut words = body.split_whitespace();
    let axis = words.next().unwrap_or_default();
    let axis = HarmonyAxis::parse(axis)
        .ok_or_else(|| malformed(format!("unknown harmony axis `{axis}`")))?;
    let vowels_only = match words.next() {
        Some("vowel") => true,
        Some("all") => false,
        Some(other) => return Err(malformed(format!("unknown harmony scope `{other}`"))),
        None => return Err(malformed("missing harmony scope".to_string())),
    };
    Ok(HarmonyRule::new(axis, vowels_only))
}

fn stress_family(body: &str, line: usize) -> Result<Vec<Process>, RuleError> {
    let malformed = |message: String| RuleError::MalformedRuleSyntax { line, message };
    let mut words = body.split_whitespace();
    let reverse = match words.next() {
        Some("right") => true,
        Some("left") => false,
        other => {
            return Err(malformed(format!(
                "stress edge must be `left` or `right`, not `{}`",
                other.unwrap_or_default()
            )));
        }
    };
    let head = words.next().unwrap_or_default();
    let head_size: usize = head
        .parse()
        .map_err(|_| malformed(format!("head size `{head}` is not an integer")))?;

    let mut family: Vec<Process> = Vec::with_capacity(18);
    for attractors in 1..=3 {
        for tail in TailPolicy::ALL {
            for lengthen in [true, false] {
                family.push(StressRule::new(reverse, head_size, attractors, tail, lengthen).into());
            }
        }
    }
    Ok(family)
}

// ---------------------------------------------------------------------------
// `mute` bodies
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Sign {
    Present,
    Absent,
    Copy,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Open,
    Close(Option<usize>),
    Arrow,
    Slash,
    Focus,
    Boundary,
    Empty,
    Feature(Sign, String),
    Literal(String),
}

fn lex(body: &str, line: usize) -> Result<Vec<Token>, RuleError> {
    let malformed = |message: String| RuleError::MalformedRuleSyntax { line, message };
    let mut tokens = Vec::new();
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        let token = match c {
            c if c.is_whitespace() => continue,
            '[' => Token::Open,
            ']' => {
                let mut digits = String::new();
                while let Some(d) = chars.next_if(char::is_ascii_digit) {
                    digits.push(d);
                }
                if digits.is_empty() {
                    Token::Close(None)
                } else {
                    let index = digits
                        .parse()
                        .map_err(|_| malformed(format!("bad index `{digits}`")))?;
                    Token::Close(Some(index))
                }
            }
            '>' => Token::Arrow,
            '/' => Token::Slash,
            '_' => Token::Focus,
            '#' => Token::Boundary,
            'ε' | '∅' => Token::Empty,
            '+' | '-' | '±' => {
                let mut name = String::new();
                while let Some(n) = chars.next_if(|&n| n.is_alphanumeric() || n == '_' || n == '!')
                {
                    name.push(n);
                }
                if name.is_empty() {
                    return Err(malformed(format!("`{c}` without a feature name")));
                }
                let sign = match c {
                    '+' => Sign::Present,
                    '-' => Sign::Absent,
                    _ => Sign::Copy,
                };
                Token::Feature(sign, name)
            }
            _ => {
                let mut run = String::from(c);
                while let Some(n) =
                    chars.next_if(|&n| !n.is_whitespace() && !STRUCTURAL.contains(&n))
                {
                    run.push(n);
                }
                Token::Literal(run)
            }
        };
        tokens.push(token);
    }
    Ok(tokens)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
    Source,
    Target,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Link {
    Unindexed,
    Explicit(usize),
    Fresh,
}

struct SegmentParser {
    line: usize,
    section: Section,
    open: Option<FeatureClass>,
    source: Vec<FeatureClass>,
    target: Vec<(FeatureClass, Link)>,
    left: Vec<FeatureClass>,
    right: Vec<FeatureClass>,
}

impl SegmentParser {
    fn new(line: usize) -> Self {
        SegmentParser {
            line,
            section: Section::Source,
            open: None,
            source: Vec::new(),
            target: Vec::new(),
            left: Vec::new(),
            right: Vec::new(),
        }
    }

    fn malformed(&self, message: impl Into<String>) -> RuleError {
        RuleError::MalformedRuleSyntax {
            line: self.line,
            message: message.into(),
        }
    }

    fn advance(&mut self, from: Section, to: Section, marker: &str) -> Result<(), RuleError> {
        if self.section != from || self.open.is_some() {
            return Err(self.malformed(format!("unexpected `{marker}`")));
        }
        self.section = to;
        Ok(())
    }

    fn feed(&mut self, token: Token) -> Result<(), RuleError> {
        match token {
            Token::Open => {
                if self.open.is_some() {
                    return Err(self.malformed("nested `[`"));
                }
                self.open = Some(FeatureClass::default());
            }
            Token::Close(index) => {
                let class = self
                    .open
                    .take()
                    .ok_or_else(|| self.malformed("`]` without `[`"))?;
                self.close(class, index)?;
            }
            Token::Arrow => self.advance(Section::Source, Section::Target, ">")?,
            Token::Slash => self.advance(Section::Target, Section::Left, "/")?,
            Token::Focus => self.advance(Section::Left, Section::Right, "_")?,
            Token::Boundary => {
                if self.open.is_some() {
                    return Err(self.malformed("`#` inside brackets"));
                }
                match self.section {
                    Section::Source | Section::Target => {
                        return Err(self.malformed("`#` can only appear in a context"));
                    }
                    Section::Left => self.left.push(FeatureClass::boundary()),
                    Section::Right => self.right.push(FeatureClass::boundary()),
                }
            }
            Token::Empty => {
                if self.open.is_some() {
                    return Err(self.malformed("`ε` inside brackets"));
                }
            }
            Token::Feature(sign, name) => self.feature(sign, &name)?,
            Token::Literal(_) => unreachable!("literals are decoded by the compiler"),
        }
        Ok(())
    }

    fn feature(&mut self, sign: Sign, name: &str) -> Result<(), RuleError> {
        let line = self.line;
        let unknown = || RuleError::UnknownSymbol {
            line,
            symbol: name.to_string(),
        };
        let Some(class) = self.open.as_mut() else {
            return Err(RuleError::MalformedRuleSyntax {
                line,
                message: format!("`{name}` outside brackets"),
            });
        };
        match sign {
            Sign::Copy => class.copy_from.push(CopySlot::parse(name).ok_or_else(unknown)?),
            Sign::Present => class.present.push(Feature::parse(name).ok_or_else(unknown)?),
            Sign::Absent => class.absent.push(Feature::parse(name).ok_or_else(unknown)?),
        }
        Ok(())
    }

    fn close(&mut self, class: FeatureClass, index: Option<usize>) -> Result<(), RuleError> {
        if self.section == Section::Target {
            if let Some(feature) = class.absent.first() {
                return Err(self.malformed(format!("target cannot require -{feature}")));
            }
            if let Some(feature) = class.present.iter().find(|f| !f.is_appliable()) {
                return Err(self.malformed(format!("{feature} cannot be applied")));
            }
            let link = index.map_or(Link::Unindexed, Link::Explicit);
            self.target.push((class, link));
            return Ok(());
        }

        if index.is_some() {
            return Err(self.malformed("only target classes take an index"));
        }
        if let Some(slot) = class.copy_from.first() {
            return Err(self.malformed(format!("±{slot} outside the target")));
        }
        let untestable = class.present.iter().chain(&class.absent).find(|f| !f.is_testable());
        if let Some(feature) = untestable {
            return Err(self.malformed(format!("{feature} cannot be tested")));
        }
        self.push(class);
        Ok(())
    }

    fn push(&mut self, class: FeatureClass) {
        match self.section {
            Section::Source => self.source.push(class),
            Section::Target => self.target.push((class, Link::Fresh)),
            Section::Left => self.left.push(class),
            Section::Right => self.right.push(class),
        }
    }

    fn literal(&mut self, sound: Sound) -> Result<(), RuleError> {
        if self.open.is_some() {
            return Err(self.malformed("IPA symbol inside brackets"));
        }
        let Sound::Spoken(phone) = sound else {
            return Err(self.malformed("pause in rule body"));
        };
        self.push(FeatureClass::literal(&phone));
        Ok(())
    }

    fn finish(self, body: &str) -> Result<SegmentRule, RuleError> {
        if self.open.is_some() {
            return Err(self.malformed("unclosed `[`"));
        }
        if self.section == Section::Source {
            if self.source.is_empty() {
                return Ok(SegmentRule::identity());
            }
            return Err(self.malformed("missing `>`"));
        }

        let width = self.source.len();
        let unindexed = self.target.iter().any(|(_, link)| *link == Link::Unindexed);
        if unindexed && width > 1 && width != self.target.len() {
            return Err(RuleError::AmbiguousCorrespondence {
                line: self.line,
                rule: body.to_string(),
            });
        }
        let correspondence = self
            .target
            .iter()
            .enumerate()
            .map(|(position, (_, link))| match *link {
                Link::Explicit(index) if index < width => Correspondence::Source(index),
                Link::Explicit(_) | Link::Fresh => Correspondence::Fresh,
                Link::Unindexed if width == 0 => Correspondence::Fresh,
                Link::Unindexed => Correspondence::Source(position.min(width - 1)),
            })
            .collect();

        let line = self.line;
        let target = self.target.into_iter().map(|(class, _)| class).collect();
        let rule = SegmentRule::new(self.source, target, correspondence, self.left, self.right)
            .map_err(|error| RuleError::MalformedRuleSyntax {
                line,
                message: error.to_string(),
            })?;
        if rule.is_unchecked_deletion() {
            return Err(RuleError::UncheckedDeletionRule {
                line,
                rule: body.to_string(),
            });
        }
        Ok(rule)
    }
}
