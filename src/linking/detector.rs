//! Pairwise relationship detection between a new item and existing nodes.
//!
//! Four independent candidate families are produced for every pair:
//! similarity (tags, content, source), dependency (rule table plus a
//! beginner/advanced heuristic), hierarchy (rule table) and temporal
//! (versioned titles). [`select_links`] then filters, mirrors and ranks
//! the candidates.

use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use curator_sources::ContentItem;

use crate::config::LinkOptions;
use crate::graph::{KnowledgeLink, LinkType};

use super::rules::{RelationRule, RelationRules, RuleKind};
use super::text::{self, DocumentFrequencies, KEYWORD_LIMIT};

/// Tag overlap must exceed this to produce a `similar` link.
pub const TAG_SIMILARITY_THRESHOLD: f64 = 0.3;
/// Combined content similarity must exceed this to produce a `similar` link.
pub const CONTENT_SIMILARITY_THRESHOLD: f64 = 0.4;
/// Concept edit ratio above which an item counts as mentioning a term.
pub const SEMANTIC_MENTION_THRESHOLD: f64 = 0.7;
/// Shorter terms match only exactly or by stem; one edit already clears
/// the ratio threshold for them ("sql" and "nosql", "git" and "gist").
pub const MIN_FUZZY_TERM_CHARS: usize = 5;

const SAME_SOURCE_STRENGTH: f64 = 0.5;
const LEVEL_PROGRESSION_STRENGTH: f64 = 0.6;
const TEMPORAL_STRENGTH: f64 = 0.5;

const TITLE_WEIGHT: f64 = 0.3;
const KEYWORD_WEIGHT: f64 = 0.3;
const TFIDF_WEIGHT: f64 = 0.2;
const CONCEPT_WEIGHT: f64 = 0.2;

/// Sources too broad for "same source" to mean anything.
const GENERIC_SOURCES: &[&str] = &["", "generic", "other", "unknown", "web"];

const BEGINNER_MARKERS: &[&str] = &[
    "basics",
    "beginner",
    "beginners",
    "first steps",
    "fundamentals",
    "getting started",
    "getting-started",
    "intro",
    "introduction",
    "primer",
    "101",
];

const ADVANCED_MARKERS: &[&str] = &[
    "advanced",
    "deep dive",
    "deep-dive",
    "expert",
    "in depth",
    "in-depth",
    "internals",
    "mastering",
    "optimization",
    "optimizing",
];

/// Words that never count as a shared subject between two levels.
const LEVEL_FILLER: &[&str] = &["course", "guide", "lesson", "tutorial"];

static VERSION_PATTERN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"\bv?\d+\.\d+(?:\.\d+)?\b"));

fn version_in(title: &str) -> Option<String> {
    let pattern = VERSION_PATTERN.as_ref().ok()?;
    pattern.find(title).map(|m| m.as_str().to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Beginner,
    Advanced,
}

/// Precomputed signals for one item.
struct Profile<'a> {
    item: &'a ContentItem,
    /// All tokens of title, body and tags, stopwords kept.
    words: Vec<String>,
    /// Stopword-free tokens used for TF-IDF and keywords.
    terms: Vec<String>,
    stems: HashSet<String>,
    tags: HashSet<String>,
    keywords: HashSet<String>,
    concepts: HashSet<String>,
    /// Rule vocabulary terms this item mentions.
    mentioned: HashSet<String>,
    level: Option<Level>,
    version: Option<String>,
}

/// Detects candidate links using a relation rule table.
#[derive(Debug, Clone)]
pub struct RelationshipDetector {
    rules: RelationRules,
    /// Each vocabulary term with its tokens.
    vocabulary: Vec<(String, Vec<String>)>,
}

impl Default for RelationshipDetector {
    fn default() -> Self {
        Self::new(RelationRules::builtin())
    }
}

impl RelationshipDetector {
    pub fn new(rules: RelationRules) -> Self {
        let vocabulary = rules
            .vocabulary()
            .into_iter()
            .map(|term| {
                let tokens = text::tokenize(&term);
                (term, tokens)
            })
            .filter(|(_, tokens)| !tokens.is_empty())
            .collect();
        Self { rules, vocabulary }
    }

    pub fn rules(&self) -> &RelationRules {
        &self.rules
    }

    /// All candidate links between `item` and every existing node with a
    /// different id, unfiltered.
    pub fn detect<'a, I>(&self, item: &ContentItem, existing: I) -> Vec<KnowledgeLink>
    where
        I: IntoIterator<Item = &'a ContentItem>,
    {
        let new = self.profile(item);
        let others: Vec<Profile<'_>> = existing
            .into_iter()
            .filter(|other| other.id != item.id)
            .map(|other| self.profile(other))
            .collect();

        let frequencies = DocumentFrequencies::from_documents(
            others
                .iter()
                .chain(std::iter::once(&new))
                .map(|p| p.terms.as_slice()),
        );

        let mut candidates = Vec::new();
        for other in &others {
            similarity_links(&new, other, &frequencies, &mut candidates);
            self.rule_links(&new, other, RuleKind::Dependency, &mut candidates);
            level_links(&new, other, &mut candidates);
            self.rule_links(&new, other, RuleKind::Hierarchy, &mut candidates);
            temporal_links(&new, other, &mut candidates);
        }
        candidates
    }

    fn profile<'a>(&self, item: &'a ContentItem) -> Profile<'a> {
        let tags: HashSet<String> = item
            .tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        let full_text = format!("{} {} {}", item.title, item.content, item.tags.join(" "));
        let words = text::tokenize(&full_text);
        let terms: Vec<String> = words
            .iter()
            .filter(|w| !text::is_stopword(w))
            .cloned()
            .collect();
        let stems = words.iter().map(|w| text::stem(w)).collect();
        let keywords = text::keywords(&terms, KEYWORD_LIMIT);

        let mut concepts: HashSet<String> = tags.clone();
        concepts.extend(text::content_tokens(&item.title));
        for (term, tokens) in &self.vocabulary {
            if text::contains_phrase(&words, tokens) {
                concepts.insert(term.clone());
            }
        }

        let mut profile = Profile {
            item,
            words,
            terms,
            stems,
            tags,
            keywords,
            concepts,
            mentioned: HashSet::new(),
            level: level_of(item),
            version: version_in(&item.title),
        };
        profile.mentioned = self
            .vocabulary
            .iter()
            .filter(|(term, tokens)| self.mentions(&profile, term, tokens))
            .map(|(term, _)| term.clone())
            .collect();
        profile
    }

    /// Exact phrase, stemmed tokens, or a concept close enough to the term.
    ///
    /// The fuzzy fallback only applies to terms of at least
    /// [`MIN_FUZZY_TERM_CHARS`] characters, and a concept that is itself a
    /// different vocabulary term never counts, so "next.js" does not stand
    /// in for "node.js".
    fn mentions(&self, profile: &Profile<'_>, term: &str, term_tokens: &[String]) -> bool {
        if text::contains_phrase(&profile.words, term_tokens) {
            return true;
        }
        if term_tokens
            .iter()
            .all(|t| profile.stems.contains(&text::stem(t)))
        {
            return true;
        }
        if term.chars().count() < MIN_FUZZY_TERM_CHARS {
            return false;
        }
        profile
            .concepts
            .iter()
            .filter(|c| c.as_str() == term || !self.is_vocabulary_term(c))
            .any(|c| text::char_similarity(c, term) > SEMANTIC_MENTION_THRESHOLD)
    }

    fn is_vocabulary_term(&self, candidate: &str) -> bool {
        self.vocabulary.iter().any(|(term, _)| term == candidate)
    }

    fn rule_links(
        &self,
        new: &Profile<'_>,
        other: &Profile<'_>,
        kind: RuleKind,
        out: &mut Vec<KnowledgeLink>,
    ) {
        for rule in self.rules.of_kind(kind) {
            let forward = new.mentioned.contains(&rule.from) && other.mentioned.contains(&rule.to);
            let backward =
                other.mentioned.contains(&rule.from) && new.mentioned.contains(&rule.to);
            let (parent, child) = match (forward, backward) {
                (true, false) => (new, other),
                (false, true) => (other, new),
                // Neither, or both directions hold and the pair is ambiguous.
                _ => continue,
            };
            out.push(rule_link(parent, child, rule));
        }
    }
}

fn rule_link(parent: &Profile<'_>, child: &Profile<'_>, rule: &RelationRule) -> KnowledgeLink {
    let (link_type, reason) = match rule.kind {
        RuleKind::Dependency => (
            LinkType::Dependency,
            format!("Prerequisite: {} before {}", rule.from, rule.to),
        ),
        RuleKind::Hierarchy => (
            LinkType::Hierarchy,
            format!("Hierarchy: {} contains {}", rule.from, rule.to),
        ),
    };
    KnowledgeLink::new(
        &parent.item.id,
        &child.item.id,
        link_type,
        rule.strength,
        reason,
    )
}

fn similarity_links(
    new: &Profile<'_>,
    other: &Profile<'_>,
    frequencies: &DocumentFrequencies,
    out: &mut Vec<KnowledgeLink>,
) {
    let (from, to) = (&new.item.id, &other.item.id);

    let tag_overlap = text::jaccard(&new.tags, &other.tags);
    if tag_overlap > TAG_SIMILARITY_THRESHOLD {
        let shared: BTreeSet<&String> = new.tags.intersection(&other.tags).collect();
        let shared: Vec<&str> = shared.into_iter().map(String::as_str).collect();
        out.push(
            KnowledgeLink::new(
                from,
                to,
                LinkType::Similar,
                tag_overlap,
                format!("Shared tags: {}", shared.join(", ")),
            )
            .bidirectional(),
        );
    }

    let content = content_similarity(new, other, frequencies);
    if content > CONTENT_SIMILARITY_THRESHOLD {
        out.push(
            KnowledgeLink::new(
                from,
                to,
                LinkType::Similar,
                content,
                format!("Content similarity: {content:.2}"),
            )
            .bidirectional(),
        );
    }

    let source = new.item.source.trim().to_lowercase();
    if !GENERIC_SOURCES.contains(&source.as_str())
        && source == other.item.source.trim().to_lowercase()
    {
        out.push(
            KnowledgeLink::new(
                from,
                to,
                LinkType::Related,
                SAME_SOURCE_STRENGTH,
                format!("Same source: {}", new.item.source.trim()),
            )
            .bidirectional(),
        );
    }
}

/// Weighted blend of title, keyword, TF-IDF and concept similarity.
fn content_similarity(
    a: &Profile<'_>,
    b: &Profile<'_>,
    frequencies: &DocumentFrequencies,
) -> f64 {
    let title = text::word_similarity(&a.item.title, &b.item.title);
    let keywords = text::jaccard(&a.keywords, &b.keywords);
    let tfidf = frequencies.cosine(&a.terms, &b.terms);
    let concepts = text::jaccard(&a.concepts, &b.concepts);

    (TITLE_WEIGHT * title
        + KEYWORD_WEIGHT * keywords
        + TFIDF_WEIGHT * tfidf
        + CONCEPT_WEIGHT * concepts)
        .clamp(0.0, 1.0)
}

fn level_of(item: &ContentItem) -> Option<Level> {
    let words = text::tokenize(&format!("{} {}", item.title, item.tags.join(" ")));
    let has = |markers: &[&str]| {
        markers
            .iter()
            .any(|m| text::contains_phrase(&words, &text::tokenize(m)))
    };
    match (has(BEGINNER_MARKERS), has(ADVANCED_MARKERS)) {
        (true, false) => Some(Level::Beginner),
        (false, true) => Some(Level::Advanced),
        _ => None,
    }
}

fn is_level_word(word: &str) -> bool {
    LEVEL_FILLER.contains(&word)
        || BEGINNER_MARKERS
            .iter()
            .chain(ADVANCED_MARKERS)
            .any(|m| text::tokenize(m).iter().any(|t| t == word))
}

/// Beginner material on a subject precedes advanced material on it.
fn level_links(new: &Profile<'_>, other: &Profile<'_>, out: &mut Vec<KnowledgeLink>) {
    let (beginner, advanced) = match (new.level, other.level) {
        (Some(Level::Beginner), Some(Level::Advanced)) => (new, other),
        (Some(Level::Advanced), Some(Level::Beginner)) => (other, new),
        _ => return,
    };
    let shared: BTreeSet<&String> = beginner
        .concepts
        .intersection(&advanced.concepts)
        .filter(|c| !is_level_word(c))
        .collect();
    if shared.is_empty() {
        return;
    }
    let shared: Vec<&str> = shared.into_iter().map(String::as_str).collect();
    out.push(KnowledgeLink::new(
        &beginner.item.id,
        &advanced.item.id,
        LinkType::Dependency,
        LEVEL_PROGRESSION_STRENGTH,
        format!("Beginner material before advanced: {}", shared.join(", ")),
    ));
}

fn temporal_links(new: &Profile<'_>, other: &Profile<'_>, out: &mut Vec<KnowledgeLink>) {
    if let (Some(a), Some(b)) = (&new.version, &other.version) {
        out.push(
            KnowledgeLink::new(
                &new.item.id,
                &other.item.id,
                LinkType::Temporal,
                TEMPORAL_STRENGTH,
                format!("Versioned titles: {a} and {b}"),
            )
            .bidirectional(),
        );
    }
}

/// Filter candidates by strength and type, add mirrors, rank by strength
/// (stable) and cap.
///
/// A link and its mirror are kept or dropped together: a pair that does not
/// fit under `max_links_per_content` is skipped and smaller units further
/// down may still fill the remaining room.
pub fn select_links(candidates: Vec<KnowledgeLink>, options: &LinkOptions) -> Vec<KnowledgeLink> {
    let min_strength = options.effective_min_strength();
    let mut units: Vec<Vec<KnowledgeLink>> = candidates
        .into_iter()
        .filter(|link| link.strength >= min_strength && options.allows(link.link_type))
        .map(|link| {
            if options.enable_bidirectional && link.bidirectional {
                let mirror = link.mirrored();
                vec![link, mirror]
            } else {
                vec![link]
            }
        })
        .collect();
    units.sort_by(|a, b| b[0].strength.total_cmp(&a[0].strength));

    let mut accepted = Vec::new();
    for unit in units {
        if accepted.len() + unit.len() <= options.max_links_per_content {
            accepted.extend(unit);
        }
    }
    accepted
}
