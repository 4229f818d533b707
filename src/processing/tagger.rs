//! Rule-based part-of-speech tagging and entity labelling

use crate::error::Result;
use crate::processing::stop_words::is_stop_word;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}+#]*(?:[.\-/][\p{L}\p{N}+#]+)*|[.!?;:,()&]")
        .expect("Invalid token regex")
});

static VERSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)*$").expect("Invalid version regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartOfSpeech {
    Noun,
    ProperNoun,
    Verb,
    Auxiliary,
    Adjective,
    Adverb,
    Determiner,
    Pronoun,
    Adposition,
    Conjunction,
    Numeral,
    Punctuation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityLabel {
    Organization,
    Product,
    Language,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub pos: PartOfSpeech,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotation {
    pub tokens: Vec<Token>,
    pub entities: Vec<Entity>,
}

/// Linguistic annotator: tokens with part-of-speech tags plus named entities.
pub trait Annotator: Send + Sync {
    fn annotate(&self, text: &str) -> Result<Annotation>;
}

/// Deterministic tagger built from closed-class word lists and suffix rules.
#[derive(Debug, Default, Clone)]
pub struct RuleTagger;

impl RuleTagger {
    pub fn new() -> Self {
        Self
    }

    fn tag(&self, raw: &str, sentence_start: bool) -> PartOfSpeech {
        let first = raw.chars().next().unwrap_or(' ');
        if !first.is_alphanumeric() {
            return PartOfSpeech::Punctuation;
        }
        if VERSION_PATTERN.is_match(raw) {
            return PartOfSpeech::Numeral;
        }

        let lower = raw.to_lowercase();
        if let Some(pos) = closed_class(&lower) {
            return pos;
        }

        if looks_like_identifier(raw) {
            return PartOfSpeech::ProperNoun;
        }
        if first.is_uppercase() && !sentence_start {
            return PartOfSpeech::ProperNoun;
        }

        if COMMON_VERBS.contains(lower.as_str()) {
            return PartOfSpeech::Verb;
        }
        if COMMON_ADJECTIVES.contains(lower.as_str()) {
            return PartOfSpeech::Adjective;
        }
        if lower.len() > 4 && lower.ends_with("ly") {
            return PartOfSpeech::Adverb;
        }
        if lower.len() > 4 && lower.ends_with("ed") {
            return PartOfSpeech::Verb;
        }
        if lower.len() > 5 && ADJECTIVE_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
            return PartOfSpeech::Adjective;
        }

        PartOfSpeech::Noun
    }

    /// Organisation, product and language spans. Case-insensitive, so
    /// cleaned lowercase text is labelled too.
    fn label_entities(&self, tokens: &[Token]) -> Vec<Entity> {
        let mut entities = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            let lower = token.text.to_lowercase();

            if LANGUAGES.contains(lower.as_str()) && is_name_like(token) {
                entities.push(Entity {
                    text: token.text.clone(),
                    label: EntityLabel::Language,
                });
            } else if ORG_SUFFIXES.contains(lower.as_str())
                && matches!(token.pos, PartOfSpeech::Noun | PartOfSpeech::ProperNoun)
            {
                let start = name_span_start(tokens, i, MAX_ORG_NAME_TOKENS);
                if start < i {
                    entities.push(Entity {
                        text: join_tokens(&tokens[start..=i]),
                        label: EntityLabel::Organization,
                    });
                }
            } else if token.pos == PartOfSpeech::Numeral && i > 0 && is_name_like(&tokens[i - 1]) {
                if tokens
                    .get(i + 1)
                    .map_or(false, |next| DURATION_UNITS.contains(next.text.to_lowercase().as_str()))
                {
                    continue;
                }
                let start = product_span_start(tokens, i);
                entities.push(Entity {
                    text: join_tokens(&tokens[start..=i]),
                    label: EntityLabel::Product,
                });
            }
        }

        entities
    }
}

const MAX_ORG_NAME_TOKENS: usize = 3;

/// Nouns that can be part of a name: not a stop word, carries a letter
fn is_name_like(token: &Token) -> bool {
    matches!(token.pos, PartOfSpeech::Noun | PartOfSpeech::ProperNoun)
        && token.text.chars().any(char::is_alphabetic)
        && !is_stop_word(&token.text)
}

fn name_span_start(tokens: &[Token], end: usize, max_len: usize) -> usize {
    let mut start = end;
    while start > 0 && end - start < max_len && is_name_like(&tokens[start - 1]) {
        start -= 1;
    }
    start
}

/// A version number takes the single name before it, or the whole
/// capitalised run when the source text kept its casing ("Windows Server 2019")
fn product_span_start(tokens: &[Token], numeral: usize) -> usize {
    let mut start = numeral - 1;
    if !is_capitalized_name(&tokens[start]) {
        return start;
    }
    while start > 0 && numeral - start < MAX_ORG_NAME_TOKENS && is_capitalized_name(&tokens[start - 1]) {
        start -= 1;
    }
    start
}

fn join_tokens(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect::<Vec<_>>().join(" ")
}

impl Annotator for RuleTagger {
    fn annotate(&self, text: &str) -> Result<Annotation> {
        let mut tokens = Vec::new();
        let mut sentence_start = true;

        for m in TOKEN_PATTERN.find_iter(text) {
            let raw = m.as_str();
            let pos = self.tag(raw, sentence_start);
            sentence_start = matches!(raw, "." | "!" | "?");
            tokens.push(Token {
                text: raw.to_string(),
                pos,
            });
        }

        let entities = self.label_entities(&tokens);
        Ok(Annotation { tokens, entities })
    }
}

fn is_capitalized_name(token: &Token) -> bool {
    token.pos == PartOfSpeech::ProperNoun
        && token.text.chars().next().map_or(false, |c| c.is_uppercase())
}

/// Acronyms and code-like names: "SQL", "C++", "C#", "S3", "node.js"
fn looks_like_identifier(raw: &str) -> bool {
    let letters: Vec<char> = raw.chars().filter(|c| c.is_alphabetic()).collect();
    let has_digit = raw.chars().any(|c| c.is_ascii_digit());
    let all_caps = letters.len() >= 2 && letters.iter().all(|c| c.is_uppercase());

    all_caps
        || raw.contains('+')
        || raw.contains('#')
        || (has_digit && !letters.is_empty())
        || raw.contains('.')
}

fn closed_class(lower: &str) -> Option<PartOfSpeech> {
    if DETERMINERS.contains(lower) {
        Some(PartOfSpeech::Determiner)
    } else if PRONOUNS.contains(lower) {
        Some(PartOfSpeech::Pronoun)
    } else if ADPOSITIONS.contains(lower) {
        Some(PartOfSpeech::Adposition)
    } else if CONJUNCTIONS.contains(lower) {
        Some(PartOfSpeech::Conjunction)
    } else if AUXILIARIES.contains(lower) {
        Some(PartOfSpeech::Auxiliary)
    } else {
        None
    }
}

fn word_set(words: &'static [&'static str]) -> HashSet<&'static str> {
    words.iter().copied().collect()
}

static DETERMINERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    word_set(&[
        "a", "an", "the", "this", "that", "these", "those", "each", "every", "some", "any",
        "no", "all", "both", "either", "neither", "another", "such",
    ])
});

static PRONOUNS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    word_set(&[
        "i", "me", "my", "mine", "we", "us", "our", "ours", "you", "your", "yours", "he",
        "him", "his", "she", "her", "hers", "it", "its", "they", "them", "their", "theirs",
        "who", "whom", "whose", "which", "what", "myself", "ourselves", "yourself",
        "themselves", "itself",
    ])
});

static ADPOSITIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    word_set(&[
        "in", "on", "at", "by", "for", "with", "about", "against", "between", "into",
        "through", "during", "before", "after", "above", "below", "to", "from", "up", "down",
        "of", "off", "over", "under", "across", "within", "without", "via", "per", "among",
        "including", "like", "toward", "towards", "upon",
    ])
});

static CONJUNCTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    word_set(&[
        "and", "or", "but", "nor", "so", "yet", "because", "although", "while", "whereas",
        "if", "unless", "since", "as", "than", "whether",
    ])
});

static AUXILIARIES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    word_set(&[
        "is", "am", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do",
        "does", "did", "will", "would", "shall", "should", "can", "could", "may", "might",
        "must",
    ])
});

static COMMON_VERBS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    word_set(&[
        "build", "builds", "develop", "develops", "design", "designs", "lead", "leads",
        "manage", "manages", "work", "works", "create", "creates", "use", "uses", "seek",
        "seeking", "looking", "join", "help", "helps", "drive", "drives", "own", "owns",
        "deliver", "delivers", "maintain", "maintains", "implement", "implements",
        "support", "supports", "collaborate", "collaborates", "ensure", "ensures",
        "improve", "improves", "write", "writes", "need", "needs", "want", "make", "get",
    ])
});

static COMMON_ADJECTIVES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    word_set(&[
        "strong", "excellent", "good", "great", "senior", "junior", "new", "solid",
        "proven", "hands-on", "familiar", "proficient", "deep", "broad", "large", "small",
        "fast", "key", "modern", "remote", "preferred", "required", "plus", "bonus",
    ])
});

static DURATION_UNITS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    word_set(&["years", "year", "yrs", "months", "month", "weeks", "days", "hours", "people"])
});

const ADJECTIVE_SUFFIXES: &[&str] = &["ous", "ful", "ive", "able", "ible", "less"];

static ORG_SUFFIXES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    word_set(&[
        "inc", "inc.", "corp", "corp.", "corporation", "llc", "ltd", "ltd.", "labs", "lab",
        "technologies", "systems", "university", "institute", "group", "foundation",
        "company", "solutions", "software", "bank", "college",
    ])
});

static LANGUAGES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    word_set(&[
        "english", "spanish", "french", "german", "mandarin", "chinese", "japanese",
        "korean", "hindi", "arabic", "portuguese", "russian", "italian", "dutch", "polish",
        "turkish", "swedish", "cantonese", "bengali", "urdu",
    ])
});

#[cfg(test)]
mod tests {
    use super::*;

    fn annotate(text: &str) -> Annotation {
        RuleTagger::new().annotate(text).unwrap()
    }

    fn pos_of(annotation: &Annotation, text: &str) -> PartOfSpeech {
        annotation
            .tokens
            .iter()
            .find(|t| t.text == text)
            .map(|t| t.pos)
            .unwrap()
    }

    #[test]
    fn test_tokenizer_keeps_symbols_in_names() {
        let annotation = annotate("Skilled in C++, C# and node.js.");
        let texts: Vec<&str> = annotation.tokens.iter().map(|t| t.text.as_str()).collect();
        assert!(texts.contains(&"C++"));
        assert!(texts.contains(&"C#"));
        assert!(texts.contains(&"node.js"));
    }

    #[test]
    fn test_closed_class_words() {
        let annotation = annotate("The engineer works with the team and the product.");
        assert_eq!(pos_of(&annotation, "The"), PartOfSpeech::Determiner);
        assert_eq!(pos_of(&annotation, "with"), PartOfSpeech::Adposition);
        assert_eq!(pos_of(&annotation, "and"), PartOfSpeech::Conjunction);
        assert_eq!(pos_of(&annotation, "works"), PartOfSpeech::Verb);
        assert_eq!(pos_of(&annotation, "engineer"), PartOfSpeech::Noun);
    }

    #[test]
    fn test_proper_nouns_and_acronyms() {
        let annotation = annotate("Experience with SQL and Kubernetes on AWS.");
        assert_eq!(pos_of(&annotation, "SQL"), PartOfSpeech::ProperNoun);
        assert_eq!(pos_of(&annotation, "Kubernetes"), PartOfSpeech::ProperNoun);
        assert_eq!(pos_of(&annotation, "AWS"), PartOfSpeech::ProperNoun);
    }

    #[test]
    fn test_entity_labels() {
        let annotation = annotate("I worked at Acme Labs using Windows 11 and speak Spanish fluently.");
        assert!(annotation
            .entities
            .contains(&Entity { text: "Acme Labs".to_string(), label: EntityLabel::Organization }));
        assert!(annotation
            .entities
            .contains(&Entity { text: "Windows 11".to_string(), label: EntityLabel::Product }));
        assert!(annotation
            .entities
            .contains(&Entity { text: "Spanish".to_string(), label: EntityLabel::Language }));
    }

    #[test]
    fn test_entity_labels_on_lowercase_text() {
        let annotation = annotate("i worked at acme labs using windows 11 and speak spanish fluently.");
        assert!(annotation
            .entities
            .contains(&Entity { text: "acme labs".to_string(), label: EntityLabel::Organization }));
        assert!(annotation
            .entities
            .contains(&Entity { text: "windows 11".to_string(), label: EntityLabel::Product }));
        assert!(annotation
            .entities
            .contains(&Entity { text: "spanish".to_string(), label: EntityLabel::Language }));
    }

    #[test]
    fn test_capitalized_product_run() {
        let annotation = annotate("Administered Windows Server 2019 clusters.");
        assert!(annotation.entities.contains(&Entity {
            text: "Windows Server 2019".to_string(),
            label: EntityLabel::Product
        }));
    }

    #[test]
    fn test_durations_are_not_products() {
        let annotation = annotate("python experience 5 years");
        assert!(annotation
            .entities
            .iter()
            .all(|e| e.label != EntityLabel::Product));
    }

    #[test]
    fn test_empty_text() {
        let annotation = annotate("");
        assert!(annotation.tokens.is_empty());
        assert!(annotation.entities.is_empty());
    }
}
