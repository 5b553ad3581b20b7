//! Read-only word tables used by query expansion and scoring
//!
//! Built once per process ([`Lexicon::builtin`]) and shared by reference across
//! requests. Nothing here is mutated after construction.

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use std::sync::Arc;

/// Known misspellings, missing apostrophes and informal shorthand, applied in order
const CORRECTIONS: &[(&str, &str)] = &[
    // Misspellings
    ("recieve", "receive"),
    ("beleive", "believe"),
    ("belive", "believe"),
    ("imagin", "imagine"),
    ("definately", "definitely"),
    ("untill", "until"),
    ("tommorow", "tomorrow"),
    ("tomorow", "tomorrow"),
    ("wierd", "weird"),
    ("freind", "friend"),
    ("thier", "their"),
    ("alot", "a lot"),
    ("hart", "heart"),
    ("luv", "love"),
    ("nite", "night"),
    ("tonite", "tonight"),
    ("thru", "through"),
    ("rythm", "rhythm"),
    ("rhytm", "rhythm"),
    ("seperate", "separate"),
    ("wont", "won't"),
    // Missing apostrophes
    ("dont", "don't"),
    ("cant", "can't"),
    ("didnt", "didn't"),
    ("doesnt", "doesn't"),
    ("isnt", "isn't"),
    ("wasnt", "wasn't"),
    ("couldnt", "couldn't"),
    ("wouldnt", "wouldn't"),
    ("shouldnt", "shouldn't"),
    ("aint", "ain't"),
    ("im", "i'm"),
    ("ive", "i've"),
    ("youre", "you're"),
    ("theyre", "they're"),
    ("thats", "that's"),
    ("whats", "what's"),
    ("lets", "let's"),
    // Informal shorthand
    ("gonna", "going to"),
    ("wanna", "want to"),
    ("gotta", "got to"),
    ("kinda", "kind of"),
    ("lemme", "let me"),
    ("gimme", "give me"),
    ("tryna", "trying to"),
    ("cuz", "because"),
    ("coz", "because"),
    ("ur", "your"),
    ("u", "you"),
    ("ya", "you"),
    ("nothin", "nothing"),
    ("somethin", "something"),
    ("feelin", "feeling"),
    ("lovin", "loving"),
    ("dreamin", "dreaming"),
    ("runnin", "running"),
    ("goin", "going"),
];

/// Common lyric words used for edit-distance correction
const VOCABULARY: &[&str] = &[
    "love", "heart", "baby", "night", "tonight", "feel", "feeling", "time", "know", "never",
    "forever", "always", "dance", "dancing", "dream", "dreams", "world", "life", "girl", "boy",
    "want", "need", "away", "tell", "think", "remember", "believe", "believer", "together",
    "alone", "light", "fire", "rain", "home", "money", "crazy", "better", "stay", "hold",
    "close", "eyes", "smile", "tears", "cry", "crying", "hurt", "pain", "broken", "young",
    "wild", "free", "run", "running", "fall", "falling", "rise", "shine", "stars", "star",
    "moon", "sun", "summer", "sky", "ocean", "river", "road", "street", "city", "town",
    "forget", "goodbye", "hello", "again", "still", "right", "wrong", "everything", "nothing",
    "something", "someone", "somebody", "nobody", "everybody", "people", "friend", "friends",
    "lover", "kiss", "touch", "breathe", "breath", "alive", "dead", "die", "live", "soul",
    "mind", "body", "beautiful", "pretty", "sweet", "sugar", "honey", "darling", "angel",
    "heaven", "hell", "devil", "god", "pray", "lonely", "happy", "sad", "blue", "black",
    "white", "red", "gold", "golden", "diamond", "dark", "darkness", "shadow", "thunder",
    "lightning", "storm", "wind", "waiting", "wait", "come", "coming", "going", "leave",
    "leaving", "gone", "back", "down", "over", "under", "inside", "outside", "around",
    "imagine", "another", "other", "every", "where", "there", "here", "when", "what",
    "why", "because", "through", "until", "tomorrow", "yesterday", "today", "morning",
    "party", "music", "song", "sing", "singing", "radio", "rhythm", "beat",
    "perfect", "promise", "secret", "story", "begin", "end", "last", "first", "little",
    "only", "would", "could", "should", "ever", "wanted", "looking", "walking",
    "talking", "thinking", "without", "with", "your", "mine", "yours",
    // Short function words, listed so they are never "corrected" into lyric words
    "the", "and", "you", "for", "are", "was", "not", "but", "all", "can", "way", "high",
    "she", "her", "his", "him", "they", "them", "this", "that", "then", "than", "from",
    "have", "has", "had", "will", "just", "like", "make", "made", "say", "said", "one",
    "two", "get", "got", "let", "see", "saw", "who", "how", "now", "new", "old", "out",
    "off", "too", "yeah", "ooh", "hey",
];

/// Letter substitutions approximating pronunciation
const PHONETIC_RULES: &[(&str, &str)] = &[("ph", "f"), ("ck", "k"), ("qu", "kw"), ("x", "ks"), ("z", "s")];

static BUILTIN: Lazy<Arc<Lexicon>> =
    Lazy::new(|| Arc::new(Lexicon::from_tables(CORRECTIONS, VOCABULARY, PHONETIC_RULES)));

/// One whole-word replacement rule
#[derive(Debug)]
struct Substitution {
    pattern: Regex,
    replacement: &'static str,
}

/// Correction tables for query expansion and phonetic rules for scoring
#[derive(Debug)]
pub struct Lexicon {
    substitutions: Vec<Substitution>,
    vocabulary: Vec<&'static str>,
    phonetic_rules: Vec<(&'static str, &'static str)>,
}

impl Lexicon {
    /// Process-wide built-in tables
    pub fn builtin() -> Arc<Lexicon> {
        Arc::clone(&BUILTIN)
    }

    pub fn from_tables(
        corrections: &[(&'static str, &'static str)],
        vocabulary: &[&'static str],
        phonetic_rules: &[(&'static str, &'static str)],
    ) -> Self {
        // Rules that fail to compile are dropped; expansion works with the rest
        let substitutions = corrections
            .iter()
            .filter_map(|&(from, to)| {
                match Regex::new(&format!(r"\b{}\b", regex::escape(from))) {
                    Ok(pattern) => Some(Substitution {
                        pattern,
                        replacement: to,
                    }),
                    Err(e) => {
                        tracing::warn!(rule = %from, error = %e, "Skipping correction rule");
                        None
                    }
                }
            })
            .collect();

        Self {
            substitutions,
            vocabulary: vocabulary.to_vec(),
            phonetic_rules: phonetic_rules.to_vec(),
        }
    }

    /// Every single-rule rewrite of `text` that changes it, in rule order
    pub fn substitution_variants(&self, text: &str) -> Vec<String> {
        self.substitutions
            .iter()
            .filter(|rule| rule.pattern.is_match(text))
            .map(|rule| rule.pattern.replace_all(text, NoExpand(rule.replacement)).into_owned())
            .filter(|rewritten| rewritten != text)
            .collect()
    }

    pub fn vocabulary(&self) -> &[&'static str] {
        &self.vocabulary
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.vocabulary.contains(&word)
    }

    pub fn phonetic_rules(&self) -> &[(&'static str, &'static str)] {
        &self.phonetic_rules
    }
}
