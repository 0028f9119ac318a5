//! # Pluralization
//!
//! Suffix-based English inflection used by the naming conventions. Rules act on
//! the trailing word of a compound identifier, so `blog-post`, `blog_post` and
//! `BlogPost` all inflect their last word only.

/// Irregular singular/plural pairs, matched against the trailing word.
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("ox", "oxen"),
];

/// Words whose singular and plural forms are identical.
const UNCOUNTABLE: &[&str] = &[
    "data",
    "equipment",
    "feedback",
    "fish",
    "information",
    "metadata",
    "news",
    "series",
    "sheep",
    "species",
];

/// Singulars ending in `ie`, whose plural `-ies` must not become `-y`.
const IE_SINGULARS: &[&str] = &[
    "brownie", "calorie", "cookie", "die", "genie", "goalie", "hippie", "lie", "movie", "pie",
    "prairie", "rookie", "selfie", "smoothie", "tie", "zombie",
];

/// Singulars ending in `che`, whose plural `-ches` keeps the `e`.
const CHE_SINGULARS: &[&str] = &[
    "ache", "attache", "avalanche", "cache", "cliche", "headache", "moustache", "mustache",
    "niche", "psyche", "quiche",
];

/// Singulars ending in `use` after a consonant, whose plural `-uses` keeps the `e`.
const USE_SINGULARS: &[&str] = &["abuse", "accuse", "excuse", "fuse", "muse", "refuse", "ruse", "use"];

/// Stateless pluralizer for resource and relation names.
pub struct Pluralizer;

impl Pluralizer {
    /// Returns the plural form of `word`. Words that are already plural are
    /// returned unchanged.
    ///
    /// ```
    /// use api_resource_loader::pluralize::Pluralizer;
    ///
    /// assert_eq!(Pluralizer::pluralize("author"), "authors");
    /// assert_eq!(Pluralizer::pluralize("category"), "categories");
    /// assert_eq!(Pluralizer::pluralize("blog-post"), "blog-posts");
    /// assert_eq!(Pluralizer::pluralize("stats"), "stats");
    /// ```
    pub fn pluralize(word: &str) -> String {
        let (head, tail) = split_trailing_word(word);
        if tail.is_empty() || is_uncountable(tail) {
            return word.to_string();
        }
        if let Some(plural) = irregular(tail, |(singular, plural)| (singular, plural)) {
            return format!("{head}{}", match_case(tail, plural));
        }
        if irregular(tail, |(singular, plural)| (plural, singular)).is_some() || is_plural(tail) {
            return word.to_string();
        }
        format!("{head}{}", plural_of(tail))
    }

    /// Returns the singular form of `word`.
    ///
    /// ```
    /// use api_resource_loader::pluralize::Pluralizer;
    ///
    /// assert_eq!(Pluralizer::singularize("orders"), "order");
    /// assert_eq!(Pluralizer::singularize("categories"), "category");
    /// assert_eq!(Pluralizer::singularize("movies"), "movie");
    /// assert_eq!(Pluralizer::singularize("blog-posts"), "blog-post");
    /// ```
    pub fn singularize(word: &str) -> String {
        let (head, tail) = split_trailing_word(word);
        if tail.is_empty() || is_uncountable(tail) {
            return word.to_string();
        }
        if let Some(singular) = irregular(tail, |(singular, plural)| (plural, singular)) {
            return format!("{head}{}", match_case(tail, singular));
        }
        format!("{head}{}", singular_of(tail))
    }
}

/// Suffix rules for one word known to be singular.
fn plural_of(tail: &str) -> String {
    let lower = tail.to_lowercase();
    if lower.ends_with("quiz") {
        format!("{tail}zes")
    } else if lower.ends_with("sis") {
        format!("{}es", &tail[..tail.len() - 2])
    } else if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
        format!("{tail}es")
    } else if ends_with_consonant_y(&lower) {
        format!("{}ies", &tail[..tail.len() - 1])
    } else {
        format!("{tail}s")
    }
}

/// Suffix rules for one word assumed to be plural.
fn singular_of(tail: &str) -> String {
    let lower = tail.to_lowercase();
    // Short exceptions match whole words only, so `beaches` is not `beache`.
    let is_exception = |singulars: &[&str]| {
        singulars.iter().any(|w| {
            let plural = format!("{w}s");
            lower == plural || (w.len() > 4 && lower.ends_with(&plural))
        })
    };

    if lower.ends_with("yses") {
        return format!("{}is", &tail[..tail.len() - 2]);
    }
    if lower.ends_with("ies") && lower.len() > 3 && !is_exception(IE_SINGULARS) {
        return format!("{}y", &tail[..tail.len() - 3]);
    }

    let strip = if lower.ends_with("ies") {
        1
    } else if lower.ends_with("quizzes") {
        3
    } else if ["zzes", "tzes", "iases", "sses", "xes", "shes"]
        .iter()
        .any(|s| lower.ends_with(s))
    {
        2
    } else if lower.ends_with("zes") {
        1
    } else if lower.ends_with("ches") {
        if is_exception(CHE_SINGULARS) {
            1
        } else {
            2
        }
    } else if lower.ends_with("uses") {
        let vowel_before = lower[..lower.len() - 4]
            .chars()
            .last()
            .is_some_and(|c| "aeiou".contains(c));
        if vowel_before || is_exception(USE_SINGULARS) {
            1
        } else {
            2
        }
    } else if lower.ends_with('s') && !["ss", "us", "is"].iter().any(|s| lower.ends_with(s)) {
        1
    } else {
        0
    };
    tail[..tail.len() - strip].to_string()
}

/// A word is plural when it singularizes to something that pluralizes back to it.
fn is_plural(tail: &str) -> bool {
    let singular = singular_of(tail);
    singular != tail && plural_of(&singular) == tail
}

/// Splits an identifier into everything before its last word and the last word.
fn split_trailing_word(word: &str) -> (&str, &str) {
    let bytes = word.as_bytes();
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if !b.is_ascii_alphanumeric() {
            start = i + 1;
        } else if i > 0 && b.is_ascii_uppercase() && bytes[i - 1].is_ascii_lowercase() {
            start = i;
        }
    }
    word.split_at(start)
}

fn is_uncountable(word: &str) -> bool {
    let lower = word.to_lowercase();
    UNCOUNTABLE.iter().any(|w| *w == lower)
}

fn irregular(
    word: &str,
    orient: impl Fn((&'static str, &'static str)) -> (&'static str, &'static str),
) -> Option<&'static str> {
    let lower = word.to_lowercase();
    IRREGULAR
        .iter()
        .map(|pair| orient(*pair))
        .find(|(from, _)| *from == lower)
        .map(|(_, to)| to)
}

fn ends_with_consonant_y(lower: &str) -> bool {
    let mut chars = lower.chars().rev();
    matches!(
        (chars.next(), chars.next()),
        (Some('y'), Some(c)) if !"aeiou".contains(c)
    )
}

fn match_case(original: &str, replacement: &str) -> String {
    match original.chars().next() {
        Some(first) if first.is_uppercase() => {
            let mut chars = replacement.chars();
            chars
                .next()
                .map(|c| c.to_uppercase().chain(chars).collect())
                .unwrap_or_default()
        }
        _ => replacement.to_string(),
    }
}
