use std::fmt;

/// Canonical language category of an omegaUp language tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Language {
    C,
    Cpp,
    CSharp,
    Java,
    Pascal,
    Python,
    Unknown,
}

impl Language {
    /// Every category, in the order Moss buckets are submitted.
    pub const ALL: [Language; 7] = [
        Language::C,
        Language::Cpp,
        Language::CSharp,
        Language::Python,
        Language::Java,
        Language::Pascal,
        Language::Unknown,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            Language::C => ".c",
            Language::Cpp => ".cpp",
            Language::CSharp => ".cs",
            Language::Java => ".java",
            Language::Pascal => ".pascal",
            Language::Python => ".py",
            Language::Unknown => ".txt",
        }
    }

    /// Language name understood by the Moss server.
    pub fn moss_name(self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cpp => "cc",
            Language::CSharp => "csharp",
            Language::Java => "java",
            Language::Pascal => "pascal",
            Language::Python => "python",
            Language::Unknown => "ascii",
        }
    }

    /// Markers that open a comment in this language.
    pub fn comment_markers(self) -> &'static [&'static str] {
        match self {
            Language::Python => &["#"],
            _ => &["//", "/*"],
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

const OMEGAUP_LANGUAGES: &[(&str, Language)] = &[
    ("c11-clang", Language::C),
    ("c11-gcc", Language::C),
    ("cpp11-clang", Language::Cpp),
    ("cpp11-gcc", Language::Cpp),
    ("cpp17-clang", Language::Cpp),
    ("cpp17-gcc", Language::Cpp),
    ("cpp20-clang", Language::Cpp),
    ("cpp20-gcc", Language::Cpp),
    ("cs", Language::CSharp),
    ("java", Language::Java),
    ("kj", Language::Java),
    ("kp", Language::Pascal),
    ("py2", Language::Python),
    ("py3", Language::Python),
];

/// Immutable lookup from omegaUp language tags to [`Language`] categories.
///
/// Built once at startup and passed to whoever needs to classify runs.
#[derive(Debug, Clone)]
pub struct LanguageTable {
    entries: Vec<(String, Language)>,
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self::new(
            OMEGAUP_LANGUAGES
                .iter()
                .map(|(tag, language)| (tag.to_string(), *language)),
        )
    }
}

impl LanguageTable {
    pub fn new(entries: impl IntoIterator<Item = (String, Language)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Classify a tag by the longest table key it starts with.
    pub fn normalize(&self, tag: &str) -> Language {
        match self.lookup(tag) {
            Some(language) => language,
            None => {
                tracing::warn!("Extension for language {} not found", tag);
                Language::Unknown
            }
        }
    }

    /// Like [`normalize`](Self::normalize) but without the fallback.
    pub fn lookup(&self, tag: &str) -> Option<Language> {
        self.entries
            .iter()
            .filter(|(prefix, _)| tag.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, language)| *language)
    }
}
