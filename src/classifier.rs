use serde::Serialize;

/// Mood tags, a closed enumeration. Detection scans `MOOD_KEYWORDS` in
/// declaration order and the first entry with a matching keyword wins, so
/// the table order is part of the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Happy,
    Sad,
    Romantic,
    Adventurous,
    Mysterious,
    Thoughtful,
    Exciting,
    Calm,
    Nostalgic,
    Inspiring,
    Dark,
    Fantasy,
    SciFi,
    Horror,
    Comedy,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Romantic => "romantic",
            Mood::Adventurous => "adventurous",
            Mood::Mysterious => "mysterious",
            Mood::Thoughtful => "thoughtful",
            Mood::Exciting => "exciting",
            Mood::Calm => "calm",
            Mood::Nostalgic => "nostalgic",
            Mood::Inspiring => "inspiring",
            Mood::Dark => "dark",
            Mood::Fantasy => "fantasy",
            Mood::SciFi => "sci_fi",
            Mood::Horror => "horror",
            Mood::Comedy => "comedy",
        }
    }

    /// Parse a user-supplied mood name; accepts the wire tag form only.
    pub fn parse(s: &str) -> Option<Mood> {
        MOOD_KEYWORDS
            .iter()
            .map(|(mood, _)| *mood)
            .find(|m| m.as_str() == s.trim().to_lowercase())
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fallback when no keyword matches.
pub const DEFAULT_MOOD: Mood = Mood::Thoughtful;

const MOOD_KEYWORDS: &[(Mood, &[&str])] = &[
    (Mood::Happy, &["happy", "cheerful", "joyful", "upbeat", "positive", "light", "fun"]),
    (Mood::Sad, &["sad", "depressed", "down", "melancholy", "sorrowful", "blue"]),
    (Mood::Romantic, &["romantic", "love", "romance", "dating", "relationship", "heart"]),
    (Mood::Adventurous, &["adventure", "adventurous", "exciting", "thrilling", "action", "journey"]),
    (Mood::Mysterious, &["mystery", "mysterious", "secret", "puzzle", "detective", "crime"]),
    (Mood::Thoughtful, &["thoughtful", "deep", "philosophical", "reflective", "contemplative"]),
    (Mood::Exciting, &["exciting", "thrilling", "intense", "action-packed", "fast-paced"]),
    (Mood::Calm, &["calm", "peaceful", "relaxing", "serene", "tranquil", "zen"]),
    (Mood::Nostalgic, &["nostalgic", "nostalgia", "memories", "remembering", "past"]),
    (Mood::Inspiring, &["inspiring", "motivational", "uplifting", "empowering", "encouraging"]),
    (Mood::Dark, &["dark", "grim", "gritty", "noir", "dystopian"]),
    (Mood::Fantasy, &["fantasy", "magical", "wizard", "dragon", "epic"]),
    (Mood::SciFi, &["sci-fi", "science fiction", "space", "futuristic", "alien"]),
    (Mood::Horror, &["horror", "scary", "frightening", "terrifying", "haunted"]),
    (Mood::Comedy, &["funny", "humor", "comedy", "comical", "hilarious", "witty"]),
];

/// Deterministic keyword classifier: lowercase the input and return the tag
/// of the first table entry with a keyword that is a substring of it.
pub fn detect_mood(text: &str) -> Mood {
    let lower = text.to_lowercase();
    for (mood, keywords) in MOOD_KEYWORDS {
        if keywords.iter().any(|k| lower.contains(k)) {
            return *mood;
        }
    }
    DEFAULT_MOOD
}

/// A genre hit: the genre tag plus the keyword that triggered it, kept so
/// franchise self-exclusion can filter the matched title back out of the
/// recommendations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreMatch {
    pub genre: &'static str,
    pub keyword: &'static str,
}

// Specific genres come before the generic "fiction" bucket so that e.g.
// "mystery novels" classifies as mystery, not fiction-by-"novel".
const GENRE_KEYWORDS: &[(&str, &[&str])] = &[
    ("fantasy", &[
        "harry potter", "potter", "game of thrones", "narnia", "lord of the rings", "hobbit",
        "fantasy", "magic", "wizard", "witch", "dragon", "kingdom", "quest", "epic", "mythical",
    ]),
    ("mystery", &["mystery", "detective", "crime", "thriller", "sherlock", "murder", "suspense"]),
    ("science fiction", &[
        "sci-fi", "science fiction", "space", "futuristic", "dystopian", "alien", "robot",
        "cyberpunk", "technology",
    ]),
    ("horror", &["horror", "scary", "ghost", "zombie", "vampire", "haunted", "terror"]),
    ("romance", &["romance", "love", "romantic", "relationship", "dating"]),
    ("biography", &["biography", "autobiography", "memoir", "life story", "real life"]),
    ("history", &["history", "historical", "war", "past", "ancient"]),
    ("philosophy", &["philosophy", "philosophical", "wisdom", "meaning", "existential"]),
    ("poetry", &["poetry", "poem", "verse", "rhyme"]),
    ("fiction", &["fiction", "novel", "story", "literature", "classic"]),
];

/// Franchise keywords whose own titles are excluded from the resulting
/// recommendations (no point recommending the book the user already named).
pub const FRANCHISES: &[&str] = &["harry potter", "game of thrones", "narnia", "lord of the rings"];

/// Genre detection over the fixed ordered table. Returns `None` when nothing
/// matches; callers must handle that distinctly rather than defaulting.
pub fn detect_genre(text: &str) -> Option<GenreMatch> {
    let lower = text.to_lowercase();
    for (genre, keywords) in GENRE_KEYWORDS {
        for keyword in *keywords {
            if lower.contains(keyword) {
                return Some(GenreMatch { genre, keyword });
            }
        }
    }
    None
}
