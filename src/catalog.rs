//! Fixed editorial data: the mood → genre-search-term mapping used by the
//! recommendation orchestrator and the curated best-seller titles that seed
//! the top-books feed.

use crate::classifier::Mood;

/// Ordered genre search terms per mood. The first term is the primary query;
/// the rest are fallbacks tried when too few unique books accumulate.
pub fn genre_terms(mood: Mood) -> &'static [&'static str] {
    match mood {
        Mood::Happy => &["comedy", "light-hearted fiction", "romance", "children books"],
        Mood::Sad => &["inspirational", "self-help", "poetry", "philosophy"],
        Mood::Romantic => &["romance novels", "classic romance", "love stories"],
        Mood::Adventurous => &["adventure fiction", "thriller", "action novels", "fantasy adventure"],
        Mood::Mysterious => &["mystery novels", "detective stories", "crime fiction", "thrillers"],
        Mood::Thoughtful => &["philosophy", "literary fiction", "classics", "biography"],
        Mood::Exciting => &["thriller", "suspense", "action", "adventure"],
        Mood::Calm => &["poetry", "meditation books", "nature writing", "philosophy"],
        Mood::Nostalgic => &["classics", "historical fiction", "biography", "memoirs"],
        Mood::Inspiring => &["biography", "self-help", "motivational", "philosophy"],
        Mood::Dark => &["horror", "gothic fiction", "thriller", "mystery"],
        Mood::Fantasy => &["fantasy novels", "sci-fi fantasy", "epic fantasy"],
        Mood::SciFi => &["science fiction", "sci-fi novels", "space opera"],
        Mood::Horror => &["horror novels", "gothic horror", "supernatural"],
        Mood::Comedy => &["humor", "comedy novels", "satire", "light fiction"],
    }
}

/// Curated well-known titles per genre, used for the exact-title lookups
/// behind the default top-books feed. Order matters: titles are fetched from
/// the front of each list.
pub const TOP_BOOKS_BY_GENRE: &[(&str, &[&str])] = &[
    ("fiction", &[
        "To Kill a Mockingbird",
        "The Great Gatsby",
        "1984",
        "Pride and Prejudice",
        "The Catcher in the Rye",
        "The Book Thief",
        "The Kite Runner",
    ]),
    ("fantasy", &[
        "Harry Potter and the Philosopher's Stone",
        "The Lord of the Rings",
        "A Game of Thrones",
        "The Chronicles of Narnia",
        "The Hobbit",
        "Mistborn",
        "The Name of the Wind",
    ]),
    ("mystery", &[
        "The Girl with the Dragon Tattoo",
        "Gone Girl",
        "The Da Vinci Code",
        "And Then There Were None",
        "The Girl on the Train",
        "Big Little Lies",
        "The Silent Patient",
    ]),
    ("romance", &[
        "Pride and Prejudice",
        "The Notebook",
        "Me Before You",
        "Outlander",
        "It Ends with Us",
        "The Fault in Our Stars",
        "The Seven Husbands of Evelyn Hugo",
    ]),
    ("science fiction", &[
        "Dune",
        "The Martian",
        "Ender's Game",
        "The Hitchhiker's Guide to the Galaxy",
        "1984",
        "Foundation",
        "The Hunger Games",
    ]),
    ("horror", &[
        "It",
        "The Shining",
        "Dracula",
        "Frankenstein",
        "The Haunting of Hill House",
        "Bird Box",
        "The Exorcist",
    ]),
    ("biography", &[
        "The Diary of a Young Girl",
        "Steve Jobs",
        "Educated",
        "The Glass Castle",
        "Born a Crime",
        "Becoming",
        "I Am Malala",
    ]),
    ("history", &[
        "Sapiens",
        "Guns, Germs, and Steel",
        "A People's History of the United States",
        "The Immortal Life of Henrietta Lacks",
        "Killers of the Flower Moon",
        "The Warmth of Other Suns",
    ]),
    ("philosophy", &[
        "Meditations",
        "The Republic",
        "Thus Spoke Zarathustra",
        "The Art of War",
        "The Prince",
        "Beyond Good and Evil",
        "Sophie's World",
    ]),
    ("poetry", &[
        "The Collected Poems of Maya Angelou",
        "Leaves of Grass",
        "The Waste Land",
        "Howl and Other Poems",
        "The Sun and Her Flowers",
        "Milk and Honey",
        "Selected Poems of Emily Dickinson",
    ]),
    ("adventure", &[
        "The Lord of the Rings",
        "Jurassic Park",
        "The Hunger Games",
        "The Hobbit",
        "Treasure Island",
        "Around the World in Eighty Days",
        "The Count of Monte Cristo",
    ]),
    ("thriller", &[
        "Gone Girl",
        "The Girl with the Dragon Tattoo",
        "The Da Vinci Code",
        "The Girl on the Train",
        "The Silent Patient",
        "Sharp Objects",
        "The Woman in the Window",
    ]),
];

pub fn curated_titles(genre: &str) -> Option<&'static [&'static str]> {
    let genre = genre.to_lowercase();
    TOP_BOOKS_BY_GENRE
        .iter()
        .find(|(g, _)| *g == genre)
        .map(|(_, titles)| *titles)
}

pub fn genre_names() -> Vec<&'static str> {
    TOP_BOOKS_BY_GENRE.iter().map(|(g, _)| *g).collect()
}

/// "science fiction" -> "Science Fiction", for UI badges.
pub fn display_name(genre: &str) -> String {
    genre
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mood_has_three_or_four_terms() {
        for (mood, _) in [
            (Mood::Happy, ()),
            (Mood::Sad, ()),
            (Mood::Romantic, ()),
            (Mood::Adventurous, ()),
            (Mood::Mysterious, ()),
            (Mood::Thoughtful, ()),
            (Mood::Exciting, ()),
            (Mood::Calm, ()),
            (Mood::Nostalgic, ()),
            (Mood::Inspiring, ()),
            (Mood::Dark, ()),
            (Mood::Fantasy, ()),
            (Mood::SciFi, ()),
            (Mood::Horror, ()),
            (Mood::Comedy, ()),
        ] {
            let terms = genre_terms(mood);
            assert!((3..=4).contains(&terms.len()), "{mood} has {}", terms.len());
        }
    }

    #[test]
    fn curated_lookup_is_case_insensitive() {
        assert!(curated_titles("Fantasy").is_some());
        assert!(curated_titles("SCIENCE FICTION").is_some());
        assert!(curated_titles("unknowngenre").is_none());
    }

    #[test]
    fn display_names_are_capitalized() {
        assert_eq!(display_name("science fiction"), "Science Fiction");
        assert_eq!(display_name("horror"), "Horror");
    }
}
