//! The closed category catalog and keyboard labels.
//!
//! Every tracked price index pairs a human-facing button label with the
//! stable slug stored on submissions. The label set is closed: category
//! input that is not an exact label match is rejected.

use serde::{Deserialize, Serialize};

/// Tracked price indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexSlug {
    StrawberryEgg,
    PlovLaziness,
    MilkEco,
    Tutor,
}

impl IndexSlug {
    /// Every catalog entry, in menu order.
    pub const ALL: [IndexSlug; 4] = [
        Self::StrawberryEgg,
        Self::PlovLaziness,
        Self::MilkEco,
        Self::Tutor,
    ];

    /// Keyboard label shown for this index.
    pub fn label(&self) -> &'static str {
        match self {
            Self::StrawberryEgg => "🍓 Клубника / Яйцо",
            Self::PlovLaziness => "🍛 Плов (Лень)",
            Self::MilkEco => "🥛 Молоко (Эко)",
            Self::Tutor => "🎓 Репетитор",
        }
    }

    /// Exact-match lookup from a keyboard label.
    pub fn from_label(text: &str) -> Option<IndexSlug> {
        Self::ALL.iter().copied().find(|slug| slug.label() == text)
    }

    /// The slug string stored with submissions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StrawberryEgg => "strawberry_egg",
            Self::PlovLaziness => "plov_laziness",
            Self::MilkEco => "milk_eco",
            Self::Tutor => "tutor",
        }
    }
}

impl std::fmt::Display for IndexSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location suggestions shown at the second step. Free text is accepted
/// there; the buttons only cover the common answers.
pub const LOCATION_LABELS: [&str; 4] = [
    "🛒 Супермаркет (Korzinka)",
    "🎪 Базар / Частник",
    "🚚 Доставка",
    "🏫 Учебный центр",
];

/// Label of the skip button offered at the photo step.
pub const SKIP_PHOTO_LABEL: &str = "Пропустить фото ➡️";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_label_round_trips() {
        for slug in IndexSlug::ALL {
            assert_eq!(IndexSlug::from_label(slug.label()), Some(slug));
        }
    }

    #[test]
    fn unknown_label_is_rejected() {
        assert_eq!(IndexSlug::from_label("Клубника"), None);
        assert_eq!(IndexSlug::from_label(""), None);
    }

    #[test]
    fn slug_serializes_snake_case() {
        let json = serde_json::to_string(&IndexSlug::StrawberryEgg).unwrap();
        assert_eq!(json, "\"strawberry_egg\"");

        let parsed: IndexSlug = serde_json::from_str("\"plov_laziness\"").unwrap();
        assert_eq!(parsed, IndexSlug::PlovLaziness);
    }

    #[test]
    fn display_matches_slug() {
        assert_eq!(IndexSlug::MilkEco.to_string(), "milk_eco");
        assert_eq!(IndexSlug::Tutor.to_string(), "tutor");
    }
}
