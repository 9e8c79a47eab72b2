//! Gateway message types.
//!
//! Defines the inbound event shape delivered by the conversation gateway,
//! the boundary commands recognized outside the step flow, and the
//! outbound prompt (text plus optional reply keyboard) with constructors
//! for every message the flow sends.

use serde::{Deserialize, Serialize};

use crate::catalog::{IndexSlug, LOCATION_LABELS, SKIP_PHOTO_LABEL};
use crate::report::Submission;

/// Opaque, process-stable identifier of the human counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One inbound gateway event.
///
/// Real clients send either text or a photo; when both are somehow
/// present the photo takes precedence at the photo step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub user: UserId,
    /// Display name, carried on first contact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Opaque photo attachment reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl InboundEvent {
    /// Create a plain text event.
    pub fn text(user: UserId, text: impl Into<String>) -> Self {
        Self {
            user,
            full_name: None,
            text: Some(text.into()),
            photo: None,
        }
    }

    /// Create a photo attachment event.
    pub fn photo(user: UserId, file_id: impl Into<String>) -> Self {
        Self {
            user,
            full_name: None,
            text: None,
            photo: Some(file_id.into()),
        }
    }

    /// The boundary command carried by this event, if any.
    pub fn command(&self) -> Option<Command> {
        self.text.as_deref().and_then(Command::parse)
    }
}

/// Commands recognized at the gateway boundary, outside the step flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `/start`: register the volunteer and greet.
    Greet,
    /// `/submit`: begin (or restart) a form.
    Begin,
}

impl Command {
    /// Parse a command from message text.
    pub fn parse(text: &str) -> Option<Command> {
        match text.trim() {
            "/start" => Some(Self::Greet),
            "/submit" => Some(Self::Begin),
            _ => None,
        }
    }
}

/// Rows of reply-keyboard button labels, in display order.
pub type Keyboard = Vec<Vec<String>>;

/// One outbound message to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub text: String,
    /// Reply keyboard to show. `None` removes any visible keyboard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<Keyboard>,
}

impl Prompt {
    /// Create a keyboard-less prompt.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    /// Create a prompt with a reply keyboard.
    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }

    /// Welcome text sent by the greet command.
    pub fn welcome(name: &str) -> Self {
        Self::plain(format!(
            "Салют, {name}! 🚀\nЯ бот проекта ПУЛЬС. Мы собираем реальные цены.\n\nНажми /submit, чтобы отправить отчет."
        ))
    }

    /// Step 1: category question with the catalog menu.
    pub fn category_menu() -> Self {
        let rows = vec![
            vec![IndexSlug::StrawberryEgg.label().to_string()],
            vec![
                IndexSlug::PlovLaziness.label().to_string(),
                IndexSlug::MilkEco.label().to_string(),
            ],
            vec![IndexSlug::Tutor.label().to_string()],
        ];
        Self::with_keyboard("Что будем оценивать?", rows)
    }

    /// Re-prompt after a category that matches no button.
    pub fn category_retry() -> Self {
        Self::plain("Пожалуйста, выбери кнопку ниже.")
    }

    /// Step 2: location question with the suggestion menu.
    pub fn location_menu() -> Self {
        let rows = vec![
            vec![LOCATION_LABELS[0].to_string()],
            vec![LOCATION_LABELS[1].to_string()],
            vec![LOCATION_LABELS[2].to_string(), LOCATION_LABELS[3].to_string()],
        ];
        Self::with_keyboard("Где зафиксирована цена?", rows)
    }

    /// Step 3: price question. Drops the keyboard.
    pub fn price_request() -> Self {
        Self::plain("Введите цену в сумах (просто число, например: 15000)")
    }

    /// Re-prompt after non-numeric price input.
    pub fn price_retry() -> Self {
        Self::plain("Пожалуйста, введите только цифры.")
    }

    /// Step 4: photo question with the skip button.
    pub fn photo_request() -> Self {
        Self::with_keyboard(
            "📸 Есть фото ценника?\nЭто поможет верификации, но **не обязательно**.",
            vec![vec![SKIP_PHOTO_LABEL.to_string()]],
        )
    }

    /// Re-prompt when the photo step got neither a photo nor the skip button.
    pub fn photo_retry() -> Self {
        Self::plain("Пришли фото или нажми кнопку 'Пропустить'.")
    }

    /// Acknowledgement for received photo evidence.
    pub fn photo_accepted() -> Self {
        Self::plain("Фото принято! 📸")
    }

    /// Acknowledgement for a skipped photo.
    pub fn photo_skipped() -> Self {
        Self::plain("Без фото? Окей, доверие — золото! 🤝")
    }

    /// Confirmation after a successful save.
    pub fn saved(submission: &Submission) -> Self {
        Self::plain(format!(
            "✅ **Данные приняты!**\nТовар: {}\nЦена: {} сум\n\nСпасибо за вклад в экономику! Жми /submit для следующего.",
            submission.index_slug, submission.price
        ))
    }

    /// Error report after a failed save. `detail` is shown verbatim.
    pub fn save_failed(detail: &str) -> Self {
        Self::plain(format!("Ошибка сохранения: {detail}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_parsing() {
        assert_eq!(Command::parse("/start"), Some(Command::Greet));
        assert_eq!(Command::parse("/submit"), Some(Command::Begin));
        assert_eq!(Command::parse(" /submit "), Some(Command::Begin));
        assert_eq!(Command::parse("/help"), None);
        assert_eq!(Command::parse("15000"), None);
    }

    #[test]
    fn event_command_reads_text() {
        let event = InboundEvent::text(UserId(7), "/submit");
        assert_eq!(event.command(), Some(Command::Begin));

        let event = InboundEvent::photo(UserId(7), "file_1");
        assert_eq!(event.command(), None);
    }

    #[test]
    fn event_serialization_skips_absent_fields() {
        let event = InboundEvent::text(UserId(42), "15000");
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, "{\"user\":42,\"text\":\"15000\"}");

        let parsed: InboundEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn category_menu_lists_every_label() {
        let prompt = Prompt::category_menu();
        let keyboard = prompt.keyboard.expect("category menu has a keyboard");
        let labels: Vec<String> = keyboard.into_iter().flatten().collect();
        for slug in IndexSlug::ALL {
            assert!(labels.iter().any(|l| l == slug.label()));
        }
    }

    #[test]
    fn price_request_drops_keyboard() {
        assert!(Prompt::price_request().keyboard.is_none());
    }

    #[test]
    fn photo_request_offers_skip() {
        let prompt = Prompt::photo_request();
        let keyboard = prompt.keyboard.expect("photo request has a keyboard");
        assert_eq!(keyboard, vec![vec![SKIP_PHOTO_LABEL.to_string()]]);
    }
}
