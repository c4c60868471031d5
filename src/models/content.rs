//! Site content: FAQs, banners, legal texts and contact details

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

string_enum! {
    LegalKind, "legal content type" {
        Terms => "terms",
        Privacy => "privacy",
    }
}

fn default_true() -> bool {
    true
}

/// Bilingual (ro/ru) question and answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faq {
    #[serde(rename = "faq_id")]
    pub id: String,
    pub question_ro: String,
    pub answer_ro: String,
    pub question_ru: String,
    pub answer_ru: String,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FaqInput {
    pub question_ro: String,
    pub answer_ro: String,
    pub question_ru: String,
    pub answer_ru: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl FaqInput {
    pub fn into_faq(self) -> Faq {
        Faq {
            id: super::new_id("faq"),
            question_ro: self.question_ro,
            answer_ro: self.answer_ro,
            question_ru: self.question_ru,
            answer_ru: self.answer_ru,
            sort_order: self.order,
            active: self.active,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFaqInput {
    pub question_ro: Option<String>,
    pub answer_ro: Option<String>,
    pub question_ru: Option<String>,
    pub answer_ru: Option<String>,
    pub order: Option<i32>,
    pub active: Option<bool>,
}

impl UpdateFaqInput {
    pub fn is_empty(&self) -> bool {
        self.question_ro.is_none()
            && self.answer_ro.is_none()
            && self.question_ru.is_none()
            && self.answer_ru.is_none()
            && self.order.is_none()
            && self.active.is_none()
    }

    pub fn apply_to(self, faq: &mut Faq) {
        if let Some(v) = self.question_ro {
            faq.question_ro = v;
        }
        if let Some(v) = self.answer_ro {
            faq.answer_ro = v;
        }
        if let Some(v) = self.question_ru {
            faq.question_ru = v;
        }
        if let Some(v) = self.answer_ru {
            faq.answer_ru = v;
        }
        if let Some(v) = self.order {
            faq.sort_order = v;
        }
        if let Some(v) = self.active {
            faq.active = v;
        }
    }
}

/// Promotional banner shown on the home screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Banner {
    #[serde(rename = "banner_id")]
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub badge: String,
    pub image: String,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BannerInput {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub badge: String,
    pub image: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl BannerInput {
    pub fn into_banner(self) -> Banner {
        Banner {
            id: super::new_id("banner"),
            title: self.title,
            subtitle: self.subtitle,
            badge: self.badge,
            image: self.image,
            sort_order: self.order,
            active: self.active,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBannerInput {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub badge: Option<String>,
    pub image: Option<String>,
    pub order: Option<i32>,
    pub active: Option<bool>,
}

impl UpdateBannerInput {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.subtitle.is_none()
            && self.badge.is_none()
            && self.image.is_none()
            && self.order.is_none()
            && self.active.is_none()
    }

    pub fn apply_to(self, banner: &mut Banner) {
        if let Some(v) = self.title {
            banner.title = v;
        }
        if let Some(v) = self.subtitle {
            banner.subtitle = v;
        }
        if let Some(v) = self.badge {
            banner.badge = v;
        }
        if let Some(v) = self.image {
            banner.image = v;
        }
        if let Some(v) = self.order {
            banner.sort_order = v;
        }
        if let Some(v) = self.active {
            banner.active = v;
        }
    }
}

/// Terms or privacy text in both languages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegalContent {
    #[serde(rename = "type")]
    pub kind: LegalKind,
    pub content_ro: String,
    pub content_ru: String,
    pub updated_at: Option<DateTime<Utc>>,
}

impl LegalContent {
    /// Placeholder returned before an admin saves any text
    pub fn empty(kind: LegalKind) -> Self {
        Self {
            kind,
            content_ro: String::new(),
            content_ru: String::new(),
            updated_at: None,
        }
    }
}

/// Body of a legal text save
#[derive(Debug, Clone, Deserialize)]
pub struct LegalInput {
    #[serde(default)]
    pub content_ro: String,
    #[serde(default)]
    pub content_ru: String,
}

/// Company contact details, a single record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    pub phone: String,
    pub email: String,
    pub address: String,
    pub map_embed_url: String,
    pub whatsapp_link: String,
    pub viber_link: String,
    pub telegram_link: String,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContactInput {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub map_embed_url: Option<String>,
    pub whatsapp_link: Option<String>,
    pub viber_link: Option<String>,
    pub telegram_link: Option<String>,
}

impl UpdateContactInput {
    pub fn apply_to(self, contacts: &mut ContactInfo) {
        let fields = [
            (self.phone, &mut contacts.phone),
            (self.email, &mut contacts.email),
            (self.address, &mut contacts.address),
            (self.map_embed_url, &mut contacts.map_embed_url),
            (self.whatsapp_link, &mut contacts.whatsapp_link),
            (self.viber_link, &mut contacts.viber_link),
            (self.telegram_link, &mut contacts.telegram_link),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faq_input_defaults_active() {
        let input: FaqInput = serde_json::from_value(serde_json::json!({
            "question_ro": "Q", "answer_ro": "A", "question_ru": "В", "answer_ru": "О"
        }))
        .unwrap();
        let faq = input.into_faq();
        assert!(faq.active);
        assert_eq!(faq.sort_order, 0);
        assert!(faq.id.starts_with("faq_"));
    }

    #[test]
    fn test_update_faq_partial() {
        let mut faq = FaqInput {
            question_ro: "Q".into(),
            answer_ro: "A".into(),
            question_ru: "В".into(),
            answer_ru: "О".into(),
            order: 1,
            active: true,
        }
        .into_faq();
        let update = UpdateFaqInput { active: Some(false), ..Default::default() };
        assert!(!update.is_empty());
        update.apply_to(&mut faq);
        assert!(!faq.active);
        assert_eq!(faq.sort_order, 1);
        assert!(UpdateFaqInput::default().is_empty());
    }

    #[test]
    fn test_banner_input_defaults() {
        let input: BannerInput =
            serde_json::from_value(serde_json::json!({"title": "Summer", "image": "img"})).unwrap();
        let banner = input.into_banner();
        assert_eq!(banner.subtitle, "");
        assert!(banner.active);
        assert!(banner.id.starts_with("banner_"));
    }

    #[test]
    fn test_contact_partial_merge() {
        let mut contacts = ContactInfo {
            phone: "+373 22 000 000".to_string(),
            email: "office@rent.md".to_string(),
            ..Default::default()
        };
        UpdateContactInput {
            email: Some("new@rent.md".to_string()),
            viber_link: Some("viber://chat".to_string()),
            ..Default::default()
        }
        .apply_to(&mut contacts);
        assert_eq!(contacts.phone, "+373 22 000 000");
        assert_eq!(contacts.email, "new@rent.md");
        assert_eq!(contacts.viber_link, "viber://chat");
    }

    #[test]
    fn test_legal_serializes_kind_as_type() {
        let json = serde_json::to_value(LegalContent::empty(LegalKind::Privacy)).unwrap();
        assert_eq!(json["type"], "privacy");
        assert_eq!(json["content_ro"], "");
    }
}
