// src/models/hero_text.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text_alignment", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TextAlignment {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HeroTextSettings {
    #[schema(example = "Welcome to the Club")]
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    #[schema(example = "Join now")]
    pub cta_text: Option<String>,
    #[schema(example = "/memberships")]
    pub cta_link: Option<String>,
    pub secondary_cta_text: Option<String>,
    pub secondary_cta_link: Option<String>,
    pub background_image_url: Option<String>,
    pub text_alignment: TextAlignment,
    #[schema(example = 0.5)]
    pub overlay_opacity: f64,
    pub is_active: bool,
    pub updated_by: Option<Uuid>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for HeroTextSettings {
    // Valores exibidos enquanto nada foi salvo (ou com o banner desativado)
    fn default() -> Self {
        Self {
            title: "Welcome to our Soccer Club".to_string(),
            subtitle: Some("Train. Play. Belong.".to_string()),
            description: None,
            cta_text: Some("Join the club".to_string()),
            cta_link: Some("/memberships".to_string()),
            secondary_cta_text: Some("Our programs".to_string()),
            secondary_cta_link: Some("/programs".to_string()),
            background_image_url: None,
            text_alignment: TextAlignment::Center,
            overlay_opacity: 0.5,
            is_active: true,
            updated_by: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHeroTextPayload {
    #[validate(length(min = 1, max = 120, message = "Title must have 1 to 120 characters."))]
    pub title: Option<String>,
    #[validate(length(max = 200, message = "Subtitle must have at most 200 characters."))]
    pub subtitle: Option<String>,
    #[validate(length(max = 1000, message = "Description must have at most 1000 characters."))]
    pub description: Option<String>,
    #[validate(length(max = 40, message = "Button text must have at most 40 characters."))]
    pub cta_text: Option<String>,
    pub cta_link: Option<String>,
    #[validate(length(max = 40, message = "Button text must have at most 40 characters."))]
    pub secondary_cta_text: Option<String>,
    pub secondary_cta_link: Option<String>,
    pub background_image_url: Option<String>,
    pub text_alignment: Option<TextAlignment>,
    #[validate(range(min = 0.0, max = 1.0, message = "Opacity must be between 0 and 1."))]
    pub overlay_opacity: Option<f64>,
    pub is_active: Option<bool>,
}

impl UpdateHeroTextPayload {
    pub fn apply(self, settings: &mut HeroTextSettings) {
        if let Some(v) = self.title {
            settings.title = v;
        }
        if let Some(v) = self.subtitle {
            settings.subtitle = Some(v);
        }
        if let Some(v) = self.description {
            settings.description = Some(v);
        }
        if let Some(v) = self.cta_text {
            settings.cta_text = Some(v);
        }
        if let Some(v) = self.cta_link {
            settings.cta_link = Some(v);
        }
        if let Some(v) = self.secondary_cta_text {
            settings.secondary_cta_text = Some(v);
        }
        if let Some(v) = self.secondary_cta_link {
            settings.secondary_cta_link = Some(v);
        }
        if let Some(v) = self.background_image_url {
            settings.background_image_url = Some(v);
        }
        if let Some(v) = self.text_alignment {
            settings.text_alignment = v;
        }
        if let Some(v) = self.overlay_opacity {
            settings.overlay_opacity = v;
        }
        if let Some(v) = self.is_active {
            settings.is_active = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_update_keeps_defaults() {
        let mut settings = HeroTextSettings::default();
        UpdateHeroTextPayload {
            title: Some("Tryouts open".into()),
            overlay_opacity: Some(0.8),
            ..Default::default()
        }
        .apply(&mut settings);

        assert_eq!(settings.title, "Tryouts open");
        assert_eq!(settings.overlay_opacity, 0.8);
        assert_eq!(settings.text_alignment, TextAlignment::Center);
        assert_eq!(settings.cta_link.as_deref(), Some("/memberships"));
    }

    #[test]
    fn opacity_out_of_range_is_rejected() {
        let payload = UpdateHeroTextPayload {
            overlay_opacity: Some(1.5),
            ..Default::default()
        };
        assert!(payload.validate().is_err());
    }
}
