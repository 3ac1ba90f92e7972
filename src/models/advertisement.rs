// src/models/advertisement.rs

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Máximo de anúncios devolvidos pela vitrine de destaques.
pub const FEATURED_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "ad_position", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AdPosition {
    Banner,
    Sidebar,
    Inline,
    Footer,
    Popup,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Advertisement {
    pub id: Uuid,
    #[schema(example = "Summer Camp 2025")]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "/uploads/ads/summer-camp.png")]
    pub image_url: String,
    pub link_url: Option<String>,
    pub advertiser_name: Option<String>,
    pub position: AdPosition,
    pub visible: bool,
    pub featured: bool,
    #[serde(rename = "order")]
    pub display_order: i32,
    pub priority: i32,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub clicks: i64,
    pub views: i64,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Advertisement {
    /// Visível e dentro da janela opcional [start, end].
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.visible
            && self.start_date.is_none_or(|start| start <= now)
            && self.end_date.is_none_or(|end| now <= end)
    }
}

/// featured desc, order asc, priority desc, createdAt desc.
pub fn display_order(a: &Advertisement, b: &Advertisement) -> Ordering {
    b.featured
        .cmp(&a.featured)
        .then(a.display_order.cmp(&b.display_order))
        .then(b.priority.cmp(&a.priority))
        .then(b.created_at.cmp(&a.created_at))
}

pub fn select_active(ads: Vec<Advertisement>, now: DateTime<Utc>) -> Vec<Advertisement> {
    let mut active: Vec<Advertisement> = ads.into_iter().filter(|ad| ad.is_active_at(now)).collect();
    active.sort_by(display_order);
    active
}

pub fn select_featured(ads: Vec<Advertisement>, now: DateTime<Utc>) -> Vec<Advertisement> {
    let mut featured: Vec<Advertisement> = select_active(ads, now)
        .into_iter()
        .filter(|ad| ad.featured)
        .collect();
    featured.truncate(FEATURED_LIMIT);
    featured
}

fn validate_schedule(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            let mut err = ValidationError::new("date_range");
            err.message = Some("Start date must not be after end date.".into());
            return Err(err);
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_schedule", skip_on_field_errors = false))]
pub struct CreateAdvertisementPayload {
    #[validate(length(min = 1, max = 100, message = "Title must have 1 to 100 characters."))]
    pub title: String,
    #[validate(length(max = 500, message = "Description must have at most 500 characters."))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Image URL is required."))]
    pub image_url: String,
    pub link_url: Option<String>,
    pub advertiser_name: Option<String>,
    #[serde(default = "default_position")]
    pub position: AdPosition,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, rename = "order")]
    pub display_order: i32,
    #[validate(range(min = 0, max = 10, message = "Priority must be between 0 and 10."))]
    #[serde(default)]
    pub priority: i32,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

fn validate_create_schedule(p: &CreateAdvertisementPayload) -> Result<(), ValidationError> {
    validate_schedule(p.start_date, p.end_date)
}

fn default_position() -> AdPosition {
    AdPosition::Banner
}

fn default_true() -> bool {
    true
}

/// Campos permitidos na atualização; ausentes ficam como estão.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdvertisementPayload {
    #[validate(length(min = 1, max = 100, message = "Title must have 1 to 100 characters."))]
    pub title: Option<String>,
    #[validate(length(max = 500, message = "Description must have at most 500 characters."))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Image URL is required."))]
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub advertiser_name: Option<String>,
    pub position: Option<AdPosition>,
    pub visible: Option<bool>,
    pub featured: Option<bool>,
    #[serde(rename = "order")]
    pub display_order: Option<i32>,
    #[validate(range(min = 0, max = 10, message = "Priority must be between 0 and 10."))]
    pub priority: Option<i32>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl UpdateAdvertisementPayload {
    /// Aplica os campos presentes e valida a janela resultante.
    pub fn apply(self, ad: &mut Advertisement) -> Result<(), ValidationError> {
        if let Some(v) = self.title {
            ad.title = v;
        }
        if let Some(v) = self.description {
            ad.description = Some(v);
        }
        if let Some(v) = self.image_url {
            ad.image_url = v;
        }
        if let Some(v) = self.link_url {
            ad.link_url = Some(v);
        }
        if let Some(v) = self.advertiser_name {
            ad.advertiser_name = Some(v);
        }
        if let Some(v) = self.position {
            ad.position = v;
        }
        if let Some(v) = self.visible {
            ad.visible = v;
        }
        if let Some(v) = self.featured {
            ad.featured = v;
        }
        if let Some(v) = self.display_order {
            ad.display_order = v;
        }
        if let Some(v) = self.priority {
            ad.priority = v;
        }
        if let Some(v) = self.start_date {
            ad.start_date = Some(v);
        }
        if let Some(v) = self.end_date {
            ad.end_date = Some(v);
        }
        validate_schedule(ad.start_date, ad.end_date)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AdvertisementFilter {
    pub position: Option<AdPosition>,
    pub visible: Option<bool>,
    pub featured: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PublicAdvertisementFilter {
    pub position: Option<AdPosition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum AdvertisementBulkAction {
    Delete,
    Update,
    ToggleVisibility,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvertisementBulkPayload {
    pub action: AdvertisementBulkAction,
    #[validate(length(min = 1, message = "At least one id is required."))]
    pub ids: Vec<Uuid>,
    #[validate(nested)]
    #[serde(default)]
    pub data: AdvertisementBulkData,
}

/// Campos aceitos em `update`/`toggleVisibility` em lote.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvertisementBulkData {
    pub visible: Option<bool>,
    pub featured: Option<bool>,
    pub position: Option<AdPosition>,
    #[validate(range(min = 0, max = 10, message = "Priority must be between 0 and 10."))]
    pub priority: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PositionCount {
    pub position: AdPosition,
    pub count: i64,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvertisementStats {
    pub id: Uuid,
    pub title: String,
    pub clicks: i64,
    pub views: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvertisementAnalytics {
    pub total: i64,
    pub visible: i64,
    pub featured: i64,
    pub active_now: i64,
    pub total_clicks: i64,
    pub total_views: i64,
    /// cliques / visualizações, em %
    pub click_through_rate: f64,
    pub by_position: Vec<PositionCount>,
    pub top_by_clicks: Vec<AdvertisementStats>,
}

pub fn click_through_rate(clicks: i64, views: i64) -> f64 {
    if views <= 0 {
        return 0.0;
    }
    (clicks as f64 / views as f64 * 10_000.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ad(title: &str) -> Advertisement {
        let now = Utc::now();
        Advertisement {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            image_url: "/img.png".into(),
            link_url: None,
            advertiser_name: None,
            position: AdPosition::Banner,
            visible: true,
            featured: false,
            display_order: 0,
            priority: 0,
            start_date: None,
            end_date: None,
            clicks: 0,
            views: 0,
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn titles(ads: &[Advertisement]) -> Vec<&str> {
        ads.iter().map(|a| a.title.as_str()).collect()
    }

    #[test]
    fn visible_without_window_is_active() {
        assert!(ad("a").is_active_at(Utc::now()));
    }

    #[test]
    fn hidden_is_never_active() {
        let now = Utc::now();
        let mut hidden = ad("hidden");
        hidden.visible = false;
        hidden.start_date = Some(now - Duration::days(1));
        hidden.end_date = Some(now + Duration::days(1));
        assert!(!hidden.is_active_at(now));
    }

    #[test]
    fn window_bounds_are_respected() {
        let now = Utc::now();

        let mut inside = ad("inside");
        inside.start_date = Some(now - Duration::hours(1));
        inside.end_date = Some(now + Duration::hours(1));
        assert!(inside.is_active_at(now));

        let mut not_started = ad("future");
        not_started.start_date = Some(now + Duration::hours(1));
        assert!(!not_started.is_active_at(now));

        let mut ended = ad("past");
        ended.end_date = Some(now - Duration::seconds(1));
        assert!(!ended.is_active_at(now));

        let mut open_ended = ad("open");
        open_ended.start_date = Some(now - Duration::days(30));
        assert!(open_ended.is_active_at(now));
    }

    #[test]
    fn ordering_follows_tie_break_chain() {
        let base = Utc::now();

        let mut featured = ad("featured");
        featured.featured = true;
        featured.display_order = 9;

        let mut order_low = ad("order-1");
        order_low.display_order = 1;

        // mesmo order, prioridade decide
        let mut high_priority = ad("order-2-p5");
        high_priority.display_order = 2;
        high_priority.priority = 5;
        let mut low_priority = ad("order-2-p1");
        low_priority.display_order = 2;
        low_priority.priority = 1;

        // mesmo order e prioridade, o mais novo vem primeiro
        let mut older = ad("older");
        older.display_order = 3;
        older.created_at = base - Duration::days(2);
        let mut newer = ad("newer");
        newer.display_order = 3;
        newer.created_at = base - Duration::days(1);

        let sorted = select_active(
            vec![older, low_priority, newer, order_low, high_priority, featured],
            base,
        );

        assert_eq!(
            titles(&sorted),
            vec!["featured", "order-1", "order-2-p5", "order-2-p1", "newer", "older"]
        );
    }

    #[test]
    fn featured_is_capped_at_three() {
        let now = Utc::now();
        let ads: Vec<Advertisement> = (0..5)
            .map(|i| {
                let mut a = ad(&format!("f{i}"));
                a.featured = true;
                a.display_order = i;
                a
            })
            .chain(std::iter::once(ad("plain")))
            .collect();

        let featured = select_featured(ads, now);
        assert_eq!(featured.len(), FEATURED_LIMIT);
        assert_eq!(titles(&featured), vec!["f0", "f1", "f2"]);
    }

    #[test]
    fn featured_excludes_inactive() {
        let now = Utc::now();
        let mut expired = ad("expired");
        expired.featured = true;
        expired.end_date = Some(now - Duration::days(1));
        let mut live = ad("live");
        live.featured = true;

        assert_eq!(titles(&select_featured(vec![expired, live], now)), vec!["live"]);
    }

    #[test]
    fn update_merges_only_present_fields() {
        let mut stored = ad("original");
        stored.priority = 4;
        let payload = UpdateAdvertisementPayload {
            title: Some("renamed".into()),
            ..Default::default()
        };
        payload.apply(&mut stored).unwrap();
        assert_eq!(stored.title, "renamed");
        assert_eq!(stored.priority, 4);
    }

    #[test]
    fn update_rejects_inverted_window() {
        let now = Utc::now();
        let mut stored = ad("a");
        stored.end_date = Some(now);
        let payload = UpdateAdvertisementPayload {
            start_date: Some(now + Duration::days(1)),
            ..Default::default()
        };
        assert!(payload.apply(&mut stored).is_err());
    }

    #[test]
    fn bulk_payload_parses_camel_case_action() {
        let payload: AdvertisementBulkPayload = serde_json::from_value(serde_json::json!({
            "action": "toggleVisibility",
            "ids": [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()],
            "data": { "visible": false }
        }))
        .unwrap();
        assert_eq!(payload.action, AdvertisementBulkAction::ToggleVisibility);
        assert_eq!(payload.ids.len(), 3);
        assert_eq!(payload.data.visible, Some(false));
    }

    #[test]
    fn ctr_handles_zero_views() {
        assert_eq!(click_through_rate(5, 0), 0.0);
        assert_eq!(click_through_rate(1, 3), 33.33);
    }

    #[test]
    fn bulk_update_priority_is_range_checked() {
        let payload = AdvertisementBulkPayload {
            action: AdvertisementBulkAction::Update,
            ids: vec![Uuid::new_v4()],
            data: AdvertisementBulkData {
                priority: Some(11),
                ..Default::default()
            },
        };
        assert!(payload.validate().is_err());

        let in_range = AdvertisementBulkPayload {
            action: AdvertisementBulkAction::Update,
            ids: vec![Uuid::new_v4()],
            data: AdvertisementBulkData {
                priority: Some(10),
                ..Default::default()
            },
        };
        assert!(in_range.validate().is_ok());
    }
}
