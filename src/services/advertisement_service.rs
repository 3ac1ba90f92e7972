// src/services/advertisement_service.rs

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::AdvertisementRepository,
    models::{
        advertisement::{
            click_through_rate, select_active, select_featured, AdPosition, Advertisement,
            AdvertisementAnalytics, AdvertisementBulkAction, AdvertisementBulkPayload,
            AdvertisementFilter, CreateAdvertisementPayload, PositionCount, UpdateAdvertisementPayload,
        },
        bulk::BulkResponse,
    },
};

const TOP_ADS: i64 = 5;

#[derive(Clone)]
pub struct AdvertisementService {
    repo: AdvertisementRepository,
}

impl AdvertisementService {
    pub fn new(repo: AdvertisementRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self, filter: &AdvertisementFilter) -> Result<Vec<Advertisement>, AppError> {
        self.repo.list(filter).await
    }

    /// Anúncios ativos agora, na ordem de exibição; conta uma visualização para cada um.
    pub async fn list_public(&self, position: Option<AdPosition>) -> Result<Vec<Advertisement>, AppError> {
        let ads = select_active(self.repo.list_visible(position).await?, Utc::now());
        self.record_views(&ads);
        Ok(ads)
    }

    pub async fn list_featured(&self) -> Result<Vec<Advertisement>, AppError> {
        let ads = select_featured(self.repo.list_visible(None).await?, Utc::now());
        self.record_views(&ads);
        Ok(ads)
    }

    // Dispara o incremento em segundo plano; a resposta não espera
    fn record_views(&self, ads: &[Advertisement]) {
        if ads.is_empty() {
            return;
        }
        let ids: Vec<Uuid> = ads.iter().map(|ad| ad.id).collect();
        let repo = self.repo.clone();
        tokio::spawn(async move {
            if let Err(e) = repo.increment_views(&ids).await {
                tracing::warn!("⚠️ Falha ao contar visualizações de anúncios: {}", e);
            }
        });
    }

    /// O anúncio precisa existir; o incremento em si roda em segundo plano.
    pub async fn record_click(&self, id: Uuid) -> Result<(), AppError> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound("advertisement"));
        }
        let repo = self.repo.clone();
        tokio::spawn(async move {
            if let Err(e) = repo.increment_clicks(id).await {
                tracing::warn!("⚠️ Falha ao contar clique no anúncio {}: {}", id, e);
            }
        });
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Advertisement, AppError> {
        self.repo.find_by_id(id).await?.ok_or(AppError::NotFound("advertisement"))
    }

    pub async fn create(&self, payload: CreateAdvertisementPayload, actor: Uuid) -> Result<Advertisement, AppError> {
        let ad = self.repo.create(&payload, actor).await?;
        tracing::info!("📢 Anúncio criado: {} ({})", ad.title, ad.id);
        Ok(ad)
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: UpdateAdvertisementPayload,
        actor: Uuid,
    ) -> Result<Advertisement, AppError> {
        let mut ad = self.get(id).await?;
        payload.apply(&mut ad).map_err(|e| {
            let mut errors = validator::ValidationErrors::new();
            errors.add("endDate", e);
            AppError::ValidationError(errors)
        })?;
        self.repo.update(&ad, actor).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound("advertisement"));
        }
        Ok(())
    }

    pub async fn bulk(&self, payload: AdvertisementBulkPayload, actor: Uuid) -> Result<BulkResponse, AppError> {
        let affected = match payload.action {
            AdvertisementBulkAction::Delete => self.repo.bulk_delete(&payload.ids).await?,
            AdvertisementBulkAction::Update => {
                self.repo.bulk_update(&payload.ids, &payload.data, actor).await?
            }
            AdvertisementBulkAction::ToggleVisibility => {
                self.repo
                    .bulk_toggle_visibility(&payload.ids, payload.data.visible, actor)
                    .await?
            }
        };
        tracing::info!("📦 Operação em lote {:?} em anúncios: {} afetados", payload.action, affected);
        Ok(BulkResponse::affected(affected))
    }

    pub async fn analytics(&self) -> Result<AdvertisementAnalytics, AppError> {
        let totals = self.repo.totals().await?;
        let by_position = self
            .repo
            .count_by_position()
            .await?
            .into_iter()
            .map(|(position, count)| PositionCount { position, count })
            .collect();
        let top_by_clicks = self.repo.top_by_clicks(TOP_ADS).await?;

        Ok(AdvertisementAnalytics {
            total: totals.total,
            visible: totals.visible,
            featured: totals.featured,
            active_now: totals.active_now,
            total_clicks: totals.total_clicks,
            total_views: totals.total_views,
            click_through_rate: click_through_rate(totals.total_clicks, totals.total_views),
            by_position,
            top_by_clicks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{advertisement::AdvertisementBulkData, auth::UserRole},
        test_support,
    };

    fn ad_payload(title: &str, visible: bool) -> CreateAdvertisementPayload {
        CreateAdvertisementPayload {
            title: title.into(),
            description: None,
            image_url: "https://cdn.club.test/banner.png".into(),
            link_url: None,
            advertiser_name: Some("Sponsor".into()),
            position: AdPosition::Banner,
            visible,
            featured: false,
            display_order: 0,
            priority: 0,
            start_date: None,
            end_date: None,
        }
    }

    #[tokio::test]
    async fn toggle_visibility_touches_only_the_listed_ads() {
        let Some(db) = test_support::init_test_db().await else { return };
        let service = db.state().advertisement_service;
        let admin = db.principal(UserRole::Admin).await;

        let a = service.create(ad_payload("A", true), admin.id).await.unwrap();
        let b = service.create(ad_payload("B", false), admin.id).await.unwrap();
        let c = service.create(ad_payload("C", true), admin.id).await.unwrap();
        let untouched = service.create(ad_payload("D", true), admin.id).await.unwrap();

        let response = service
            .bulk(
                AdvertisementBulkPayload {
                    action: AdvertisementBulkAction::ToggleVisibility,
                    ids: vec![a.id, b.id, c.id],
                    data: AdvertisementBulkData::default(),
                },
                admin.id,
            )
            .await
            .unwrap();
        assert_eq!(response.affected, 3);

        assert!(!service.get(a.id).await.unwrap().visible);
        assert!(service.get(b.id).await.unwrap().visible);
        assert!(!service.get(c.id).await.unwrap().visible);
        assert!(service.get(untouched.id).await.unwrap().visible);
    }

    #[tokio::test]
    async fn click_and_view_counters_add_up_under_concurrency() {
        let Some(db) = test_support::init_test_db().await else { return };
        let service = db.state().advertisement_service;
        let admin = db.principal(UserRole::Admin).await;
        let id = service.create(ad_payload("Counted", true), admin.id).await.unwrap().id;

        let mut handles = Vec::new();
        for _ in 0..10 {
            let repo = service.repo.clone();
            handles.push(tokio::spawn(async move {
                repo.increment_clicks(id).await.unwrap();
                repo.increment_views(&[id]).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let counted = service.get(id).await.unwrap();
        assert_eq!(counted.clicks, 10);
        assert_eq!(counted.views, 10);
        assert!(!service.repo.increment_clicks(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn priority_outside_range_is_refused_by_the_database() {
        let Some(db) = test_support::init_test_db().await else { return };
        let service = db.state().advertisement_service;
        let admin = db.principal(UserRole::Admin).await;

        let mut payload = ad_payload("Loud", true);
        payload.priority = 11;
        let err = service.repo.create(&payload, admin.id).await.unwrap_err();
        assert!(matches!(err, AppError::DatabaseError(_)));
    }
}
