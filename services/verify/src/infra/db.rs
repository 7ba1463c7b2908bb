use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
};
use uuid::Uuid;

use campus_verify_schema::{photo_verifications, user_profiles};

use crate::domain::repository::{ProfileRepository, VerificationRepository};
use crate::domain::types::{PhotoVerification, VerificationStatus};
use crate::error::VerifyServiceError;

// ── Profile repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbProfileRepository {
    pub db: DatabaseConnection,
}

impl ProfileRepository for DbProfileRepository {
    async fn find_name(&self, user_id: Uuid) -> Result<Option<String>, VerifyServiceError> {
        let model = user_profiles::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .context("find user profile")?;
        Ok(model.map(|m| m.name))
    }

    async fn upsert_name(&self, user_id: Uuid, name: &str) -> Result<(), VerifyServiceError> {
        let model = user_profiles::ActiveModel {
            user_id: Set(user_id),
            name: Set(name.to_owned()),
            updated_at: Set(Utc::now()),
        };
        user_profiles::Entity::insert(model)
            .on_conflict(
                OnConflict::column(user_profiles::Column::UserId)
                    .update_columns([user_profiles::Column::Name, user_profiles::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .context("upsert user profile")?;
        Ok(())
    }
}

// ── Verification repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbVerificationRepository {
    pub db: DatabaseConnection,
}

impl VerificationRepository for DbVerificationRepository {
    async fn create(&self, attempt: &PhotoVerification) -> Result<(), VerifyServiceError> {
        to_active_model(attempt)
            .insert(&self.db)
            .await
            .context("create verification attempt")?;
        Ok(())
    }

    async fn save(
        &self,
        attempt: &PhotoVerification,
        expected: VerificationStatus,
    ) -> Result<(), VerifyServiceError> {
        let mut model = to_active_model(attempt);
        model.id = NotSet;
        let result = photo_verifications::Entity::update_many()
            .set(model)
            .filter(photo_verifications::Column::Id.eq(attempt.id))
            .filter(photo_verifications::Column::Status.eq(expected.as_str()))
            .exec(&self.db)
            .await
            .context("save verification attempt")?;
        if result.rows_affected == 0 {
            return Err(VerifyServiceError::ConcurrentModification);
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PhotoVerification>, VerifyServiceError> {
        let model = photo_verifications::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find verification attempt")?;
        model.map(attempt_from_model).transpose()
    }

    async fn find_by_receipt_id(
        &self,
        receipt_id: &str,
    ) -> Result<Option<PhotoVerification>, VerifyServiceError> {
        let model = photo_verifications::Entity::find()
            .filter(photo_verifications::Column::ReceiptId.eq(receipt_id))
            .one(&self.db)
            .await
            .context("find verification attempt by receipt")?;
        model.map(attempt_from_model).transpose()
    }

    async fn active_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PhotoVerification>, VerifyServiceError> {
        let model = active_for_user_query(user_id)
            .one(&self.db)
            .await
            .context("find active verification attempt")?;
        model.map(attempt_from_model).transpose()
    }

    async fn exists_with_status(
        &self,
        user_id: Uuid,
        statuses: &[VerificationStatus],
        since: DateTime<Utc>,
    ) -> Result<bool, VerifyServiceError> {
        let count = photo_verifications::Entity::find()
            .filter(photo_verifications::Column::UserId.eq(user_id))
            .filter(
                photo_verifications::Column::Status
                    .is_in(statuses.iter().map(|status| status.as_str())),
            )
            .filter(photo_verifications::Column::CreatedAt.gte(since))
            .count(&self.db)
            .await
            .context("count verification attempts by status")?;
        Ok(count > 0)
    }

    async fn list_by_status(
        &self,
        status: VerificationStatus,
        limit: u64,
    ) -> Result<Vec<PhotoVerification>, VerifyServiceError> {
        let models = photo_verifications::Entity::find()
            .filter(photo_verifications::Column::Status.eq(status.as_str()))
            .order_by_asc(photo_verifications::Column::StatusChangedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .context("list verification attempts by status")?;
        models.into_iter().map(attempt_from_model).collect()
    }
}

/// The user's `ready` attempts, newest first; `id` breaks `created_at` ties.
fn active_for_user_query(user_id: Uuid) -> Select<photo_verifications::Entity> {
    photo_verifications::Entity::find()
        .filter(photo_verifications::Column::UserId.eq(user_id))
        .filter(photo_verifications::Column::Status.eq(VerificationStatus::Ready.as_str()))
        .order_by_desc(photo_verifications::Column::CreatedAt)
        .order_by_desc(photo_verifications::Column::Id)
}

fn to_active_model(attempt: &PhotoVerification) -> photo_verifications::ActiveModel {
    photo_verifications::ActiveModel {
        id: Set(attempt.id),
        user_id: Set(attempt.user_id),
        status: Set(attempt.status.as_str().to_owned()),
        status_changed_at: Set(attempt.status_changed_at),
        name: Set(attempt.name.clone()),
        face_image_url: Set(attempt.face_image_url.clone()),
        photo_id_image_url: Set(attempt.photo_id_image_url.clone()),
        photo_id_key: Set(attempt.photo_id_key.clone()),
        receipt_id: Set(attempt.receipt_id.clone()),
        error_msg: Set(attempt.error_msg.clone()),
        error_code: Set(attempt.error_code.clone()),
        reviewing_service: Set(attempt.reviewing_service.clone()),
        submitted_at: Set(attempt.submitted_at),
        created_at: Set(attempt.created_at),
        updated_at: Set(attempt.updated_at),
    }
}

fn attempt_from_model(
    model: photo_verifications::Model,
) -> Result<PhotoVerification, VerifyServiceError> {
    Ok(PhotoVerification {
        id: model.id,
        user_id: model.user_id,
        status: model.status.parse()?,
        status_changed_at: model.status_changed_at,
        name: model.name,
        face_image_url: model.face_image_url,
        photo_id_image_url: model.photo_id_image_url,
        photo_id_key: model.photo_id_key,
        receipt_id: model.receipt_id,
        error_msg: model.error_msg,
        error_code: model.error_code,
        reviewing_service: model.reviewing_service,
        submitted_at: model.submitted_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
