use sea_orm::entity::prelude::*;

/// One photo-ID verification attempt.
/// `status` is one of created, ready, submitted, must_retry, approved, denied.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "photo_verifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub status_changed_at: chrono::DateTime<chrono::Utc>,
    /// Profile name copied when the attempt became ready; empty before that.
    pub name: String,
    pub face_image_url: String,
    pub photo_id_image_url: String,
    /// Base64 of the per-attempt AES key wrapped with the vendor's RSA public key.
    pub photo_id_key: String,
    #[sea_orm(unique)]
    pub receipt_id: String,
    pub error_msg: String,
    pub error_code: String,
    pub reviewing_service: String,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
