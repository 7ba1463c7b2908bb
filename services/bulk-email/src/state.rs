use sea_orm::DatabaseConnection;

use crate::infra::db::{DbCourseRepository, DbEmailRepository, DbTaskRepository};
use crate::infra::mail::HttpMailTransport;
use crate::usecase::send::{SendBulkEmailUseCase, SendSettings};

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub transport: HttpMailTransport,
    pub send_settings: SendSettings,
}

impl AppState {
    pub fn course_repo(&self) -> DbCourseRepository {
        DbCourseRepository {
            db: self.db.clone(),
        }
    }

    pub fn email_repo(&self) -> DbEmailRepository {
        DbEmailRepository {
            db: self.db.clone(),
        }
    }

    pub fn task_repo(&self) -> DbTaskRepository {
        DbTaskRepository {
            db: self.db.clone(),
        }
    }

    pub fn send_usecase(
        &self,
    ) -> SendBulkEmailUseCase<DbCourseRepository, DbEmailRepository, DbTaskRepository, HttpMailTransport>
    {
        SendBulkEmailUseCase {
            courses: self.course_repo(),
            emails: self.email_repo(),
            tasks: self.task_repo(),
            transport: self.transport.clone(),
            settings: self.send_settings.clone(),
        }
    }
}
