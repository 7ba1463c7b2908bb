pub use sea_orm_migration::prelude::*;

mod m20260401_000001_create_courses;
mod m20260401_000002_create_course_emails;
mod m20260401_000003_create_instructor_tasks;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260401_000001_create_courses::Migration),
            Box::new(m20260401_000002_create_course_emails::Migration),
            Box::new(m20260401_000003_create_instructor_tasks::Migration),
        ]
    }
}
