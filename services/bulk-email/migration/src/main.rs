use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(campus_bulk_email_migration::Migrator).await;
}
