use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Bootstrap admin account. The password must be rotated after first login;
/// the CLI `create-admin` command is the supported way to add real admins.
const DEFAULT_ADMIN_EMAIL: &str = "admin@greenledger.local";

/// Hash the default admin password with bcrypt (same cost the API uses)
fn hash_default_password() -> String {
    bcrypt::hash("password", 10).expect("Failed to hash default admin password")
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Questions)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Answers)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Categories)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Articles)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Resources)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        seed_admin(manager).await?;
        seed_content(manager).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Answers).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Questions).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Articles).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Resources).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}

async fn seed_admin(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    use crate::entities::users::Column;

    let now = chrono::Utc::now().to_rfc3339();
    let password_hash = hash_default_password();

    let insert = Query::insert()
        .into_table(Users)
        .columns([
            Column::Email,
            Column::Name,
            Column::PasswordHash,
            Column::Role,
            Column::IsBanned,
            Column::CreatedAt,
            Column::UpdatedAt,
        ])
        .values_panic([
            DEFAULT_ADMIN_EMAIL.into(),
            "Administrator".into(),
            password_hash.into(),
            "admin".into(),
            false.into(),
            now.clone().into(),
            now.into(),
        ])
        .to_owned();

    manager.exec_stmt(insert).await
}

async fn seed_content(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    let now = chrono::Utc::now().to_rfc3339();

    let categories = Query::insert()
        .into_table(Categories)
        .columns([
            crate::entities::categories::Column::Id,
            crate::entities::categories::Column::Name,
            crate::entities::categories::Column::Slug,
        ])
        .values_panic([1.into(), "Carbon Accounting".into(), "carbon-accounting".into()])
        .values_panic([2.into(), "ESG Disclosure".into(), "esg-disclosure".into()])
        .values_panic([3.into(), "Sustainability Strategy".into(), "sustainability-strategy".into()])
        .to_owned();

    manager.exec_stmt(categories).await?;

    let articles = Query::insert()
        .into_table(Articles)
        .columns([
            crate::entities::articles::Column::Title,
            crate::entities::articles::Column::Summary,
            crate::entities::articles::Column::Content,
            crate::entities::articles::Column::CategoryId,
            crate::entities::articles::Column::PublishedAt,
        ])
        .values_panic([
            "Getting started with Scope 3 inventories".into(),
            "A practical primer on mapping value-chain emissions.".into(),
            "Scope 3 emissions usually dominate a corporate footprint. This guide walks \
             through supplier data collection, spend-based estimation, and when to \
             switch to activity-based factors."
                .into(),
            1.into(),
            now.clone().into(),
        ])
        .values_panic([
            "BRSR reporting timelines explained".into(),
            "What the disclosure framework expects, and when.".into(),
            "Business Responsibility and Sustainability Reporting applies in phases. \
             We summarise the applicability thresholds and the assurance requirements \
             that follow."
                .into(),
            2.into(),
            now.clone().into(),
        ])
        .to_owned();

    manager.exec_stmt(articles).await?;

    let resources = Query::insert()
        .into_table(Resources)
        .columns([
            crate::entities::resources::Column::Title,
            crate::entities::resources::Column::Url,
            crate::entities::resources::Column::Kind,
            crate::entities::resources::Column::Description,
            crate::entities::resources::Column::CreatedAt,
        ])
        .values_panic([
            "GHG Protocol Corporate Standard".into(),
            "https://ghgprotocol.org/corporate-standard".into(),
            "guide".into(),
            "The accounting standard most inventories are built on.".into(),
            now.clone().into(),
        ])
        .values_panic([
            "Emission factor database".into(),
            "https://www.ipcc-nggip.iges.or.jp/EFDB/main.php".into(),
            "dataset".into(),
            "IPCC emission factor database for activity-based estimates.".into(),
            now.into(),
        ])
        .to_owned();

    manager.exec_stmt(resources).await
}
