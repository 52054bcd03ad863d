use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AvailableModels::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AvailableModels::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AvailableModels::Model)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(AvailableModels::Name).string().not_null())
                    .col(ColumnDef::new(AvailableModels::Description).text().null())
                    .col(
                        ColumnDef::new(AvailableModels::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(AvailableModels::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AvailableModels::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AvailableModels {
    Table,
    Id,
    Model,
    Name,
    Description,
    Enabled,
    CreatedAt,
}
