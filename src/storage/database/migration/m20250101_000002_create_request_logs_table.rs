use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RequestLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RequestLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RequestLogs::RequestId).string().not_null())
                    .col(ColumnDef::new(RequestLogs::Operation).string().not_null())
                    .col(ColumnDef::new(RequestLogs::Identity).string().not_null())
                    .col(ColumnDef::new(RequestLogs::ApiKeyId).string().null())
                    .col(ColumnDef::new(RequestLogs::Owner).string().null())
                    .col(ColumnDef::new(RequestLogs::SourceIp).string().null())
                    .col(ColumnDef::new(RequestLogs::UserAgent).text().null())
                    .col(ColumnDef::new(RequestLogs::RequestPayload).text().null())
                    .col(
                        ColumnDef::new(RequestLogs::ResponseStatus)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RequestLogs::LatencyMs)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(RequestLogs::ErrorMessage).text().null())
                    .col(
                        ColumnDef::new(RequestLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_request_logs_api_key_id")
                            .from(RequestLogs::Table, RequestLogs::ApiKeyId)
                            .to(ApiKeys::Table, ApiKeys::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_request_logs_created_at")
                    .table(RequestLogs::Table)
                    .col(RequestLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_request_logs_api_key_id")
                    .table(RequestLogs::Table)
                    .col(RequestLogs::ApiKeyId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RequestLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum RequestLogs {
    Table,
    Id,
    RequestId,
    Operation,
    Identity,
    ApiKeyId,
    Owner,
    SourceIp,
    UserAgent,
    RequestPayload,
    ResponseStatus,
    LatencyMs,
    ErrorMessage,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ApiKeys {
    Table,
    Id,
}
