use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LinkChangeEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LinkChangeEvents::Sequence)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LinkChangeEvents::Kind).string().not_null())
                    .col(ColumnDef::new(LinkChangeEvents::CrawlId).string().not_null())
                    .col(ColumnDef::new(LinkChangeEvents::ParentUrl).text().not_null())
                    .col(ColumnDef::new(LinkChangeEvents::NewImage).json_binary())
                    .col(
                        ColumnDef::new(LinkChangeEvents::CreatedAt)
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
            .drop_table(Table::drop().table(LinkChangeEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LinkChangeEvents {
    Table,
    Sequence,
    Kind,
    CrawlId,
    ParentUrl,
    NewImage,
    CreatedAt,
}
