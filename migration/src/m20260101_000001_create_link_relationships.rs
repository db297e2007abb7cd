use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LinkRelationships::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(LinkRelationships::CrawlId).string().not_null())
                    .col(ColumnDef::new(LinkRelationships::ParentUrl).text().not_null())
                    .col(
                        ColumnDef::new(LinkRelationships::ChildUrls)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LinkRelationships::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(LinkRelationships::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(LinkRelationships::CrawlId)
                            .col(LinkRelationships::ParentUrl),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LinkRelationships::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LinkRelationships {
    Table,
    CrawlId,
    ParentUrl,
    ChildUrls,
    CreatedAt,
    UpdatedAt,
}
