use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum JournalEntries {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum ApprovalRequests {
    Table,
    Id,
    EntryId,
    Action,
    RequestedBy,
    Status,
    ApprovedBy,
    ApprovedAt,
    CreatedAt,
    Payload,
}

#[derive(DeriveIden)]
enum UserRequests {
    Table,
    Id,
    RequestedBy,
    Username,
    Email,
    Role,
    Password,
    Status,
    ApprovedBy,
    ApprovedAt,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ApprovalRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ApprovalRequests::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ApprovalRequests::EntryId).big_integer().not_null())
                    .col(ColumnDef::new(ApprovalRequests::Action).string_len(20).not_null())
                    .col(
                        ColumnDef::new(ApprovalRequests::RequestedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ApprovalRequests::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(ApprovalRequests::ApprovedBy).big_integer().null())
                    .col(
                        ColumnDef::new(ApprovalRequests::ApprovedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ApprovalRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(ColumnDef::new(ApprovalRequests::Payload).json_binary().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_approval_requests_entry")
                            .from(ApprovalRequests::Table, ApprovalRequests::EntryId)
                            .to(JournalEntries::Table, JournalEntries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // queue views filter on status
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_approval_requests_status")
                    .table(ApprovalRequests::Table)
                    .col(ApprovalRequests::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserRequests::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserRequests::RequestedBy).big_integer().not_null())
                    .col(ColumnDef::new(UserRequests::Username).string_len(150).not_null())
                    .col(
                        ColumnDef::new(UserRequests::Email)
                            .string_len(254)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(UserRequests::Role).string_len(20).not_null())
                    .col(
                        ColumnDef::new(UserRequests::Password)
                            .string_len(128)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(UserRequests::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(UserRequests::ApprovedBy).big_integer().null())
                    .col(
                        ColumnDef::new(UserRequests::ApprovedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_requests_status")
                    .table(UserRequests::Table)
                    .col(UserRequests::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ApprovalRequests::Table).to_owned())
            .await?;
        Ok(())
    }
}
