use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(ColumnDef::new(Users::Role).string_len(16).not_null())
                    .col(ColumnDef::new(Users::RollNo).string())
                    .col(ColumnDef::new(Users::Department).string())
                    .col(ColumnDef::new(Users::Year).string())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create QR session table
        manager
            .create_table(
                Table::create()
                    .table(QrCodesAdmin::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(QrCodesAdmin::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(QrCodesAdmin::SessionType).string().not_null())
                    .col(ColumnDef::new(QrCodesAdmin::Code).text().not_null())
                    .col(
                        ColumnDef::new(QrCodesAdmin::GeneratedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(QrCodesAdmin::ExpiresAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(QrCodesAdmin::Latitude).double())
                    .col(ColumnDef::new(QrCodesAdmin::Longitude).double())
                    .col(ColumnDef::new(QrCodesAdmin::Radius).double())
                    .col(
                        ColumnDef::new(QrCodesAdmin::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        // The resolver filters on is_active and orders by generated_at.
        manager
            .create_index(
                Index::create()
                    .name("idx_qr_codes_admin_active")
                    .table(QrCodesAdmin::Table)
                    .col(QrCodesAdmin::IsActive)
                    .col(QrCodesAdmin::GeneratedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(QrCodesAdmin::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Password,
    Role,
    RollNo,
    Department,
    Year,
    CreatedAt,
}

#[derive(DeriveIden)]
enum QrCodesAdmin {
    Table,
    Id,
    SessionType,
    Code,
    GeneratedAt,
    ExpiresAt,
    Latitude,
    Longitude,
    Radius,
    IsActive,
}
