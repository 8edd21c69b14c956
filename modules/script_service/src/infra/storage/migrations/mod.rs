//! Database migrations for script service

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_scripts::Migration),
            Box::new(m20250301_000002_create_script_elements::Migration),
        ]
    }
}

mod m20250301_000001_create_scripts {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_scripts"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Scripts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Scripts::ScriptId)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Scripts::ShowId).uuid().not_null())
                        .col(ColumnDef::new(Scripts::ScriptName).string().not_null())
                        .col(
                            ColumnDef::new(Scripts::ScriptStatus)
                                .string()
                                .not_null()
                                .default("DRAFT"),
                        )
                        .col(ColumnDef::new(Scripts::StartTime).timestamp_with_time_zone())
                        .col(ColumnDef::new(Scripts::EndTime).timestamp_with_time_zone())
                        .col(ColumnDef::new(Scripts::ScriptNotes).text())
                        .col(ColumnDef::new(Scripts::CreatedBy).uuid())
                        .col(ColumnDef::new(Scripts::UpdatedBy).uuid())
                        .col(
                            ColumnDef::new(Scripts::DateCreated)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(Scripts::DateUpdated)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_scripts_show_id")
                        .table(Scripts::Table)
                        .col(Scripts::ShowId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Scripts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Scripts {
        Table,
        ScriptId,
        ShowId,
        ScriptName,
        ScriptStatus,
        StartTime,
        EndTime,
        ScriptNotes,
        CreatedBy,
        UpdatedBy,
        DateCreated,
        DateUpdated,
    }
}

mod m20250301_000002_create_script_elements {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_script_elements"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ScriptElements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ScriptElements::ElementId)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(ScriptElements::ScriptId).uuid().not_null())
                        .col(
                            ColumnDef::new(ScriptElements::ElementType)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ScriptElements::Sequence).integer().not_null())
                        .col(
                            ColumnDef::new(ScriptElements::OffsetMs)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(ScriptElements::DurationMs).big_integer())
                        .col(
                            ColumnDef::new(ScriptElements::ElementName)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ScriptElements::CueNotes).text())
                        .col(ColumnDef::new(ScriptElements::CustomColor).string())
                        .col(ColumnDef::new(ScriptElements::DepartmentId).uuid())
                        .col(ColumnDef::new(ScriptElements::ParentElementId).uuid())
                        .col(
                            ColumnDef::new(ScriptElements::GroupLevel)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ScriptElements::IsCollapsed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(ScriptElements::CreatedBy).uuid())
                        .col(ColumnDef::new(ScriptElements::UpdatedBy).uuid())
                        .col(
                            ColumnDef::new(ScriptElements::DateCreated)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(ScriptElements::DateUpdated)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_script_elements_script")
                                .from(ScriptElements::Table, ScriptElements::ScriptId)
                                .to(Scripts::Table, Scripts::ScriptId)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_script_elements_parent")
                                .from(ScriptElements::Table, ScriptElements::ParentElementId)
                                .to(ScriptElements::Table, ScriptElements::ElementId)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            // Commits park rewritten rows at negative sequences before reassigning
            manager
                .create_index(
                    Index::create()
                        .name("uq_script_elements_script_sequence")
                        .table(ScriptElements::Table)
                        .col(ScriptElements::ScriptId)
                        .col(ScriptElements::Sequence)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_script_elements_parent")
                        .table(ScriptElements::Table)
                        .col(ScriptElements::ParentElementId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ScriptElements::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ScriptElements {
        Table,
        ElementId,
        ScriptId,
        ElementType,
        Sequence,
        OffsetMs,
        DurationMs,
        ElementName,
        CueNotes,
        CustomColor,
        DepartmentId,
        ParentElementId,
        GroupLevel,
        IsCollapsed,
        CreatedBy,
        UpdatedBy,
        DateCreated,
        DateUpdated,
    }

    #[derive(DeriveIden)]
    enum Scripts {
        Table,
        ScriptId,
    }
}
