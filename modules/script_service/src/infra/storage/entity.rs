//! SeaORM entities for database tables

use sea_orm::entity::prelude::*;

/// Script elements table entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "script_elements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub element_id: Uuid,

    /// Owning script
    pub script_id: Uuid,

    /// CUE, NOTE or GROUP
    pub element_type: String,

    /// Dense 1..N position within the script
    pub sequence: i32,

    pub offset_ms: i64,

    /// Derived for groups
    pub duration_ms: Option<i64>,

    pub element_name: String,
    pub cue_notes: Option<String>,
    pub custom_color: Option<String>,
    pub department_id: Option<Uuid>,

    /// Group this element belongs to
    pub parent_element_id: Option<Uuid>,

    pub group_level: i32,
    pub is_collapsed: bool,

    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub date_created: DateTimeUtc,
    pub date_updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Foreign key to scripts
    #[sea_orm(
        belongs_to = "script::Entity",
        from = "Column::ScriptId",
        to = "script::Column::ScriptId"
    )]
    Script,

    /// Self-referencing group membership
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentElementId",
        to = "Column::ElementId"
    )]
    ParentGroup,
}

impl Related<script::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Script.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Scripts table module
pub mod script {
    use sea_orm::entity::prelude::*;

    /// Scripts table entity
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "scripts")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub script_id: Uuid,

        /// Owning show (managed elsewhere)
        pub show_id: Uuid,

        pub script_name: String,

        /// DRAFT, COPY, WORKING, FINAL or IMPORTED
        pub script_status: String,

        pub start_time: Option<DateTimeUtc>,
        pub end_time: Option<DateTimeUtc>,
        pub script_notes: Option<String>,

        pub created_by: Option<Uuid>,
        pub updated_by: Option<Uuid>,
        pub date_created: DateTimeUtc,
        pub date_updated: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        /// One-to-many relationship with script elements
        #[sea_orm(has_many = "super::Entity")]
        Elements,
    }

    impl Related<super::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Elements.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}
