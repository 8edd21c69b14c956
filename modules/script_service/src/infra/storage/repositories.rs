//! SeaORM repository implementations

use crate::contract::{Script, ScriptElement};
use crate::domain::changeset::ChangeSet;
use crate::domain::repository::ScriptRepository;
use anyhow::Result;
use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::entity;

// ===== Script Repository =====

pub struct SeaOrmScriptRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmScriptRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn insert_elements(txn: &DatabaseTransaction, rows: &[ScriptElement]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let models: Vec<entity::ActiveModel> = rows.iter().map(Into::into).collect();
        entity::Entity::insert_many(models).exec(txn).await?;
        Ok(())
    }

    /// Move rows that will be rewritten or deleted to negative sequences so the
    /// final positions are free under the unique `(script_id, sequence)` index.
    async fn park_sequences(txn: &DatabaseTransaction, changes: &ChangeSet) -> Result<()> {
        let ids: Vec<Uuid> = changes
            .updates
            .iter()
            .map(|e| e.element_id)
            .chain(changes.deletes.iter().copied())
            .collect();
        if ids.is_empty() {
            return Ok(());
        }
        entity::Entity::update_many()
            .col_expr(
                entity::Column::Sequence,
                Expr::col(entity::Column::Sequence).mul(-1),
            )
            .filter(entity::Column::ScriptId.eq(changes.script_id))
            .filter(entity::Column::ElementId.is_in(ids))
            .filter(entity::Column::Sequence.gt(0))
            .exec(txn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ScriptRepository for SeaOrmScriptRepository {
    async fn find_script(&self, script_id: Uuid) -> Result<Option<Script>> {
        let result = entity::script::Entity::find_by_id(script_id)
            .one(&*self.db)
            .await?;

        result.map(Script::try_from).transpose()
    }

    async fn find_elements(&self, script_id: Uuid) -> Result<Vec<ScriptElement>> {
        let results = entity::Entity::find()
            .filter(entity::Column::ScriptId.eq(script_id))
            .order_by_asc(entity::Column::Sequence)
            .all(&*self.db)
            .await?;

        results.into_iter().map(ScriptElement::try_from).collect()
    }

    async fn commit(&self, changes: &ChangeSet) -> Result<()> {
        // Dropping the transaction on any early return rolls it back
        let txn = self.db.begin().await?;

        if let Some(script) = &changes.script {
            let active: entity::script::ActiveModel = script.into();
            entity::script::Entity::update(active).exec(&txn).await?;
        }

        Self::park_sequences(&txn, changes).await?;

        // Groups before anything that may reference them
        Self::insert_elements(&txn, &changes.group_inserts).await?;
        Self::insert_elements(&txn, &changes.element_inserts).await?;

        for element in &changes.updates {
            let active: entity::ActiveModel = element.into();
            entity::Entity::update(active)
                .filter(entity::Column::ScriptId.eq(changes.script_id))
                .exec(&txn)
                .await?;
        }

        if !changes.deletes.is_empty() {
            entity::Entity::delete_many()
                .filter(entity::Column::ScriptId.eq(changes.script_id))
                .filter(entity::Column::ElementId.is_in(changes.deletes.iter().copied()))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        tracing::debug!(
            script_id = %changes.script_id,
            rows = changes.row_count(),
            "change set committed"
        );
        Ok(())
    }
}
