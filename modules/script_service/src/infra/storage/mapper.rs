//! Entity to model mappers
//!
//! Conversions between SeaORM entities and contract models. Every column is
//! mapped by name; enum columns are stored as their upper-case tags.

use super::entity;
use crate::contract::{ElementType, Script, ScriptElement, ScriptStatus};
use anyhow::anyhow;

// ===== Script Element Conversions =====

impl TryFrom<entity::Model> for ScriptElement {
    type Error = anyhow::Error;

    fn try_from(entity: entity::Model) -> Result<Self, Self::Error> {
        let element_type = ElementType::parse(&entity.element_type).ok_or_else(|| {
            anyhow!(
                "unknown element type '{}' on element {}",
                entity.element_type,
                entity.element_id
            )
        })?;

        Ok(Self {
            element_id: entity.element_id,
            script_id: entity.script_id,
            element_type,
            sequence: entity.sequence,
            offset_ms: entity.offset_ms,
            duration_ms: entity.duration_ms,
            element_name: entity.element_name,
            cue_notes: entity.cue_notes,
            custom_color: entity.custom_color,
            department_id: entity.department_id,
            parent_element_id: entity.parent_element_id,
            group_level: entity.group_level,
            is_collapsed: entity.is_collapsed,
            created_by: entity.created_by,
            updated_by: entity.updated_by,
            date_created: entity.date_created,
            date_updated: entity.date_updated,
        })
    }
}

impl From<&ScriptElement> for entity::ActiveModel {
    fn from(model: &ScriptElement) -> Self {
        use sea_orm::ActiveValue::*;

        Self {
            element_id: Set(model.element_id),
            script_id: Set(model.script_id),
            element_type: Set(model.element_type.as_str().to_string()),
            sequence: Set(model.sequence),
            offset_ms: Set(model.offset_ms),
            duration_ms: Set(model.duration_ms),
            element_name: Set(model.element_name.clone()),
            cue_notes: Set(model.cue_notes.clone()),
            custom_color: Set(model.custom_color.clone()),
            department_id: Set(model.department_id),
            parent_element_id: Set(model.parent_element_id),
            group_level: Set(model.group_level),
            is_collapsed: Set(model.is_collapsed),
            created_by: Set(model.created_by),
            updated_by: Set(model.updated_by),
            date_created: Set(model.date_created),
            date_updated: Set(model.date_updated),
        }
    }
}

// ===== Script Conversions =====

impl TryFrom<entity::script::Model> for Script {
    type Error = anyhow::Error;

    fn try_from(entity: entity::script::Model) -> Result<Self, Self::Error> {
        let script_status = ScriptStatus::parse(&entity.script_status).ok_or_else(|| {
            anyhow!(
                "unknown script status '{}' on script {}",
                entity.script_status,
                entity.script_id
            )
        })?;

        Ok(Self {
            script_id: entity.script_id,
            show_id: entity.show_id,
            script_name: entity.script_name,
            script_status,
            start_time: entity.start_time,
            end_time: entity.end_time,
            script_notes: entity.script_notes,
            created_by: entity.created_by,
            updated_by: entity.updated_by,
            date_created: entity.date_created,
            date_updated: entity.date_updated,
        })
    }
}

impl From<&Script> for entity::script::ActiveModel {
    fn from(model: &Script) -> Self {
        use sea_orm::ActiveValue::*;

        Self {
            script_id: Set(model.script_id),
            show_id: Set(model.show_id),
            script_name: Set(model.script_name.clone()),
            script_status: Set(model.script_status.as_str().to_string()),
            start_time: Set(model.start_time),
            end_time: Set(model.end_time),
            script_notes: Set(model.script_notes.clone()),
            created_by: Set(model.created_by),
            updated_by: Set(model.updated_by),
            date_created: Set(model.date_created),
            date_updated: Set(model.date_updated),
        }
    }
}
