use sea_orm::ActiveValue::{NotSet, Set};
use tracing::warn;
use uuid::Uuid;

use crate::errors::Result;
use crate::storage::models::{
    Cta, CtaStatus, CtaType, NewEvent, TargetingMode, merge_with_defaults,
};
use migration::entities::{cta, cta_event};

/// 将 Sea-ORM Model 转换为 Cta
///
/// 枚举列与 JSON 分区在这里做读时规范化。
pub fn model_to_cta(model: cta::Model) -> Cta {
    let uuid = Uuid::parse_str(&model.uuid).unwrap_or_else(|_| {
        warn!("CTA {} has an invalid uuid '{}'", model.id, model.uuid);
        Uuid::nil()
    });

    Cta {
        id: model.id,
        uuid,
        slug: model.slug,
        title: model.title,
        name: model.name,
        status: CtaStatus::normalize(&model.status),
        targeting: TargetingMode::normalize(&model.targeting),
        cta_type: CtaType::normalize(&model.cta_type),
        content: merge_with_defaults(&model.content),
        style: merge_with_defaults(&model.style),
        behavior: merge_with_defaults(&model.behavior),
        schedule_start: model.schedule_start,
        schedule_end: model.schedule_end,
        is_enabled: model.is_enabled,
        is_demo: model.is_demo,
        trashed_at: model.trashed_at,
        published_at: model.published_at,
        first_active_at: model.first_active_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

/// 将 Cta 转换为 ActiveModel（用于插入/更新）
///
/// 新建时 id 由数据库分配；更新时 uuid 与 created_at 不变。
pub fn cta_to_active_model(cta: &Cta, is_new: bool) -> Result<cta::ActiveModel> {
    Ok(cta::ActiveModel {
        id: NotSet,
        uuid: if is_new {
            Set(cta.uuid.to_string())
        } else {
            NotSet
        },
        slug: Set(cta.slug.clone()),
        title: Set(cta.title.clone()),
        name: Set(cta.name.clone()),
        status: Set(cta.status.to_string()),
        targeting: Set(cta.targeting.to_string()),
        cta_type: Set(cta.cta_type.to_string()),
        content: Set(serde_json::to_string(&cta.content)?),
        style: Set(serde_json::to_string(&cta.style)?),
        behavior: Set(serde_json::to_string(&cta.behavior)?),
        schedule_start: Set(cta.schedule_start),
        schedule_end: Set(cta.schedule_end),
        is_enabled: Set(cta.is_enabled),
        is_demo: Set(cta.is_demo),
        trashed_at: Set(cta.trashed_at),
        published_at: Set(cta.published_at),
        first_active_at: Set(cta.first_active_at),
        created_at: if is_new { Set(cta.created_at) } else { NotSet },
        updated_at: Set(cta.updated_at),
    })
}

pub fn new_event_to_active_model(event: &NewEvent) -> cta_event::ActiveModel {
    cta_event::ActiveModel {
        id: NotSet,
        cta_id: Set(event.cta_id),
        event_type: Set(event.event_type.to_string()),
        occurred_at: Set(event.occurred_at),
        page_url: Set(event.page_url.clone()),
        page_url_hash: Set(event.page_url_hash.clone()),
        page_title: Set(event.page_title.clone()),
        visitor_id: Set(event.visitor_id),
    }
}
