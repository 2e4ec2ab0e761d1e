//! Ping endpoint handlers: ingestion and history.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{TimeZone, Utc};
use persistence::repositories::{AnimalRepository, PingHistoryQuery, PingRepository};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::ProcessError;
use domain::models::ping::{
    GetPingHistoryQuery, IngestPingRequest, IngestPingResponse, PaginationInfo, PingHistoryItem,
    PingHistoryResponse, SortOrder,
};

/// Ingest one GPS ping and run geofence detection.
///
/// POST /api/v1/pings
pub async fn ingest_ping(
    State(state): State<AppState>,
    Json(request): Json<IngestPingRequest>,
) -> Result<(StatusCode, Json<IngestPingResponse>), ApiError> {
    request.validate().map_err(|e| {
        let errors: Vec<String> = e
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |err| {
                    format!("{}: {}", field, err.message.as_ref().unwrap_or(&"".into()))
                })
            })
            .collect();
        ApiError::Validation(errors.join(", "))
    })?;

    let response = state.processor.process(request).await.map_err(|e| match e {
        ProcessError::UnknownAnimal(_)
        | ProcessError::UnknownDevice(_)
        | ProcessError::InvalidTimestamp => ApiError::Validation(e.to_string()),
        ProcessError::Database(err) => err.into(),
    })?;

    let status = if response.duplicate {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(response)))
}

/// Cursor-paginated ping history for an animal.
///
/// GET /api/v1/animals/:animal_id/pings
pub async fn get_ping_history(
    State(state): State<AppState>,
    Path(animal_id): Path<Uuid>,
    Query(query): Query<GetPingHistoryQuery>,
) -> Result<Json<PingHistoryResponse>, ApiError> {
    let animal_repo = AnimalRepository::new(state.pool.clone());
    animal_repo
        .find_by_animal_id(animal_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Animal not found".to_string()))?;

    let (cursor_recorded_at, cursor_id) = match &query.cursor {
        Some(cursor) => {
            let (ts, id) = shared::pagination::decode_cursor(cursor)
                .map_err(|_| ApiError::Validation("Invalid cursor format".to_string()))?;
            (Some(ts), Some(id))
        }
        None => (None, None),
    };

    let from = match query.from {
        Some(ts) => Some(
            Utc.timestamp_millis_opt(ts)
                .single()
                .ok_or_else(|| ApiError::Validation(format!("Invalid 'from' timestamp: {}", ts)))?,
        ),
        None => None,
    };
    let to = match query.to {
        Some(ts) => Some(
            Utc.timestamp_millis_opt(ts)
                .single()
                .ok_or_else(|| ApiError::Validation(format!("Invalid 'to' timestamp: {}", ts)))?,
        ),
        None => None,
    };

    let limit = query.effective_limit();
    let repo_query = PingHistoryQuery {
        animal_id,
        cursor_recorded_at,
        cursor_id,
        from,
        to,
        limit,
        ascending: query.order == SortOrder::Asc,
    };

    let ping_repo = PingRepository::new(state.pool.clone());
    let (entities, has_more) = ping_repo.get_ping_history(repo_query).await?;

    let next_cursor = if has_more {
        entities
            .last()
            .map(|p| shared::pagination::encode_cursor(p.recorded_at, p.id))
    } else {
        None
    };

    // Attach membership sets for the page
    let ping_ids: Vec<i64> = entities.iter().map(|p| p.id).collect();
    let mut membership: HashMap<i64, Vec<Uuid>> = HashMap::new();
    for row in ping_repo.membership_for_pings(&ping_ids).await? {
        membership.entry(row.ping_id).or_default().push(row.zone_id);
    }

    let pings: Vec<PingHistoryItem> = entities
        .into_iter()
        .map(|entity| {
            let zone_ids = membership.remove(&entity.id).unwrap_or_default();
            entity.into_domain(zone_ids).into()
        })
        .collect();

    info!(
        animal_id = %animal_id,
        count = pings.len(),
        has_more = has_more,
        "Ping history retrieved"
    );

    Ok(Json(PingHistoryResponse {
        pings,
        pagination: PaginationInfo {
            next_cursor,
            has_more,
        },
    }))
}
