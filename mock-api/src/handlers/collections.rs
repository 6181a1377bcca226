use std::collections::BTreeMap;

use actix_web::{web, HttpResponse};
use serde_json::{Map, Value};

use super::{Envelope, PageBody};
use crate::errors::ApiError;
use crate::repositories::collections::CollectionKind;
use crate::state::AppState;

const DEFAULT_LIMIT: u64 = 50;

fn parse_u64(raw: Option<String>, name: &str) -> Result<Option<u64>, ApiError> {
    raw.map(|v| {
        v.parse()
            .map_err(|_| ApiError::BadRequest(format!("{name} must be a number")))
    })
    .transpose()
}

pub async fn list(
    state: web::Data<AppState>,
    kind: web::Data<CollectionKind>,
    q: web::Query<BTreeMap<String, String>>,
) -> Result<HttpResponse, ApiError> {
    let mut params = q.into_inner();
    let skip = parse_u64(params.remove("skip"), "skip")?.unwrap_or(0);
    let limit = parse_u64(params.remove("limit"), "limit")?.unwrap_or(DEFAULT_LIMIT);
    let search = params.remove("search");
    let filters: Vec<(String, String)> = params.into_iter().collect();

    let (items, total) = state
        .collections
        .list(
            **kind,
            &filters,
            search.as_deref(),
            skip as usize,
            Some(limit as usize),
        )
        .await;
    Ok(HttpResponse::Ok().json(Envelope::ok(PageBody {
        items,
        skip,
        limit,
        total,
    })))
}

pub async fn get(
    state: web::Data<AppState>,
    kind: web::Data<CollectionKind>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let doc = state.collections.get(**kind, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(doc)))
}

pub async fn create(
    state: web::Data<AppState>,
    kind: web::Data<CollectionKind>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, ApiError> {
    let doc = state.collections.create(**kind, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(Envelope::ok(doc)))
}

pub async fn replace(
    state: web::Data<AppState>,
    kind: web::Data<CollectionKind>,
    path: web::Path<String>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, ApiError> {
    let doc = state
        .collections
        .replace(**kind, &path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(doc)))
}

pub async fn delete(
    state: web::Data<AppState>,
    kind: web::Data<CollectionKind>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    state.collections.delete(**kind, &path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
