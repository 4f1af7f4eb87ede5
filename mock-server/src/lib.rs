use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Credentials accepted by `app()`: (api id, api key).
pub const TENANTS: &[(&str, &str)] = &[("app-main", "main-secret"), ("app-partner", "partner-secret")];

/// Timestamp given to every created company. Offset written without a colon,
/// the way the real API does it.
pub const CREATED_AT: &str = "2014-05-21T00:32:35+0000";

const FILTERABLE: &[&str] = &["name", "country"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    pub created_at: String,
}

#[derive(Deserialize)]
pub struct CreateCompany {
    pub company_name: Option<String>,
    pub country: Option<String>,
}

pub struct Tenant {
    key: String,
    companies: RwLock<HashMap<String, Company>>,
}

pub type Db = Arc<HashMap<String, Tenant>>;

type Reply = (StatusCode, Json<Value>);

pub fn app() -> Router {
    app_with_tenants(TENANTS)
}

/// Router accepting HTTP Basic credentials from `tenants`; each tenant sees
/// only its own companies.
pub fn app_with_tenants(tenants: &[(&str, &str)]) -> Router {
    let db: Db = Arc::new(
        tenants
            .iter()
            .map(|(id, key)| {
                let tenant = Tenant {
                    key: key.to_string(),
                    companies: RwLock::new(HashMap::new()),
                };
                (id.to_string(), tenant)
            })
            .collect(),
    );
    Router::new()
        .route("/api/v1/companies", get(list_companies).post(create_company))
        .route("/api/v1/companies/{id}", get(get_company).delete(delete_company))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error_entry(code: &str, message: &str) -> Value {
    json!({ "code": code, "message": message })
}

/// Error body for single-resource routes: errors at the top level, no `data`.
fn single_error(status: StatusCode, code: &str, message: &str) -> Reply {
    (status, Json(json!({ "errors": [error_entry(code, message)] })))
}

/// Error body for collection routes: same shape as a successful list.
fn collection_error(status: StatusCode, code: &str, message: &str) -> Reply {
    (status, Json(json!({ "data": [], "errors": [error_entry(code, message)] })))
}

fn authenticate<'a>(db: &'a Db, headers: &HeaderMap) -> Option<&'a Tenant> {
    let encoded = headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (id, key) = decoded.split_once(':')?;
    db.get(id).filter(|tenant| tenant.key == key)
}

async fn list_companies(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(filters): Query<HashMap<String, String>>,
) -> Reply {
    let Some(tenant) = authenticate(&db, &headers) else {
        return collection_error(StatusCode::UNAUTHORIZED, "unauthorized", "invalid API credentials");
    };
    // Unknown filters are reported in the envelope with a 200 status.
    if let Some(bad) = filters.keys().find(|k| !FILTERABLE.contains(&k.as_str())) {
        let message = format!("unknown filter '{bad}'");
        return (
            StatusCode::OK,
            Json(json!({ "data": [], "errors": [error_entry("invalid_filter", &message)] })),
        );
    }

    let companies = tenant.companies.read().await;
    let mut matching: Vec<&Company> = companies
        .values()
        .filter(|c| {
            filters.iter().all(|(k, v)| match k.as_str() {
                "name" => &c.name == v,
                "country" => c.country.as_ref() == Some(v),
                _ => false,
            })
        })
        .collect();
    matching.sort_by(|a, b| a.name.cmp(&b.name));
    (StatusCode::OK, Json(json!({ "data": matching, "errors": [] })))
}

async fn create_company(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateCompany>,
) -> Reply {
    let Some(tenant) = authenticate(&db, &headers) else {
        return single_error(StatusCode::UNAUTHORIZED, "unauthorized", "invalid API credentials");
    };
    let Some(name) = input.company_name.filter(|n| !n.trim().is_empty()) else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "errors": [{
                "code": "blank",
                "message": "can't be blank",
                "attribute": "company_name",
            }] })),
        );
    };
    let company = Company {
        id: Uuid::new_v4().to_string(),
        name,
        country: input.country,
        created_at: CREATED_AT.to_string(),
    };
    tenant
        .companies
        .write()
        .await
        .insert(company.id.clone(), company.clone());
    (StatusCode::CREATED, Json(json!({ "data": company, "errors": [] })))
}

async fn get_company(State(db): State<Db>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    let Some(tenant) = authenticate(&db, &headers) else {
        return single_error(StatusCode::UNAUTHORIZED, "unauthorized", "invalid API credentials");
    };
    match tenant.companies.read().await.get(&id) {
        Some(company) => (StatusCode::OK, Json(json!({ "data": company, "errors": [] }))),
        None => single_error(StatusCode::NOT_FOUND, "not_found", &format!("company {id} not found")),
    }
}

async fn delete_company(State(db): State<Db>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    let Some(tenant) = authenticate(&db, &headers) else {
        return single_error(StatusCode::UNAUTHORIZED, "unauthorized", "invalid API credentials");
    };
    match tenant.companies.write().await.remove(&id) {
        Some(company) => (StatusCode::OK, Json(json!({ "data": company, "errors": [] }))),
        None => single_error(StatusCode::NOT_FOUND, "not_found", &format!("company {id} not found")),
    }
}
