//! HTTP handler functions for the wilayah API.

use actix_web::{HttpResponse, web};
use wilayah_boundary_models::JsonObject;
use wilayah_loader::LoaderError;
use wilayah_server_models::{
    ApiDistrict, ApiError, ApiHealth, ApiProvinceSummary, ApiResolvedDistrict,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/provinces`
///
/// Lists the registered provinces in code order.
pub async fn provinces(state: web::Data<AppState>) -> HttpResponse {
    let provinces: Vec<ApiProvinceSummary> = state
        .registry()
        .provinces()
        .map(ApiProvinceSummary::from)
        .collect();

    HttpResponse::Ok().json(provinces)
}

/// `GET /api/provinces/{id}/districts`
///
/// Returns the province's district collection as `GeoJSON`.
pub async fn province_districts(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();

    match state.loader.load_districts(&id).await {
        Ok(collection) => HttpResponse::Ok().json(collection),
        Err(e @ LoaderError::UnknownProvince(_)) => {
            HttpResponse::NotFound().json(ApiError::new(e.to_string()))
        }
        Err(e) => {
            log::error!("Failed to load districts of province {id}: {e}");
            HttpResponse::BadGateway().json(ApiError::new(format!(
                "Failed to load districts of province {id}"
            )))
        }
    }
}

/// `GET /api/districts/{identifier}`
///
/// Resolves a district by code, UUID, alternate id or name.
pub async fn district(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let identifier = path.into_inner();

    state.registry().lookup_district(&identifier).map_or_else(
        || {
            HttpResponse::NotFound().json(ApiError::new(format!(
                "No district matches '{identifier}'"
            )))
        },
        |district| HttpResponse::Ok().json(ApiDistrict::from(district)),
    )
}

/// `GET /api/districts/{identifier}/subdistricts`
///
/// Loads and merges the district's subdistrict files. The body is always
/// the load result; a failed load is `success: false`, not an HTTP error.
pub async fn subdistricts(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let identifier = path.into_inner();
    let result = state.loader.load_subdistricts(&identifier).await;
    HttpResponse::Ok().json(result)
}

/// `POST /api/resolve/district`
///
/// Maps a clicked feature's property bag to a district.
pub async fn resolve_district(
    state: web::Data<AppState>,
    body: web::Json<JsonObject>,
) -> HttpResponse {
    state.registry().locate_district(&body).map_or_else(
        || {
            HttpResponse::NotFound().json(ApiError::new(
                "Properties carry no recognizable district name or id",
            ))
        },
        |located| HttpResponse::Ok().json(ApiResolvedDistrict::from(located)),
    )
}
