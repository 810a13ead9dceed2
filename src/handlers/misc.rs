use actix_web::HttpResponse;
use serde_json::json;

pub async fn root() -> HttpResponse {
    HttpResponse::Ok().body("API Working")
}

pub async fn route_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({ "message": "Route Not Found" }))
}
