use actix_web::{
    cookie::{time::Duration, Cookie, SameSite},
    http::header,
    web, HttpRequest, HttpResponse, Result,
};
use serde::Deserialize;

use crate::state::AppState;

const ADMIN_TOKEN_COOKIE: &str = "admin_token";

/// The opaque admin bearer token, if one is stored. The front end never
/// validates it; the booking API does.
pub fn admin_token(req: &HttpRequest) -> Option<String> {
    req.cookie(ADMIN_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.trim().is_empty())
}

#[derive(Deserialize)]
struct TokenForm {
    token: String,
}

#[derive(Deserialize)]
struct ServiceEditForm {
    service_name: String,
    price: f64,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/admin/token").route(web::post().to(store_token)))
        .service(web::resource("/admin/logout").route(web::get().to(clear_token)))
        .service(web::resource("/services/{id}").route(web::post().to(edit_service)))
        .service(web::resource("/services/{id}/delete").route(web::post().to(delete_service)));
}

async fn store_token(req: HttpRequest, form: web::Form<TokenForm>) -> HttpResponse {
    let token = form.into_inner().token.trim().to_string();
    if token.is_empty() {
        return pricelist_redirect("Admin token cannot be empty.");
    }
    let mut response = pricelist_redirect("Admin mode enabled.");
    if let Err(err) = response.add_cookie(&token_cookie(&req, &token, Duration::days(30))) {
        log::error!("Failed to set admin cookie: {err}");
    }
    response
}

async fn clear_token(req: HttpRequest) -> HttpResponse {
    let mut response = pricelist_redirect("Admin mode disabled.");
    if let Err(err) = response.add_cookie(&token_cookie(&req, "", Duration::seconds(0))) {
        log::error!("Failed to clear admin cookie: {err}");
    }
    response
}

async fn edit_service(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    form: web::Form<ServiceEditForm>,
) -> Result<HttpResponse> {
    let Some(token) = admin_token(&req) else {
        return Ok(pricelist_redirect("Admin token required."));
    };
    let service_id = path.into_inner();
    let form = form.into_inner();

    match state
        .api
        .update_service(service_id, &form.service_name, form.price, &token)
        .await
    {
        Ok(reply) => Ok(pricelist_redirect(
            reply
                .message
                .as_deref()
                .unwrap_or("Service updated successfully."),
        )),
        Err(err) => {
            log::error!("Error updating service {service_id}: {err}");
            Ok(pricelist_redirect("Failed to update service."))
        }
    }
}

async fn delete_service(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let Some(token) = admin_token(&req) else {
        return Ok(pricelist_redirect("Admin token required."));
    };
    let service_id = path.into_inner();

    match state.api.delete_service(service_id, &token).await {
        Ok(()) => Ok(pricelist_redirect("Service deleted successfully.")),
        Err(err) => {
            log::error!("Error deleting service {service_id}: {err}");
            Ok(pricelist_redirect("Failed to delete service."))
        }
    }
}

/// Redirect back to the price list with a notice banner.
fn pricelist_redirect(notice: &str) -> HttpResponse {
    let encoded: String = url::form_urlencoded::byte_serialize(notice.as_bytes()).collect();
    HttpResponse::SeeOther()
        .append_header((header::LOCATION, format!("/pricelist?notice={encoded}")))
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish()
}

fn token_cookie(req: &HttpRequest, value: &str, max_age: Duration) -> Cookie<'static> {
    let mut builder = Cookie::build(ADMIN_TOKEN_COOKIE, value.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(max_age);
    if req.connection_info().scheme() == "https" {
        builder = builder.secure(true);
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use actix_web::http::header;
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn admin_token_requires_a_non_empty_cookie() {
        let req = TestRequest::default().to_http_request();
        assert!(admin_token(&req).is_none());

        let req = TestRequest::default()
            .cookie(Cookie::new(ADMIN_TOKEN_COOKIE, "  "))
            .to_http_request();
        assert!(admin_token(&req).is_none());

        let req = TestRequest::default()
            .cookie(Cookie::new(ADMIN_TOKEN_COOKIE, "secret"))
            .to_http_request();
        assert_eq!(admin_token(&req).as_deref(), Some("secret"));
    }

    #[test]
    fn redirect_targets_pricelist_with_encoded_notice() {
        let response = pricelist_redirect("Service deleted successfully.");
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        assert_eq!(
            location,
            "/pricelist?notice=Service+deleted+successfully."
        );
    }
}
