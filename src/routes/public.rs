use actix_web::{web, HttpRequest, HttpResponse, Result};
use askama::Template;
use serde::Deserialize;

#[allow(unused_imports)]
use crate::filters;
use crate::{routes::admin::admin_token, state::AppState, templates::render};

#[derive(Clone, Debug)]
struct ServiceCard {
    service_id: i64,
    service_name: String,
    price: f64,
    is_main: bool,
}

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {}

#[derive(Template)]
#[template(path = "pricelist.html")]
struct PricelistTemplate {
    services: Vec<ServiceCard>,
    is_admin: bool,
    load_failed: bool,
    notice: String,
    has_notice: bool,
}

#[derive(Deserialize)]
struct PricelistQuery {
    notice: Option<String>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(home)))
        .service(web::resource("/pricelist").route(web::get().to(pricelist)))
        .service(web::resource("/health").route(web::get().to(health)));
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

async fn home() -> Result<HttpResponse> {
    Ok(render(HomeTemplate {}))
}

async fn pricelist(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<PricelistQuery>,
) -> Result<HttpResponse> {
    let (services, load_failed) = match state.api.services().await {
        Ok(list) => (list, false),
        Err(err) => {
            log::error!("Failed to fetch services: {err}");
            (Vec::new(), true)
        }
    };

    let services = services
        .into_iter()
        .map(|service| ServiceCard {
            service_id: service.service_id,
            service_name: service.service_name.clone(),
            price: service.price,
            is_main: service.is_main_service(),
        })
        .collect();

    let notice = query.into_inner().notice.unwrap_or_default();
    Ok(render(PricelistTemplate {
        services,
        is_admin: admin_token(&req).is_some(),
        load_failed,
        has_notice: !notice.is_empty(),
        notice,
    }))
}

#[cfg(test)]
mod tests {
    use actix_web::{test, web, App};

    #[actix_web::test]
    async fn home_and_health_answer_without_upstream() {
        let app = test::init_service(
            App::new()
                .service(web::resource("/").route(web::get().to(super::home)))
                .service(web::resource("/health").route(web::get().to(super::health))),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert!(resp.status().is_success());

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert!(resp.status().is_success());
    }
}
