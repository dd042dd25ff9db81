use actix_web::{web, HttpResponse, Result};
use askama::Template;
use chrono::{Duration, NaiveTime, Weekday};
use serde::Deserialize;

#[allow(unused_imports)]
use crate::filters;
use crate::{
    availability,
    calendar::{self, CalendarView, SLOT_MINUTES},
    models::{Barber, BookingRequest, Service},
    state::AppState,
    templates::render,
};

#[derive(Clone, Debug)]
struct BarberOption {
    barber_id: i64,
    name: String,
    selected: bool,
}

#[derive(Clone, Debug)]
struct ServiceBubble {
    service_id: i64,
    service_name: String,
    price: f64,
    checked: bool,
}

#[derive(Clone, Debug)]
struct SlotCell {
    href: String,
    closed: bool,
    blocked: bool,
    selected: bool,
}

#[derive(Clone, Debug)]
struct GridRow {
    time_label: String,
    cells: Vec<SlotCell>,
}

#[derive(Clone, Debug, Default)]
struct BookingFormView {
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    booking_date: String,
    booking_time: String,
}

#[derive(Template)]
#[template(path = "book.html")]
struct BookingTemplate {
    barbers: Vec<BarberOption>,
    has_barber: bool,
    barber_id: i64,
    main_services: Vec<ServiceBubble>,
    extra_services: Vec<ServiceBubble>,
    week_label: String,
    week_param: String,
    prev_week: String,
    next_week: String,
    day_labels: Vec<String>,
    rows: Vec<GridRow>,
    form: BookingFormView,
    form_open: bool,
    errors: Vec<String>,
    notice: String,
    has_notice: bool,
}

#[derive(Deserialize)]
struct BookingQuery {
    barber: Option<i64>,
    week: Option<String>,
    date: Option<String>,
    time: Option<String>,
}

/// Everything the page renderer needs beyond the shared calendar state.
#[derive(Default)]
struct PageContext {
    selected_barber: Option<i64>,
    form: BookingFormView,
    form_open: bool,
    main_selected: Option<i64>,
    extras_selected: Vec<i64>,
    errors: Vec<String>,
    notice: String,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/book")
            .route(web::get().to(show_booking))
            .route(web::post().to(create_booking)),
    );
}

/// The booking page. Query parameters carry the widget interactions:
/// `barber` for a barber change, `week` for range navigation, `date`+`time`
/// for a slot click (which opens the form pre-filled).
async fn show_booking(
    state: web::Data<AppState>,
    query: web::Query<BookingQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    let barbers = fetch_barbers(&state).await;
    let services = fetch_services(&state).await;

    // First barber is preselected when none was chosen.
    let selected_barber = query
        .barber
        .or_else(|| barbers.first().map(|barber| barber.barber_id));

    if let Some(anchor) = query.week.as_deref().and_then(calendar::parse_day) {
        state.calendar.write().await.set_week(anchor);
    }

    let mut ctx = PageContext {
        selected_barber,
        ..PageContext::default()
    };

    match (query.date.as_deref(), query.time.as_deref()) {
        (Some(date), Some(time)) => match selected_barber {
            None => ctx.notice = "Please select a barber first.".to_string(),
            Some(barber_id) => {
                let clicked = calendar::parse_day(date).and_then(|day| {
                    NaiveTime::parse_from_str(time, "%H:%M")
                        .ok()
                        .map(|at| day.and_time(at))
                });
                match clicked {
                    Some(when) if calendar::is_bookable(when) => {
                        state.calendar.write().await.select_slot(when);
                        availability::refresh_day(&state, barber_id, date).await;
                        ctx.form.booking_date = date.to_string();
                        ctx.form.booking_time = time.to_string();
                        ctx.form_open = true;
                    }
                    _ => ctx.notice = "That time cannot be booked.".to_string(),
                }
            }
        },
        _ => {
            if let Some(barber_id) = selected_barber {
                availability::refresh(&state, barber_id).await;
            }
        }
    }

    let view = state.calendar.read().await.clone();
    Ok(render_booking(&view, barbers, services, ctx))
}

async fn create_booking(
    state: web::Data<AppState>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse> {
    let submission = BookingSubmission::from_pairs(&form.into_inner());
    let mut ctx = PageContext {
        selected_barber: submission.barber_id,
        main_selected: submission.main_service,
        extras_selected: submission.extra_services.clone(),
        errors: submission.validate(),
        ..PageContext::default()
    };

    if ctx.errors.is_empty() {
        match submission.to_request() {
            Some(request) => match state.api.create_booking(&request).await {
                Ok(reply) => {
                    ctx.notice = reply
                        .message
                        .unwrap_or_else(|| "Booking request received.".to_string());
                    ctx.main_selected = None;
                    ctx.extras_selected.clear();
                }
                Err(err) => {
                    log::error!("Error creating booking: {err}");
                    ctx.errors.push("Failed to create booking.".to_string());
                }
            },
            None => ctx.errors.push("Please select a main service.".to_string()),
        }
    }

    if !ctx.errors.is_empty() {
        // Re-render with the visitor's input intact, alert-style errors on top.
        ctx.form = BookingFormView {
            customer_name: submission.customer_name,
            customer_email: submission.customer_email,
            customer_phone: submission.customer_phone,
            booking_date: submission.booking_date,
            booking_time: submission.booking_time,
        };
        ctx.form_open = true;
    }

    let barbers = fetch_barbers(&state).await;
    let services = fetch_services(&state).await;
    let view = state.calendar.read().await.clone();
    Ok(render_booking(&view, barbers, services, ctx))
}

fn render_booking(
    view: &CalendarView,
    barbers: Vec<Barber>,
    services: Vec<Service>,
    ctx: PageContext,
) -> HttpResponse {
    let selected_barber = ctx
        .selected_barber
        .or_else(|| barbers.first().map(|barber| barber.barber_id));

    let barbers = barbers
        .into_iter()
        .map(|barber| BarberOption {
            selected: Some(barber.barber_id) == selected_barber,
            barber_id: barber.barber_id,
            name: barber.name,
        })
        .collect();

    let (main_services, extra_services) = split_services(services, &ctx);
    let (day_labels, rows) = build_grid(view, selected_barber);

    let week_start = view.week_start();
    render(BookingTemplate {
        barbers,
        has_barber: selected_barber.is_some(),
        barber_id: selected_barber.unwrap_or_default(),
        main_services,
        extra_services,
        week_label: format!("Week of {}", week_start.format("%d %b %Y")),
        week_param: week_start.to_string(),
        prev_week: (week_start - Duration::days(7)).to_string(),
        next_week: (week_start + Duration::days(7)).to_string(),
        day_labels,
        rows,
        form: ctx.form,
        form_open: ctx.form_open,
        errors: ctx.errors,
        has_notice: !ctx.notice.is_empty(),
        notice: ctx.notice,
    })
}

fn split_services(
    services: Vec<Service>,
    ctx: &PageContext,
) -> (Vec<ServiceBubble>, Vec<ServiceBubble>) {
    let mut main_services = Vec::new();
    let mut extra_services = Vec::new();
    for service in services {
        let is_main = service.is_main_service();
        let bubble = ServiceBubble {
            checked: if is_main {
                ctx.main_selected == Some(service.service_id)
            } else {
                ctx.extras_selected.contains(&service.service_id)
            },
            service_id: service.service_id,
            service_name: service.service_name,
            price: service.price,
        };
        if is_main {
            main_services.push(bubble);
        } else {
            extra_services.push(bubble);
        }
    }
    (main_services, extra_services)
}

fn build_grid(view: &CalendarView, selected_barber: Option<i64>) -> (Vec<String>, Vec<GridRow>) {
    let days = view.days();
    let day_labels = days
        .iter()
        .map(|day| day.format("%a %d %b").to_string())
        .collect();

    let open = calendar::opening_hours(Weekday::Mon)
        .map(|(open, _)| open)
        .unwrap_or(NaiveTime::MIN);
    let close = calendar::latest_close();

    let mut rows = Vec::new();
    let mut time = open;
    while time < close {
        let mut cells = Vec::new();
        for day in &days {
            let within_hours = calendar::day_slots(*day).contains(&time);
            let when = day.and_time(time);
            let mut href = format!(
                "/book?week={}&date={}&time={}",
                view.week_start(),
                day,
                time.format("%H:%M")
            );
            if let Some(barber_id) = selected_barber {
                href.push_str(&format!("&barber={barber_id}"));
            }
            cells.push(SlotCell {
                href,
                closed: !within_hours,
                blocked: view.is_blocked(when),
                selected: view.is_selected(when),
            });
        }
        rows.push(GridRow {
            time_label: time.format("%H:%M").to_string(),
            cells,
        });
        time = time + Duration::minutes(SLOT_MINUTES);
    }
    (day_labels, rows)
}

async fn fetch_barbers(state: &web::Data<AppState>) -> Vec<Barber> {
    match state.api.barbers().await {
        Ok(barbers) => barbers,
        Err(err) => {
            log::error!("Failed to fetch barbers: {err}");
            Vec::new()
        }
    }
}

async fn fetch_services(state: &web::Data<AppState>) -> Vec<Service> {
    match state.api.services().await {
        Ok(services) => services,
        Err(err) => {
            log::error!("Failed to fetch services: {err}");
            Vec::new()
        }
    }
}

/// A submitted booking form, folded from the raw urlencoded pairs so the
/// repeated extra-service checkboxes survive deserialization.
#[derive(Clone, Debug, Default)]
struct BookingSubmission {
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    barber_id: Option<i64>,
    booking_date: String,
    booking_time: String,
    main_service: Option<i64>,
    extra_services: Vec<i64>,
}

impl BookingSubmission {
    fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut submission = Self::default();
        for (key, value) in pairs {
            let value = value.trim();
            match key.as_str() {
                "customer_name" => submission.customer_name = value.to_string(),
                "customer_email" => submission.customer_email = value.to_string(),
                "customer_phone" => submission.customer_phone = value.to_string(),
                "barber_id" => submission.barber_id = value.parse().ok(),
                "booking_date" => submission.booking_date = value.to_string(),
                "booking_time" => submission.booking_time = value.to_string(),
                // Radio group; a repeated key means the last one wins.
                "main_service" => submission.main_service = value.parse().ok(),
                "extra_services" => {
                    if let Ok(id) = value.parse() {
                        submission.extra_services.push(id);
                    }
                }
                _ => {}
            }
        }
        submission
    }

    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.customer_name.is_empty() {
            errors.push("Full name is required.".to_string());
        }
        if self.customer_email.is_empty() {
            errors.push("Email is required.".to_string());
        }
        if self.customer_phone.is_empty() {
            errors.push("Phone number is required.".to_string());
        }
        if self.barber_id.is_none() {
            errors.push("Please select a barber first.".to_string());
        }
        if self.main_service.is_none() {
            errors.push("Please select a main service.".to_string());
        }
        let slot = calendar::parse_day(&self.booking_date).and_then(|day| {
            NaiveTime::parse_from_str(&self.booking_time, "%H:%M")
                .ok()
                .map(|at| day.and_time(at))
        });
        match slot {
            Some(when) if calendar::is_bookable(when) => {}
            Some(_) => errors.push("The selected slot is outside opening hours.".to_string()),
            None => errors.push("Please pick a time slot on the calendar.".to_string()),
        }
        errors
    }

    /// Main service first, extras after it. Extras equal to the main service
    /// or repeated are dropped.
    fn selected_services(&self) -> Vec<i64> {
        let mut services = Vec::new();
        if let Some(main) = self.main_service {
            services.push(main);
        }
        for &extra in &self.extra_services {
            if !services.contains(&extra) {
                services.push(extra);
            }
        }
        services
    }

    fn to_request(&self) -> Option<BookingRequest> {
        let barber_id = self.barber_id?;
        self.main_service?;
        Some(BookingRequest {
            customer_name: self.customer_name.clone(),
            customer_email: self.customer_email.clone(),
            customer_phone: self.customer_phone.clone(),
            barber_id: barber_id.to_string(),
            booking_date: self.booking_date.clone(),
            booking_time: self.booking_time.clone(),
            services: self
                .selected_services()
                .iter()
                .map(|id| id.to_string())
                .collect(),
        })
    }
}
