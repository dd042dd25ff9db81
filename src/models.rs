use serde::{Deserialize, Serialize};

pub const MAIN_SERVICE_FLAG: i64 = 1;

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
    pub service_id: i64,
    pub service_name: String,
    pub price: f64,
    #[serde(default)]
    pub is_main: i64,
}

impl Service {
    pub fn is_main_service(&self) -> bool {
        self.is_main == MAIN_SERVICE_FLAG
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Barber {
    pub barber_id: i64,
    pub name: String,
}

/// Unavailable range as reported by the booking API. Kept as raw strings;
/// parsing happens when the range becomes a calendar marker.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeSlot {
    pub start: String,
    pub end: String,
}

/// Body of POST /api/bookings/create. Identifiers go over the wire as
/// strings, main service first, extras after it.
#[derive(Debug, Clone, Serialize)]
pub struct BookingRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub barber_id: String,
    pub booking_date: String,
    pub booking_time: String,
    pub services: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiMessage {
    pub message: Option<String>,
}
