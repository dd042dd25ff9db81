use reqwest::Client;
use serde_json::json;
use url::Url;

use crate::models::{ApiMessage, Barber, BookingRequest, Service, TimeSlot};

/// Client for the remote booking API. All data this application shows comes
/// through here; there is no local storage. Non-2xx responses become errors,
/// nothing is retried.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base: Url) -> Self {
        Self {
            http: Client::new(),
            base,
        }
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        url.set_path(path);
        url
    }

    fn timeslots_url(&self, barber_id: i64, params: &[(&str, &str)]) -> Url {
        let mut url = self.endpoint("/api/bookings/unavailable-timeslots");
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("barberId", &barber_id.to_string());
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    pub async fn services(&self) -> Result<Vec<Service>, reqwest::Error> {
        self.http
            .get(self.endpoint("/api/services"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    pub async fn barbers(&self) -> Result<Vec<Barber>, reqwest::Error> {
        self.http
            .get(self.endpoint("/api/barbers"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Unavailable ranges for a barber over [start, end), both YYYY-MM-DD.
    pub async fn unavailable_timeslots(
        &self,
        barber_id: i64,
        start: &str,
        end: &str,
    ) -> Result<Vec<TimeSlot>, reqwest::Error> {
        let url = self.timeslots_url(barber_id, &[("start", start), ("end", end)]);
        self.http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Unavailable ranges for a barber on a single date.
    pub async fn unavailable_timeslots_for_day(
        &self,
        barber_id: i64,
        date: &str,
    ) -> Result<Vec<TimeSlot>, reqwest::Error> {
        let url = self.timeslots_url(barber_id, &[("date", date)]);
        self.http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Whole-day unavailability (vacation etc.), YYYY-MM-DD strings.
    pub async fn unavailable_dates(&self, barber_id: i64) -> Result<Vec<String>, reqwest::Error> {
        let path = format!("/api/barber/{barber_id}/unavailable-dates");
        self.http
            .get(self.endpoint(&path))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    pub async fn create_booking(
        &self,
        booking: &BookingRequest,
    ) -> Result<ApiMessage, reqwest::Error> {
        self.http
            .post(self.endpoint("/api/bookings/create"))
            .json(booking)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Admin-only; the opaque token is forwarded as-is, the API validates it.
    pub async fn update_service(
        &self,
        service_id: i64,
        service_name: &str,
        price: f64,
        token: &str,
    ) -> Result<ApiMessage, reqwest::Error> {
        let path = format!("/api/services/{service_id}");
        self.http
            .put(self.endpoint(&path))
            .bearer_auth(token)
            .json(&json!({ "service_name": service_name, "price": price }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    pub async fn delete_service(&self, service_id: i64, token: &str) -> Result<(), reqwest::Error> {
        let path = format!("/api/services/{service_id}");
        self.http
            .delete(self.endpoint(&path))
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new(Url::parse("http://localhost:3000").unwrap())
    }

    #[test]
    fn endpoint_joins_paths_on_base() {
        let api = client();
        assert_eq!(
            api.endpoint("/api/services").as_str(),
            "http://localhost:3000/api/services"
        );
        assert_eq!(
            api.endpoint("/api/bookings/create").as_str(),
            "http://localhost:3000/api/bookings/create"
        );
        assert_eq!(
            api.endpoint("/api/barber/7/unavailable-dates").as_str(),
            "http://localhost:3000/api/barber/7/unavailable-dates"
        );
    }

    #[test]
    fn timeslot_url_carries_range_params() {
        let api = client();
        let url = api.timeslots_url(4, &[("start", "2026-08-31"), ("end", "2026-09-07")]);
        assert_eq!(url.path(), "/api/bookings/unavailable-timeslots");
        assert_eq!(
            url.query(),
            Some("barberId=4&start=2026-08-31&end=2026-09-07")
        );
    }

    #[test]
    fn timeslot_url_carries_single_date_param() {
        let api = client();
        let url = api.timeslots_url(4, &[("date", "2026-09-01")]);
        assert_eq!(url.query(), Some("barberId=4&date=2026-09-01"));
    }
}
