use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{api::ApiClient, calendar::CalendarView};

/// Shared application state: the remote API client and the single calendar
/// widget instance. The lock guards individual mutations only; it does not
/// sequence overlapping availability refreshes.
#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub calendar: Arc<RwLock<CalendarView>>,
}

impl AppState {
    pub fn new(api: ApiClient) -> Self {
        let today = chrono::Local::now().date_naive();
        Self {
            api,
            calendar: Arc::new(RwLock::new(CalendarView::for_week(today))),
        }
    }
}
