//! Keeps the calendar's unavailable markers in step with the booking API for
//! the selected barber and visible range. Every refresh is a full replace;
//! a failed fetch is logged and the previous, possibly stale, markers stay.

use chrono::{NaiveDate, NaiveDateTime};

use crate::{calendar, models::TimeSlot, state::AppState};

/// Refresh for the calendar's visible week. Called on barber change and on
/// week navigation.
pub async fn refresh(state: &AppState, barber_id: i64) {
    let (start, end) = state.calendar.read().await.visible_range();
    let start = start.format("%Y-%m-%d").to_string();
    let end = end.format("%Y-%m-%d").to_string();

    let slots = match state
        .api
        .unavailable_timeslots(barber_id, &start, &end)
        .await
    {
        Ok(slots) => slots,
        Err(err) => {
            log::error!("Failed to fetch unavailable timeslots: {err}");
            return;
        }
    };

    let closed_days = match state.api.unavailable_dates(barber_id).await {
        Ok(dates) => parse_closed_days(&dates),
        Err(err) => {
            log::error!("Failed to fetch unavailable dates: {err}");
            return;
        }
    };

    apply(state, &slots, &closed_days).await;
}

/// Refresh for a single day, used when a slot is clicked. Like the weekly
/// variant this replaces the whole marker set; the API scopes the answer to
/// the clicked date.
pub async fn refresh_day(state: &AppState, barber_id: i64, date: &str) {
    let slots = match state
        .api
        .unavailable_timeslots_for_day(barber_id, date)
        .await
    {
        Ok(slots) => slots,
        Err(err) => {
            log::error!("Failed to fetch unavailable timeslots for {date}: {err}");
            return;
        }
    };

    apply(state, &slots, &[]).await;
}

async fn apply(state: &AppState, slots: &[TimeSlot], closed_days: &[NaiveDate]) {
    let busy = parse_busy(slots);
    // Overlapping refreshes are not sequenced; the one that reaches this
    // write last defines the view.
    let mut view = state.calendar.write().await;
    view.replace_unavailable(&busy, closed_days);
    log::debug!(
        "Calendar now carries {} unavailable markers",
        view.unavailable_markers()
    );
}

fn parse_busy(slots: &[TimeSlot]) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    let mut busy = Vec::with_capacity(slots.len());
    for slot in slots {
        match (
            calendar::parse_slot_datetime(&slot.start),
            calendar::parse_slot_datetime(&slot.end),
        ) {
            (Some(start), Some(end)) => busy.push((start, end)),
            _ => log::warn!(
                "Skipping unavailable slot with unreadable bounds: {} / {}",
                slot.start,
                slot.end
            ),
        }
    }
    busy
}

fn parse_closed_days(dates: &[String]) -> Vec<NaiveDate> {
    dates
        .iter()
        .filter_map(|raw| {
            let parsed = calendar::parse_day(raw);
            if parsed.is_none() {
                log::warn!("Skipping unreadable unavailable date: {raw}");
            }
            parsed
        })
        .collect()
}
