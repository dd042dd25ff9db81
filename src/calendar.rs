use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};

pub const SLOT_MINUTES: i64 = 15;

/// Opening hours per weekday. Sunday is closed, Saturday closes early.
pub fn opening_hours(day: Weekday) -> Option<(NaiveTime, NaiveTime)> {
    let open = NaiveTime::from_hms_opt(10, 0, 0)?;
    match day {
        Weekday::Sun => None,
        Weekday::Sat => Some((open, NaiveTime::from_hms_opt(15, 0, 0)?)),
        _ => Some((open, NaiveTime::from_hms_opt(18, 0, 0)?)),
    }
}

/// Latest closing time across the week, used as the bottom of the grid.
pub fn latest_close() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Marker {
    /// Timed unavailable range reported by the booking API.
    Busy {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// Whole-day unavailability (barber off work).
    ClosedDay { date: NaiveDate },
    /// The slot the visitor clicked; at most one exists.
    Selected {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

impl Marker {
    fn is_unavailable(&self) -> bool {
        matches!(self, Marker::Busy { .. } | Marker::ClosedDay { .. })
    }

    fn blocks(&self, slot_start: NaiveDateTime, slot_end: NaiveDateTime) -> bool {
        match self {
            Marker::Busy { start, end } => *start < slot_end && slot_start < *end,
            Marker::ClosedDay { date } => slot_start.date() == *date,
            Marker::Selected { .. } => false,
        }
    }
}

/// State of the booking calendar widget: one visible week plus markers.
/// Rendering is a template concern; this holds only what the widget knows.
#[derive(Debug, Clone)]
pub struct CalendarView {
    week_start: NaiveDate,
    markers: Vec<Marker>,
}

impl CalendarView {
    /// A view of the week containing `date`, aligned to Monday, no markers.
    pub fn for_week(date: NaiveDate) -> Self {
        Self {
            week_start: monday_of(date),
            markers: Vec::new(),
        }
    }

    pub fn week_start(&self) -> NaiveDate {
        self.week_start
    }

    /// Visible range, Monday inclusive to next Monday exclusive.
    pub fn visible_range(&self) -> (NaiveDate, NaiveDate) {
        (self.week_start, self.week_start + Duration::days(7))
    }

    /// Move the visible range to the week containing `date`. Markers stay in
    /// place until the next availability refresh replaces them; a failed
    /// refresh leaves the stale set visible.
    pub fn set_week(&mut self, date: NaiveDate) {
        self.week_start = monday_of(date);
    }

    /// Visible days, Monday through Saturday. Sunday is hidden.
    pub fn days(&self) -> Vec<NaiveDate> {
        (0..6).map(|i| self.week_start + Duration::days(i)).collect()
    }

    /// Drop every unavailable marker and insert the given set. Full replace,
    /// no diffing; whichever refresh finishes last wins.
    pub fn replace_unavailable(
        &mut self,
        busy: &[(NaiveDateTime, NaiveDateTime)],
        closed_days: &[NaiveDate],
    ) {
        self.markers.retain(|marker| !marker.is_unavailable());
        for &(start, end) in busy {
            self.markers.push(Marker::Busy { start, end });
        }
        for &date in closed_days {
            self.markers.push(Marker::ClosedDay { date });
        }
    }

    /// Highlight the clicked slot, clearing any previous highlight.
    pub fn select_slot(&mut self, start: NaiveDateTime) {
        self.markers
            .retain(|marker| !matches!(marker, Marker::Selected { .. }));
        self.markers.push(Marker::Selected {
            start,
            end: start + Duration::minutes(SLOT_MINUTES),
        });
    }

    pub fn selected(&self) -> Option<NaiveDateTime> {
        self.markers.iter().find_map(|marker| match marker {
            Marker::Selected { start, .. } => Some(*start),
            _ => None,
        })
    }

    pub fn is_selected(&self, slot_start: NaiveDateTime) -> bool {
        self.selected() == Some(slot_start)
    }

    /// Whether the 15-minute slot starting here overlaps any unavailable
    /// marker.
    pub fn is_blocked(&self, slot_start: NaiveDateTime) -> bool {
        let slot_end = slot_start + Duration::minutes(SLOT_MINUTES);
        self.markers
            .iter()
            .any(|marker| marker.is_unavailable() && marker.blocks(slot_start, slot_end))
    }

    pub fn unavailable_markers(&self) -> usize {
        self.markers
            .iter()
            .filter(|marker| marker.is_unavailable())
            .count()
    }
}

/// Whether a datetime is a valid booking slot: within opening hours and on a
/// slot boundary.
pub fn is_bookable(when: NaiveDateTime) -> bool {
    let Some((open, close)) = opening_hours(when.weekday()) else {
        return false;
    };
    let time = when.time();
    if time < open || time >= close {
        return false;
    }
    let minutes_since_open = (time - open).num_minutes();
    minutes_since_open % SLOT_MINUTES == 0 && time.second() == 0
}

/// Slot start times for one day, stepped by the slot duration. Empty on
/// closed days.
pub fn day_slots(date: NaiveDate) -> Vec<NaiveTime> {
    let Some((open, close)) = opening_hours(date.weekday()) else {
        return Vec::new();
    };
    let mut slots = Vec::new();
    let mut time = open;
    while time < close {
        slots.push(time);
        time = time + Duration::minutes(SLOT_MINUTES);
    }
    slots
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Parse the datetime strings the API hands back. The upstream format has
/// drifted between RFC 3339 and bare local datetimes, so accept both.
pub fn parse_slot_datetime(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }
    None
}

pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(raw: &str) -> NaiveDate {
        parse_day(raw).unwrap()
    }

    fn at(raw: &str) -> NaiveDateTime {
        parse_slot_datetime(raw).unwrap()
    }

    #[test]
    fn week_aligns_to_monday_and_hides_sunday() {
        // 2026-09-03 is a Thursday.
        let view = CalendarView::for_week(date("2026-09-03"));
        assert_eq!(view.week_start(), date("2026-08-31"));
        let days = view.days();
        assert_eq!(days.len(), 6);
        assert_eq!(days[0].weekday(), Weekday::Mon);
        assert_eq!(days[5].weekday(), Weekday::Sat);
        assert_eq!(view.visible_range(), (date("2026-08-31"), date("2026-09-07")));
    }

    #[test]
    fn replace_clears_the_previous_set_entirely() {
        let mut view = CalendarView::for_week(date("2026-08-31"));
        view.replace_unavailable(
            &[(at("2026-08-31T10:00:00"), at("2026-08-31T11:00:00"))],
            &[date("2026-09-02")],
        );
        assert_eq!(view.unavailable_markers(), 2);
        assert!(view.is_blocked(at("2026-08-31T10:30:00")));

        view.replace_unavailable(
            &[(at("2026-09-01T13:00:00"), at("2026-09-01T13:30:00"))],
            &[],
        );
        assert_eq!(view.unavailable_markers(), 1);
        assert!(!view.is_blocked(at("2026-08-31T10:30:00")));
        assert!(!view.is_blocked(at("2026-09-02T10:00:00")));
        assert!(view.is_blocked(at("2026-09-01T13:00:00")));
    }

    #[test]
    fn later_replace_wins_over_earlier_one() {
        // Two refreshes racing: whichever applies last defines the view.
        let mut view = CalendarView::for_week(date("2026-08-31"));
        let fresh = [(at("2026-09-01T10:00:00"), at("2026-09-01T10:15:00"))];
        let stale = [(at("2026-09-04T12:00:00"), at("2026-09-04T14:00:00"))];
        view.replace_unavailable(&fresh, &[]);
        view.replace_unavailable(&stale, &[]);
        assert!(view.is_blocked(at("2026-09-04T12:00:00")));
        assert!(!view.is_blocked(at("2026-09-01T10:00:00")));
    }

    #[test]
    fn replace_keeps_the_selection_highlight() {
        let mut view = CalendarView::for_week(date("2026-08-31"));
        view.select_slot(at("2026-09-01T11:00:00"));
        view.replace_unavailable(&[], &[]);
        assert_eq!(view.selected(), Some(at("2026-09-01T11:00:00")));
    }

    #[test]
    fn only_one_slot_is_selected_at_a_time() {
        let mut view = CalendarView::for_week(date("2026-08-31"));
        view.select_slot(at("2026-09-01T11:00:00"));
        view.select_slot(at("2026-09-02T12:15:00"));
        assert_eq!(view.selected(), Some(at("2026-09-02T12:15:00")));
        assert!(!view.is_selected(at("2026-09-01T11:00:00")));
    }

    #[test]
    fn partial_overlap_blocks_a_slot() {
        let mut view = CalendarView::for_week(date("2026-08-31"));
        view.replace_unavailable(
            &[(at("2026-08-31T10:20:00"), at("2026-08-31T10:40:00"))],
            &[],
        );
        assert!(view.is_blocked(at("2026-08-31T10:15:00")));
        assert!(view.is_blocked(at("2026-08-31T10:30:00")));
        assert!(!view.is_blocked(at("2026-08-31T10:45:00")));
        // Ranges touching at the boundary do not block.
        assert!(!view.is_blocked(at("2026-08-31T10:00:00")));
    }

    #[test]
    fn closed_day_blocks_every_slot_that_day() {
        let mut view = CalendarView::for_week(date("2026-08-31"));
        view.replace_unavailable(&[], &[date("2026-09-02")]);
        assert!(view.is_blocked(at("2026-09-02T10:00:00")));
        assert!(view.is_blocked(at("2026-09-02T17:45:00")));
        assert!(!view.is_blocked(at("2026-09-03T10:00:00")));
    }

    #[test]
    fn opening_hours_per_day() {
        assert!(opening_hours(Weekday::Sun).is_none());
        let (open, close) = opening_hours(Weekday::Sat).unwrap();
        assert_eq!(open, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(close, NaiveTime::from_hms_opt(15, 0, 0).unwrap());
        let (_, close) = opening_hours(Weekday::Wed).unwrap();
        assert_eq!(close, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
    }

    #[test]
    fn day_slots_follow_opening_hours() {
        let weekday = day_slots(date("2026-09-01"));
        assert_eq!(weekday.len(), 32);
        assert_eq!(weekday[0], NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(
            *weekday.last().unwrap(),
            NaiveTime::from_hms_opt(17, 45, 0).unwrap()
        );

        let saturday = day_slots(date("2026-09-05"));
        assert_eq!(saturday.len(), 20);
        assert_eq!(
            *saturday.last().unwrap(),
            NaiveTime::from_hms_opt(14, 45, 0).unwrap()
        );

        assert!(day_slots(date("2026-09-06")).is_empty());
    }

    #[test]
    fn bookable_requires_open_hours_and_slot_boundary() {
        assert!(is_bookable(at("2026-09-01T10:00:00")));
        assert!(is_bookable(at("2026-09-01T17:45:00")));
        assert!(!is_bookable(at("2026-09-01T18:00:00")));
        assert!(!is_bookable(at("2026-09-01T09:45:00")));
        assert!(!is_bookable(at("2026-09-01T10:07:00")));
        // Saturday closes at 15:00, Sunday is closed.
        assert!(!is_bookable(at("2026-09-05T15:00:00")));
        assert!(!is_bookable(at("2026-09-06T11:00:00")));
    }

    #[test]
    fn slot_datetime_parsing_accepts_known_formats() {
        assert!(parse_slot_datetime("2026-09-01T10:00:00Z").is_some());
        assert!(parse_slot_datetime("2026-09-01T10:00:00+02:00").is_some());
        assert!(parse_slot_datetime("2026-09-01T10:00:00").is_some());
        assert!(parse_slot_datetime("2026-09-01 10:00:00").is_some());
        assert!(parse_slot_datetime("2026-09-01T10:00").is_some());
        assert!(parse_slot_datetime("next tuesday").is_none());
    }
}
