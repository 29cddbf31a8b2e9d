use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};

use crate::domain::validation::overlaps;
use crate::domain::{CoupleId, Court, CourtId, MatchId};

#[derive(Debug, Clone, Copy)]
struct Booking {
    start: NaiveDateTime,
    end: NaiveDateTime,
    match_id: MatchId,
}

/// Bookings of one court inside its usable window
#[derive(Debug, Clone)]
pub struct CourtTimeline {
    pub court_id: CourtId,
    open: NaiveDateTime,
    close: NaiveDateTime,
    bookings: Vec<Booking>,
    load: Duration,
}

impl CourtTimeline {
    /// Timeline of `court` clipped to `window` when one is given
    pub fn new(court: &Court, window: Option<(NaiveDateTime, NaiveDateTime)>) -> Self {
        let (open, close) = match window {
            Some((start, end)) => (
                court.availability_start.max(start),
                court.availability_end.min(end),
            ),
            None => (court.availability_start, court.availability_end),
        };

        Self {
            court_id: court.id,
            open,
            close,
            bookings: Vec::new(),
            load: Duration::zero(),
        }
    }

    /// Total booked playing time
    pub fn load(&self) -> Duration {
        self.load
    }

    /// End of the latest booking, or the opening time when nothing is booked
    pub fn finishes_at(&self) -> NaiveDateTime {
        self.bookings
            .iter()
            .map(|b| b.end)
            .max()
            .unwrap_or(self.open)
    }

    /// Records an existing booking; these may lie outside the window
    pub fn book(&mut self, match_id: MatchId, start: NaiveDateTime, end: NaiveDateTime) {
        let idx = self
            .bookings
            .partition_point(|b| (b.start, b.match_id) < (start, match_id));
        self.bookings.insert(idx, Booking { start, end, match_id });
        self.load = self.load + (end - start);
    }

    /// Earliest start `>= not_before` where `duration` fits inside the window
    /// without touching another booking, keeping `changeover` free on both sides.
    pub fn earliest_fit(
        &self,
        duration: Duration,
        not_before: NaiveDateTime,
        changeover: Duration,
    ) -> Option<NaiveDateTime> {
        let mut candidate = not_before.max(self.open);

        for booking in &self.bookings {
            if candidate + duration + changeover <= booking.start {
                break;
            }
            candidate = candidate.max(booking.end + changeover);
        }

        (candidate + duration <= self.close).then_some(candidate)
    }
}

/// Intervals during which each couple is already on court
#[derive(Debug, Clone, Default)]
pub struct CoupleCalendar {
    busy: HashMap<CoupleId, Vec<(NaiveDateTime, NaiveDateTime)>>,
}

impl CoupleCalendar {
    pub fn book(&mut self, couples: [CoupleId; 2], start: NaiveDateTime, end: NaiveDateTime) {
        for couple in couples {
            self.busy.entry(couple).or_default().push((start, end));
        }
    }

    /// Earliest start `>= from` at which neither couple is busy for `duration`
    pub fn earliest_free(
        &self,
        couples: [CoupleId; 2],
        from: NaiveDateTime,
        duration: Duration,
    ) -> NaiveDateTime {
        let mut candidate = from;
        loop {
            let blocking_end = couples
                .iter()
                .filter_map(|c| self.busy.get(c))
                .flatten()
                .filter(|(start, end)| overlaps(candidate, candidate + duration, *start, *end))
                .map(|(_, end)| *end)
                .max();

            match blocking_end {
                Some(end) => candidate = end,
                None => return candidate,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn court() -> Court {
        Court {
            id: 1,
            name: "Center".to_string(),
            availability_start: at(9, 0),
            availability_end: at(13, 0),
        }
    }

    #[test]
    fn test_fills_gap_between_bookings() {
        let mut timeline = CourtTimeline::new(&court(), None);
        timeline.book(1, at(9, 0), at(10, 0));
        timeline.book(2, at(11, 0), at(12, 0));

        let hour = Duration::minutes(60);
        assert_eq!(timeline.earliest_fit(hour, at(9, 0), Duration::zero()), Some(at(10, 0)));
        assert_eq!(timeline.earliest_fit(hour, at(10, 30), Duration::zero()), Some(at(12, 0)));
        assert_eq!(timeline.earliest_fit(hour, at(12, 30), Duration::zero()), None);
        assert_eq!(timeline.load(), Duration::minutes(120));
    }

    #[test]
    fn test_changeover_is_kept_free() {
        let mut timeline = CourtTimeline::new(&court(), None);
        timeline.book(1, at(9, 0), at(10, 0));
        timeline.book(2, at(11, 0), at(12, 0));

        let hour = Duration::minutes(60);
        let gap = Duration::minutes(10);
        assert_eq!(timeline.earliest_fit(hour, at(9, 0), gap), None);
        assert_eq!(timeline.earliest_fit(Duration::minutes(40), at(9, 0), gap), Some(at(10, 10)));
    }

    #[test]
    fn test_window_clips_availability() {
        let timeline = CourtTimeline::new(&court(), Some((at(10, 0), at(11, 0))));
        assert_eq!(timeline.earliest_fit(Duration::minutes(30), at(8, 0), Duration::zero()), Some(at(10, 0)));
        assert!(timeline.earliest_fit(Duration::minutes(90), at(8, 0), Duration::zero()).is_none());
        assert_eq!(timeline.finishes_at(), at(10, 0));
    }

    #[test]
    fn test_couple_calendar() {
        let mut calendar = CoupleCalendar::default();
        calendar.book([1, 2], at(9, 0), at(10, 0));
        calendar.book([3, 1], at(10, 0), at(11, 0));

        let hour = Duration::minutes(60);
        assert_eq!(calendar.earliest_free([1, 4], at(9, 0), hour), at(11, 0));
        assert_eq!(calendar.earliest_free([5, 6], at(9, 0), hour), at(9, 0));
    }
}
