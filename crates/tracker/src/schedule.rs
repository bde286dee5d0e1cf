//! Weekly collection schedule per sector.

use crate::vehicle::VehicleCategory;
use chrono::{Datelike, Days, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// One recurring collection window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSlot {
    pub weekday: Weekday,
    pub category: VehicleCategory,
    pub start: NaiveTime,
    /// Earlier than `start` when the window runs past midnight
    pub end: NaiveTime,
    pub sector: String,
}

impl CollectionSlot {
    pub fn new(
        weekday: Weekday,
        category: VehicleCategory,
        start: NaiveTime,
        end: NaiveTime,
        sector: &str,
    ) -> Self {
        Self {
            weekday,
            category,
            start,
            end,
            sector: sector.to_string(),
        }
    }

    pub fn crosses_midnight(&self) -> bool {
        self.end <= self.start
    }

    /// Window as `HH:MM-HH:MM`
    pub fn window(&self) -> String {
        format!("{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }

    fn serves(&self, sector: Option<&str>) -> bool {
        sector.is_none_or(|s| self.sector.eq_ignore_ascii_case(s))
    }
}

/// The recurring week of collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    slots: Vec<CollectionSlot>,
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

impl Default for Schedule {
    /// The reference city's week
    fn default() -> Self {
        use VehicleCategory::*;
        use Weekday::*;
        Self::new(vec![
            CollectionSlot::new(Mon, General, hm(7, 0), hm(10, 0), "Pillcomarca"),
            CollectionSlot::new(Mon, Organic, hm(14, 0), hm(17, 0), "Pillcomarca"),
            CollectionSlot::new(Tue, Recyclable, hm(8, 0), hm(12, 0), "Amarilis"),
            CollectionSlot::new(Wed, General, hm(7, 0), hm(10, 0), "Huánuco Centro"),
            CollectionSlot::new(Fri, Organic, hm(6, 0), hm(9, 0), "Las Moras"),
            CollectionSlot::new(Fri, General, hm(22, 0), hm(1, 0), "Pillcomarca"),
            CollectionSlot::new(Sat, Recyclable, hm(9, 0), hm(13, 0), "Feria Dominical"),
        ])
    }
}

impl Schedule {
    /// Slots are kept ordered by weekday, then start time
    pub fn new(mut slots: Vec<CollectionSlot>) -> Self {
        slots.sort_by_key(|s| (s.weekday.num_days_from_monday(), s.start));
        Self { slots }
    }

    pub fn slots(&self) -> &[CollectionSlot] {
        &self.slots
    }

    /// Slots on `weekday`, optionally limited to one sector (case-insensitive)
    pub fn for_day<'a>(
        &'a self,
        weekday: Weekday,
        sector: Option<&'a str>,
    ) -> impl Iterator<Item = &'a CollectionSlot> + 'a {
        self.slots
            .iter()
            .filter(move |s| s.weekday == weekday && s.serves(sector))
    }

    /// The first collection starting at or after `now`, with its start time
    pub fn next_after(
        &self,
        now: NaiveDateTime,
        sector: Option<&str>,
    ) -> Option<(NaiveDateTime, &CollectionSlot)> {
        (0..=7u64)
            .filter_map(|offset| now.date().checked_add_days(Days::new(offset)))
            .flat_map(|date| {
                self.slots
                    .iter()
                    .filter(move |s| s.weekday == date.weekday() && s.serves(sector))
                    .map(move |s| (date.and_time(s.start), s))
            })
            .find(|(start, _)| *start >= now)
    }
}
