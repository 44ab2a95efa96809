//! Calendar-season resolution.
//!
//! The year is partitioned into four contiguous intervals anchored at the
//! 21st of March, June, September, and December. Lower bounds are inclusive:
//! March 21 itself is the first day of Spring. The interval that starts on
//! December 21 wraps across the year end. Southern-hemisphere callers get
//! the label six months offset from the northern one for the same date.

use chrono::{Datelike, NaiveDate, Utc};

use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    /// The six-month-offset label for the opposite hemisphere.
    pub fn opposite(self) -> Season {
        match self {
            Season::Spring => Season::Fall,
            Season::Summer => Season::Winter,
            Season::Fall => Season::Spring,
            Season::Winter => Season::Summer,
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    Northern,
    Southern,
}

impl std::str::FromStr for Hemisphere {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "northern" => Ok(Hemisphere::Northern),
            "southern" => Ok(Hemisphere::Southern),
            other => Err(PipelineError::Configuration(format!(
                "unknown hemisphere '{}': expected northern or southern",
                other
            ))),
        }
    }
}

/// Season interval starts as northern-hemisphere labels, ascending.
/// Dates before the first entry belong to the interval that starts on
/// December 21 of the previous year.
const BOUNDARIES: [(u32, u32, Season); 4] = [
    (3, 21, Season::Spring),
    (6, 21, Season::Summer),
    (9, 21, Season::Fall),
    (12, 21, Season::Winter),
];

/// Resolve the season for a calendar date. Total over every valid date.
pub fn season_for(date: NaiveDate, hemisphere: Hemisphere) -> Season {
    let md = (date.month(), date.day());

    // Last boundary at or before the date; Winter wraps the year start.
    let mut northern = Season::Winter;
    for &(month, day, season) in &BOUNDARIES {
        if md >= (month, day) {
            northern = season;
        }
    }

    match hemisphere {
        Hemisphere::Northern => northern,
        Hemisphere::Southern => northern.opposite(),
    }
}

/// Resolve the season for today's date.
pub fn current_season(hemisphere: Hemisphere) -> Season {
    season_for(Utc::now().date_naive(), hemisphere)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn mid_january_is_winter_north_summer_south() {
        let d = date(2025, 1, 15);
        assert_eq!(season_for(d, Hemisphere::Northern), Season::Winter);
        assert_eq!(season_for(d, Hemisphere::Southern), Season::Summer);
    }

    #[test]
    fn boundary_days_start_the_new_season() {
        // The 21st is inclusive; the 20th still belongs to the old season.
        let cases = [
            (date(2025, 3, 20), Season::Winter),
            (date(2025, 3, 21), Season::Spring),
            (date(2025, 6, 20), Season::Spring),
            (date(2025, 6, 21), Season::Summer),
            (date(2025, 9, 20), Season::Summer),
            (date(2025, 9, 21), Season::Fall),
            (date(2025, 12, 20), Season::Fall),
            (date(2025, 12, 21), Season::Winter),
        ];
        for (d, expected) in cases {
            assert_eq!(season_for(d, Hemisphere::Northern), expected, "{}", d);
        }
    }

    #[test]
    fn year_end_wraps_into_winter() {
        assert_eq!(
            season_for(date(2025, 12, 31), Hemisphere::Northern),
            Season::Winter
        );
        assert_eq!(
            season_for(date(2026, 1, 1), Hemisphere::Northern),
            Season::Winter
        );
    }

    #[test]
    fn every_day_of_a_leap_year_maps_to_one_season() {
        let mut d = date(2024, 1, 1);
        let end = date(2025, 1, 1);
        let mut counts = std::collections::HashMap::new();
        while d < end {
            let season = season_for(d, Hemisphere::Northern);
            *counts.entry(season).or_insert(0u32) += 1;
            d = d.succ_opt().unwrap();
        }
        assert_eq!(counts.values().sum::<u32>(), 366);
        assert_eq!(counts.len(), 4);
        // Each interval spans roughly a quarter of the year.
        for (&season, &days) in &counts {
            assert!(days > 80, "{:?} covers only {} days", season, days);
        }
    }

    #[test]
    fn hemispheres_always_differ_by_six_months() {
        let mut d = date(2024, 1, 1);
        let end = date(2025, 1, 1);
        while d < end {
            let north = season_for(d, Hemisphere::Northern);
            let south = season_for(d, Hemisphere::Southern);
            assert_eq!(south, north.opposite(), "{}", d);
            d = d.succ_opt().unwrap();
        }
    }

    #[test]
    fn hemisphere_parses_case_insensitively() {
        assert_eq!(
            "Northern".parse::<Hemisphere>().unwrap(),
            Hemisphere::Northern
        );
        assert_eq!(
            "southern".parse::<Hemisphere>().unwrap(),
            Hemisphere::Southern
        );
        assert!("equatorial".parse::<Hemisphere>().is_err());
    }
}
