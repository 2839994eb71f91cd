//! Month grid for the planner's date picker.

use std::collections::HashSet;

use chrono::{Datelike, Days, Months, NaiveDate};

/// Years accepted from `date` and `month` query parameters.
const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    match first_of_month(date).checked_add_months(Months::new(1)) {
        Some(next) => next.pred_opt().unwrap_or(date),
        // Only the final representable month has no successor
        None => NaiveDate::MAX,
    }
}

/// Every day of the month containing `date`, in order.
pub fn days_in_month(date: NaiveDate) -> Vec<NaiveDate> {
    first_of_month(date)
        .iter_days()
        .take_while(|d| d.month() == date.month())
        .collect()
}

/// First day of the previous month.
pub fn prev_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    first.checked_sub_months(Months::new(1)).unwrap_or(first)
}

/// First day of the next month.
pub fn next_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    first.checked_add_months(Months::new(1)).unwrap_or(first)
}

fn in_supported_range(date: &NaiveDate) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&date.year())
}

/// Parse a `YYYY-MM-DD` date parameter. Years outside 1..=9999 are rejected.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .ok()
        .filter(in_supported_range)
}

/// Parse a `YYYY-MM` month parameter into the first day of that month.
pub fn parse_month(value: &str) -> Option<NaiveDate> {
    parse_date(&format!("{}-01", value.trim()))
}

pub fn format_month(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarCell {
    /// False for the padding cells before the 1st and after the last day.
    pub in_month: bool,
    pub date: NaiveDate,
    pub day: u32,
    pub is_selected: bool,
    pub is_today: bool,
    pub has_session: bool,
}

impl CalendarCell {
    pub fn date_param(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

#[derive(Debug, Clone)]
pub struct MonthView {
    pub month: NaiveDate,
    pub title: String,
    /// Sunday-first weeks of seven cells. Padding is dropped only where it
    /// would fall outside the representable date range.
    pub weeks: Vec<Vec<CalendarCell>>,
}

impl MonthView {
    pub fn build(
        month: NaiveDate,
        selected: NaiveDate,
        today: NaiveDate,
        marked: &HashSet<NaiveDate>,
    ) -> Self {
        let first = first_of_month(month);
        let last = last_of_month(month);
        let leading = Days::new(u64::from(first.weekday().num_days_from_sunday()));
        let trailing = Days::new(u64::from(6 - last.weekday().num_days_from_sunday()));
        let grid_start = first.checked_sub_days(leading).unwrap_or(first);
        let grid_end = last.checked_add_days(trailing).unwrap_or(last);

        let cells: Vec<CalendarCell> = grid_start
            .iter_days()
            .take_while(|d| *d <= grid_end)
            .map(|date| {
                let in_month = date.month() == first.month() && date.year() == first.year();
                CalendarCell {
                    in_month,
                    date,
                    day: date.day(),
                    is_selected: in_month && date == selected,
                    is_today: in_month && date == today,
                    has_session: in_month && marked.contains(&date),
                }
            })
            .collect();

        Self {
            month: first,
            title: first.format("%B %Y").to_string(),
            weeks: cells.chunks(7).map(|week| week.to_vec()).collect(),
        }
    }

    pub fn month_param(&self) -> String {
        format_month(self.month)
    }

    pub fn prev_param(&self) -> String {
        format_month(prev_month(self.month))
    }

    pub fn next_param(&self) -> String {
        format_month(next_month(self.month))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(first_of_month(date("2024-02-17")), date("2024-02-01"));
        assert_eq!(last_of_month(date("2024-02-17")), date("2024-02-29"));
        assert_eq!(last_of_month(date("2023-12-05")), date("2023-12-31"));
    }

    #[test]
    fn test_days_in_month() {
        let days = days_in_month(date("2024-02-10"));
        assert_eq!(days.len(), 29);
        assert_eq!(days[0], date("2024-02-01"));
        assert_eq!(days[28], date("2024-02-29"));
        assert_eq!(days_in_month(date("2023-04-30")).len(), 30);
    }

    #[test]
    fn test_month_navigation_crosses_years() {
        assert_eq!(prev_month(date("2024-01-31")), date("2023-12-01"));
        assert_eq!(next_month(date("2024-12-31")), date("2025-01-01"));
        assert_eq!(next_month(date("2024-01-31")), date("2024-02-01"));
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2024-01"), Some(date("2024-01-01")));
        assert_eq!(parse_month("2024-13"), None);
        assert_eq!(parse_month("soon"), None);
        assert_eq!(format_month(date("2024-03-09")), "2024-03");
    }

    #[test]
    fn test_parse_rejects_years_outside_four_digits() {
        assert_eq!(parse_month("-262143-01"), None);
        assert_eq!(parse_month("0000-05"), None);
        assert_eq!(parse_month("10000-01"), None);
        assert_eq!(parse_month("9999-12"), Some(date("9999-12-01")));
        assert_eq!(parse_date("-262143-01-01"), None);
        assert_eq!(parse_date(" 2024-01-10 "), Some(date("2024-01-10")));
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_last_of_final_month() {
        assert_eq!(last_of_month(NaiveDate::MAX), NaiveDate::MAX);
        assert_eq!(first_of_month(NaiveDate::MIN), NaiveDate::MIN);
    }

    #[test]
    fn test_grid_at_edges_of_date_range() {
        let view = MonthView::build(NaiveDate::MIN, NaiveDate::MIN, NaiveDate::MIN, &HashSet::new());
        let days = view.weeks.iter().flatten().filter(|cell| cell.in_month).count();
        assert_eq!(days, 31);
        assert!(view.weeks.iter().all(|week| week.len() <= 7));

        let view = MonthView::build(NaiveDate::MAX, NaiveDate::MAX, NaiveDate::MAX, &HashSet::new());
        let last = view.weeks.iter().flatten().last().map(|cell| cell.date);
        assert_eq!(last, Some(NaiveDate::MAX));
        assert_eq!(view.next_param(), view.month_param());
    }

    #[test]
    fn test_grid_has_whole_sunday_first_weeks() {
        let view = MonthView::build(
            date("2024-01-01"),
            date("2024-01-10"),
            date("2024-01-15"),
            &HashSet::new(),
        );

        assert_eq!(view.title, "January 2024");
        assert!(view.weeks.iter().all(|week| week.len() == 7));
        assert!(view.weeks.iter().all(|week| week[0].date.weekday() == Weekday::Sun));

        let in_month: Vec<u32> = view
            .weeks
            .iter()
            .flatten()
            .filter(|cell| cell.in_month)
            .map(|cell| cell.day)
            .collect();
        assert_eq!(in_month, (1..=31).collect::<Vec<_>>());

        // January 1st 2024 was a Monday, so one leading blank.
        assert!(!view.weeks[0][0].in_month);
        assert!(view.weeks[0][1].in_month);
    }

    #[test]
    fn test_grid_flags() {
        let marked: HashSet<NaiveDate> = [date("2024-01-03"), date("2024-02-01")].into();
        let view = MonthView::build(date("2024-01-20"), date("2024-01-10"), date("2024-01-15"), &marked);
        let cells: Vec<&CalendarCell> = view.weeks.iter().flatten().collect();

        let find = |d: &str| cells.iter().find(|c| c.date == date(d)).unwrap();

        assert!(find("2024-01-10").is_selected);
        assert!(find("2024-01-15").is_today);
        assert!(find("2024-01-03").has_session);
        assert!(!find("2024-01-04").has_session);
        // Trailing padding never carries markers.
        assert!(!find("2024-02-01").has_session);
        assert_eq!(find("2024-01-10").date_param(), "2024-01-10");
    }

    #[test]
    fn test_month_params() {
        let view = MonthView::build(date("2024-01-20"), date("2024-01-20"), date("2024-01-20"), &HashSet::new());

        assert_eq!(view.month_param(), "2024-01");
        assert_eq!(view.prev_param(), "2023-12");
        assert_eq!(view.next_param(), "2024-02");
    }

    #[test]
    fn test_month_starting_on_sunday_has_no_leading_blank() {
        // September 1st 2024 was a Sunday.
        let view = MonthView::build(date("2024-09-01"), date("2024-09-01"), date("2024-09-01"), &HashSet::new());

        assert!(view.weeks[0][0].in_month);
        assert_eq!(view.weeks[0][0].day, 1);
    }
}
