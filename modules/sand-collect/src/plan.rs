use chrono::{Datelike, NaiveDate};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One calendar quarter of a handle's history, clipped to the requested range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchWindow {
    /// "Jul-Sep 2025"
    pub name: String,
    pub since: NaiveDate,
    pub until: NaiveDate,
    /// "batch_2025_07_09.json"
    pub file_name: String,
}

impl BatchWindow {
    fn quarter(year: i32, first_month: u32, since: NaiveDate, until: NaiveDate) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, first_month, 1)?;
        let end = next_quarter_start(start)?.pred_opt()?;
        let last_month = first_month + 2;

        Some(Self {
            name: format!(
                "{}-{} {}",
                MONTHS[(first_month - 1) as usize],
                MONTHS[(last_month - 1) as usize],
                year
            ),
            since: start.max(since),
            until: end.min(until),
            file_name: format!("batch_{year}_{first_month:02}_{last_month:02}.json"),
        })
    }

    pub fn date_range(&self) -> String {
        format!(
            "{} to {}",
            self.since.format("%Y-%m-%d"),
            self.until.format("%Y-%m-%d")
        )
    }

    /// Live-ordered search for one author's tweets inside the window.
    pub fn search_url(&self, handle: &str) -> String {
        format!(
            "https://twitter.com/search?q=from:{} since:{} until:{}&f=live",
            handle,
            self.since.format("%Y-%m-%d"),
            self.until.format("%Y-%m-%d")
        )
    }
}

/// Quarterly windows covering `since..=until`, newest first.
pub fn quarterly_windows(since: NaiveDate, until: NaiveDate) -> Vec<BatchWindow> {
    let mut windows = Vec::new();
    if since > until {
        return windows;
    }

    let mut year = until.year();
    let mut first_month = quarter_first_month(until.month());
    while let Some(window) = BatchWindow::quarter(year, first_month, since, until) {
        if window.until < since {
            break;
        }
        let reached_start = window.since == since;
        windows.push(window);
        if reached_start {
            break;
        }
        if first_month == 1 {
            year -= 1;
            first_month = 10;
        } else {
            first_month -= 3;
        }
    }
    windows
}

fn quarter_first_month(month: u32) -> u32 {
    (month - 1) / 3 * 3 + 1
}

fn next_quarter_start(start: NaiveDate) -> Option<NaiveDate> {
    if start.month() >= 10 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 3, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn full_quarters_newest_first() {
        let windows = quarterly_windows(date("2024-01-01"), date("2024-12-31"));
        let names: Vec<_> = windows.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Oct-Dec 2024", "Jul-Sep 2024", "Apr-Jun 2024", "Jan-Mar 2024"]
        );
        assert_eq!(windows[1].file_name, "batch_2024_07_09.json");
        assert_eq!(windows[1].date_range(), "2024-07-01 to 2024-09-30");
    }

    #[test]
    fn partial_quarters_are_clipped() {
        let windows = quarterly_windows(date("2024-02-15"), date("2024-05-10"));
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].name, "Apr-Jun 2024");
        assert_eq!(windows[0].since, date("2024-04-01"));
        assert_eq!(windows[0].until, date("2024-05-10"));
        assert_eq!(windows[1].since, date("2024-02-15"));
        assert_eq!(windows[1].until, date("2024-03-31"));
    }

    #[test]
    fn crosses_year_boundary() {
        let windows = quarterly_windows(date("2023-11-01"), date("2024-01-20"));
        let files: Vec<_> = windows.iter().map(|w| w.file_name.as_str()).collect();
        assert_eq!(files, vec!["batch_2024_01_03.json", "batch_2023_10_12.json"]);
    }

    #[test]
    fn single_day_and_inverted_ranges() {
        assert_eq!(quarterly_windows(date("2024-08-08"), date("2024-08-08")).len(), 1);
        assert!(quarterly_windows(date("2024-08-09"), date("2024-08-08")).is_empty());
    }

    #[test]
    fn search_url_embeds_handle_and_dates() {
        let window = &quarterly_windows(date("2025-07-01"), date("2025-09-30"))[0];
        assert_eq!(
            window.search_url("sand"),
            "https://twitter.com/search?q=from:sand since:2025-07-01 until:2025-09-30&f=live"
        );
    }
}
