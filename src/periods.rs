use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::PainelError;
use crate::models::{Granularity, Statement};

/// Year selection applied to the period pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YearFilter {
    #[default]
    All,
    Year(i32),
}

impl FromStr for YearFilter {
    type Err = PainelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") || s.eq_ignore_ascii_case("todos") {
            return Ok(YearFilter::All);
        }
        s.parse::<i32>()
            .map(YearFilter::Year)
            .map_err(|_| PainelError::InvalidArgument(format!("year must be YYYY or 'all', got '{s}'")))
    }
}

impl fmt::Display for YearFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearFilter::All => write!(f, "Todos"),
            YearFilter::Year(y) => write!(f, "{y}"),
        }
    }
}

impl YearFilter {
    fn accepts(self, label: &str) -> bool {
        match self {
            YearFilter::All => true,
            YearFilter::Year(y) => label_year(label) == Some(y),
        }
    }

    /// Step through `All` followed by each available year, wrapping around.
    pub fn cycle(self, years: &[i32], delta: i32) -> Self {
        let mut options = vec![YearFilter::All];
        options.extend(years.iter().map(|&y| YearFilter::Year(y)));
        let len = options.len() as i32;
        let current = options.iter().position(|o| *o == self).unwrap_or(0) as i32;
        let next = (current + delta).rem_euclid(len);
        options[next as usize]
    }
}

/// Leading four-digit year of a period label (`2024-03`, `2024Q1`, `2024.0`).
pub fn label_year(label: &str) -> Option<i32> {
    let head: String = label.chars().take(4).collect();
    if head.len() == 4 && head.chars().all(|c| c.is_ascii_digit()) {
        head.parse().ok()
    } else {
        None
    }
}

/// Years the statement covers, ascending and deduplicated. Falls back to the
/// years present in the month labels when `anos` is empty.
pub fn available_years(statement: &Statement) -> Vec<i32> {
    let years: BTreeSet<i32> = if statement.anos.is_empty() {
        statement.meses.iter().filter_map(|m| label_year(m)).collect()
    } else {
        statement.anos.iter().copied().collect()
    };
    years.into_iter().collect()
}

/// Column labels for the chosen granularity and year: deduplicated and
/// string-sorted. Month labels are zero-padded so string order is
/// chronological.
pub fn filter_periods(statement: &Statement, year: YearFilter, granularity: Granularity) -> Vec<String> {
    let labels: BTreeSet<String> = match granularity {
        Granularity::Month => statement
            .meses
            .iter()
            .filter(|m| year.accepts(m))
            .cloned()
            .collect(),
        Granularity::Quarter => statement
            .trimestres
            .iter()
            .filter(|q| year.accepts(q))
            .cloned()
            .collect(),
        Granularity::Year => available_years(statement)
            .into_iter()
            .map(|y| y.to_string())
            .filter(|y| year.accepts(y))
            .collect(),
    };
    labels.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement() -> Statement {
        Statement::new(
            vec![
                "2024-02".into(),
                "2023-12".into(),
                "2024-01".into(),
                "2024-01".into(),
            ],
            vec!["2024Q1".into(), "2023Q4".into()],
            vec![2024, 2023],
            vec![],
        )
    }

    #[test]
    fn test_months_for_year_sorted_ascending() {
        let s = Statement::new(vec!["2024-01".into(), "2024-02".into()], vec![], vec![2024], vec![]);
        let periods = filter_periods(&s, YearFilter::Year(2024), Granularity::Month);
        assert_eq!(periods, vec!["2024-01", "2024-02"]);
    }

    #[test]
    fn test_months_dedup_and_filter() {
        let periods = filter_periods(&statement(), YearFilter::Year(2024), Granularity::Month);
        assert_eq!(periods, vec!["2024-01", "2024-02"]);
        let all = filter_periods(&statement(), YearFilter::All, Granularity::Month);
        assert_eq!(all, vec!["2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn test_quarters_filtered_by_year_prefix() {
        let periods = filter_periods(&statement(), YearFilter::Year(2023), Granularity::Quarter);
        assert_eq!(periods, vec!["2023Q4"]);
    }

    #[test]
    fn test_years_as_labels() {
        let all = filter_periods(&statement(), YearFilter::All, Granularity::Year);
        assert_eq!(all, vec!["2023", "2024"]);
        let one = filter_periods(&statement(), YearFilter::Year(2024), Granularity::Year);
        assert_eq!(one, vec!["2024"]);
    }

    #[test]
    fn test_available_years_fall_back_to_months() {
        let s = Statement::new(vec!["2022-05".into(), "2021-01".into()], vec![], vec![], vec![]);
        assert_eq!(available_years(&s), vec![2021, 2022]);
    }

    #[test]
    fn test_year_filter_parse() {
        assert_eq!("all".parse::<YearFilter>().unwrap(), YearFilter::All);
        assert_eq!("2024".parse::<YearFilter>().unwrap(), YearFilter::Year(2024));
        assert!("24x".parse::<YearFilter>().is_err());
    }

    #[test]
    fn test_year_filter_cycle_wraps() {
        let years = [2023, 2024];
        assert_eq!(YearFilter::All.cycle(&years, 1), YearFilter::Year(2023));
        assert_eq!(YearFilter::Year(2024).cycle(&years, 1), YearFilter::All);
        assert_eq!(YearFilter::All.cycle(&years, -1), YearFilter::Year(2024));
    }

    #[test]
    fn test_label_year() {
        assert_eq!(label_year("2024-03"), Some(2024));
        assert_eq!(label_year("2024.0"), Some(2024));
        assert_eq!(label_year("Q1"), None);
    }
}
