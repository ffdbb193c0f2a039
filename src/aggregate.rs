//! Period-sliced lookups, totals and percentages over a financial tree.
//!
//! `*_at` lookups keep the distinction between a missing value and zero. The
//! zero-defaulting helpers (`value`, `budget`, `total_*`) are what the tables
//! display, since period maps are sparse and absence means zero.

use crate::models::{FinancialNode, Granularity, LineKind, Statement};

/// Which definition of 100% the vertical-analysis (AV) column uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum VerticalBase {
    /// Percentages exactly as the backend formatted them.
    #[default]
    Server,
    /// Recomputed client-side: Σ|total| of every top-level line over the
    /// filtered periods.
    Dynamic,
}

pub fn value_at(node: &FinancialNode, g: Granularity, period: &str) -> Option<f64> {
    node.values(g).and_then(|m| m.get(period))
}

pub fn budget_at(node: &FinancialNode, g: Granularity, period: &str) -> Option<f64> {
    node.budgets(g).and_then(|m| m.get(period))
}

pub fn value(node: &FinancialNode, g: Granularity, period: &str) -> f64 {
    value_at(node, g, period).unwrap_or(0.0)
}

pub fn budget(node: &FinancialNode, g: Granularity, period: &str) -> f64 {
    budget_at(node, g, period).unwrap_or(0.0)
}

/// Sum of actual values over exactly the given periods.
pub fn total_values(node: &FinancialNode, g: Granularity, periods: &[String]) -> f64 {
    periods.iter().map(|p| value(node, g, p)).sum()
}

/// Sum of budget values over exactly the given periods.
pub fn total_budgets(node: &FinancialNode, g: Granularity, periods: &[String]) -> f64 {
    periods.iter().map(|p| budget(node, g, p)).sum()
}

/// `(real - budget) / budget * 100`, or `None` when there is no budget to
/// compare against.
pub fn variance_pct(real: f64, budget: f64) -> Option<f64> {
    if budget == 0.0 {
        None
    } else {
        Some((real - budget) / budget * 100.0)
    }
}

/// `amount` as a percentage of `base`; `None` for a zero base.
pub fn share_pct(amount: f64, base: f64) -> Option<f64> {
    if base == 0.0 {
        None
    } else {
        Some(amount / base * 100.0)
    }
}

/// Σ|total(node)| across the top-level lines for the filtered periods.
pub fn dynamic_vertical_base(statement: &Statement, g: Granularity, periods: &[String]) -> f64 {
    statement
        .data
        .iter()
        .map(|n| total_values(n, g, periods).abs())
        .sum()
}

/// Whether a budget variance is good news for this kind of line. Spending
/// above budget on an outflow line is unfavourable; everything else reads
/// "more is better".
pub fn variance_favorable(kind: &LineKind, variance: f64) -> bool {
    match kind {
        LineKind::Outflow => variance <= 0.0,
        _ => variance >= 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PeriodMap;
    use crate::periods::{filter_periods, YearFilter};

    fn map(entries: &[(&str, f64)]) -> PeriodMap {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn node(nome: &str, valores: &[(&str, f64)], orcamentos: Option<&[(&str, f64)]>) -> FinancialNode {
        FinancialNode {
            nome: nome.to_string(),
            valores_mensais: Some(map(valores)),
            orcamentos_mensais: orcamentos.map(map),
            ..Default::default()
        }
    }

    fn statement() -> Statement {
        Statement::new(
            vec!["2023-12".into(), "2024-01".into(), "2024-02".into()],
            vec![],
            vec![2023, 2024],
            vec![
                node(
                    "Receitas",
                    &[("2023-12", 50.0), ("2024-01", 100.0), ("2024-02", 200.0)],
                    Some(&[("2024-01", 80.0), ("2024-02", 250.0)]),
                ),
                node("Despesas", &[("2024-01", -60.0), ("2023-12", -40.0)], None),
            ],
        )
    }

    #[test]
    fn test_total_sums_only_filtered_periods() {
        let s = statement();
        let receitas = &s.data[0];
        let p2024 = filter_periods(&s, YearFilter::Year(2024), Granularity::Month);
        let all = filter_periods(&s, YearFilter::All, Granularity::Month);

        let expected: f64 = p2024.iter().map(|p| value(receitas, Granularity::Month, p)).sum();
        assert_eq!(total_values(receitas, Granularity::Month, &p2024), expected);
        assert_eq!(total_values(receitas, Granularity::Month, &p2024), 300.0);
        assert_eq!(total_values(receitas, Granularity::Month, &all), 350.0);
    }

    #[test]
    fn test_missing_budget_map_is_zero_and_variance_none() {
        let n = node("Caixa", &[("2024-01", 100.0)], None);
        assert_eq!(budget(&n, Granularity::Month, "2024-01"), 0.0);
        assert_eq!(budget_at(&n, Granularity::Month, "2024-01"), None);
        let real = value(&n, Granularity::Month, "2024-01");
        assert_eq!(variance_pct(real, budget(&n, Granularity::Month, "2024-01")), None);
    }

    #[test]
    fn test_variance_undefined_for_zero_budget() {
        for real in [-100.0, 0.0, 0.5, 1e9] {
            assert_eq!(variance_pct(real, 0.0), None);
        }
    }

    #[test]
    fn test_variance_pct() {
        assert_eq!(variance_pct(110.0, 100.0), Some(10.0));
        assert_eq!(variance_pct(50.0, 100.0), Some(-50.0));
    }

    #[test]
    fn test_missing_values_map_does_not_panic() {
        let n = FinancialNode { nome: "Vazio".into(), ..Default::default() };
        assert_eq!(value_at(&n, Granularity::Quarter, "2024Q1"), None);
        assert_eq!(total_values(&n, Granularity::Year, &["2024".to_string()]), 0.0);
    }

    #[test]
    fn test_year_lookup_with_dot_zero_key() {
        let n = FinancialNode {
            nome: "Receitas".into(),
            valores_anuais: Some(map(&[("2024.0", 1200.0)])),
            ..Default::default()
        };
        assert_eq!(value(&n, Granularity::Year, "2024"), 1200.0);
    }

    #[test]
    fn test_dynamic_vertical_base_uses_absolute_totals() {
        let s = statement();
        let p2024 = filter_periods(&s, YearFilter::Year(2024), Granularity::Month);
        // |300| + |-60|
        assert_eq!(dynamic_vertical_base(&s, Granularity::Month, &p2024), 360.0);
        let all = filter_periods(&s, YearFilter::All, Granularity::Month);
        // |350| + |-100|
        assert_eq!(dynamic_vertical_base(&s, Granularity::Month, &all), 450.0);
    }

    #[test]
    fn test_share_pct_zero_base() {
        assert_eq!(share_pct(10.0, 0.0), None);
        assert_eq!(share_pct(25.0, 200.0), Some(12.5));
    }

    #[test]
    fn test_variance_favorable_by_line_kind() {
        assert!(variance_favorable(&LineKind::Inflow, 5.0));
        assert!(!variance_favorable(&LineKind::Inflow, -5.0));
        assert!(!variance_favorable(&LineKind::Outflow, 5.0));
        assert!(variance_favorable(&LineKind::Outflow, -5.0));
    }
}
