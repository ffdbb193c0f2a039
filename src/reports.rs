use crate::aggregate::{
    budget, dynamic_vertical_base, share_pct, total_budgets,
    total_values, value, variance_pct, VerticalBase,
};
use crate::expand::ExpandState;
use crate::models::{FinancialNode, Granularity, LineKind, NodeId, Statement, StatementKind};
use crate::periods::{filter_periods, YearFilter};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportOptions {
    pub granularity: Granularity,
    pub year: YearFilter,
    pub show_budget: bool,
    pub show_variance: bool,
    pub show_vertical: bool,
    pub show_horizontal: bool,
    pub vertical_base: VerticalBase,
}

impl ReportOptions {
    pub fn new(granularity: Granularity, year: YearFilter) -> Self {
        Self {
            granularity,
            year,
            show_budget: false,
            show_variance: false,
            show_vertical: false,
            show_horizontal: false,
            vertical_base: VerticalBase::Server,
        }
    }

    /// Measures shown under each period, in column order. `Real` is always
    /// present.
    pub fn measures(&self) -> Vec<Measure> {
        let mut m = vec![Measure::Real];
        if self.show_budget {
            m.push(Measure::Budget);
        }
        if self.show_variance {
            m.push(Measure::Variance);
        }
        if self.show_vertical {
            m.push(Measure::Vertical);
        }
        if self.show_horizontal {
            m.push(Measure::Horizontal);
        }
        m
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Real,
    Budget,
    Variance,
    Vertical,
    Horizontal,
}

impl Measure {
    pub fn header(self) -> &'static str {
        match self {
            Measure::Real => "Real",
            Measure::Budget => "Orçado",
            Measure::Variance => "Var %",
            Measure::Vertical => "AV %",
            Measure::Horizontal => "AH %",
        }
    }
}

// ---------------------------------------------------------------------------
// Report model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Amount(f64),
    /// Percentage computed client-side.
    Pct(f64),
    /// Percentage string formatted by the backend.
    ServerPct(String),
    Empty,
}

impl CellValue {
    fn from_pct(p: Option<f64>) -> Self {
        p.map(CellValue::Pct).unwrap_or(CellValue::Empty)
    }

    fn from_server(s: Option<&str>) -> Self {
        s.map(|s| CellValue::ServerPct(s.to_string()))
            .unwrap_or(CellValue::Empty)
    }
}

/// A column of the pivot: one measure under one period, or under the Total
/// group when `period` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementColumn {
    pub period: Option<String>,
    pub measure: Measure,
}

#[derive(Debug, Clone)]
pub struct StatementRow {
    pub id: NodeId,
    pub depth: usize,
    pub nome: String,
    pub kind: LineKind,
    pub expandable: bool,
    pub open: bool,
    pub cells: Vec<CellValue>,
}

impl StatementRow {
    /// Label with two spaces of indentation per level.
    pub fn indented_label(&self) -> String {
        format!("{}{}", "  ".repeat(self.depth), self.nome)
    }
}

pub struct StatementReport {
    pub title: String,
    pub periods: Vec<String>,
    pub measures: Vec<Measure>,
    pub columns: Vec<StatementColumn>,
    pub rows: Vec<StatementRow>,
    /// No period is filtered out, so the server's `*_total` strings hold.
    pub full_range: bool,
}

impl StatementReport {
    /// More than one measure per period means a second header row is needed.
    pub fn has_sub_columns(&self) -> bool {
        self.measures.len() > 1
    }

    pub fn subtitle(&self, opts: &ReportOptions) -> String {
        format!("{} \u{2014} {}", opts.granularity.label(), opts.year)
    }
}

fn columns_for(periods: &[String], measures: &[Measure]) -> Vec<StatementColumn> {
    let mut columns = Vec::new();
    for p in periods {
        for m in measures {
            columns.push(StatementColumn {
                period: Some(p.clone()),
                measure: *m,
            });
        }
    }
    for m in measures {
        columns.push(StatementColumn {
            period: None,
            measure: *m,
        });
    }
    columns
}

/// Everything needed to compute a row's cells for one filter state.
struct CellContext<'a> {
    opts: &'a ReportOptions,
    periods: &'a [String],
    dynamic_total_base: f64,
    /// The server's `*_total` strings describe the whole range, so they only
    /// apply when no period is filtered out.
    full_range: bool,
}

impl CellContext<'_> {
    fn period_cell(&self, node: &FinancialNode, period: &str, measure: Measure) -> CellValue {
        let g = self.opts.granularity;
        match measure {
            Measure::Real => CellValue::Amount(value(node, g, period)),
            Measure::Budget => CellValue::Amount(budget(node, g, period)),
            Measure::Variance => {
                CellValue::from_pct(variance_pct(value(node, g, period), budget(node, g, period)))
            }
            Measure::Vertical => match self.opts.vertical_base {
                VerticalBase::Server => {
                    CellValue::from_server(node.vertical(g).and_then(|m| m.get(period)))
                }
                VerticalBase::Dynamic => {
                    CellValue::from_pct(share_pct(value(node, g, period), self.dynamic_total_base))
                }
            },
            Measure::Horizontal => {
                CellValue::from_server(node.horizontal(g).and_then(|m| m.get(period)))
            }
        }
    }

    fn total_cell(&self, node: &FinancialNode, measure: Measure) -> CellValue {
        let g = self.opts.granularity;
        match measure {
            Measure::Real => CellValue::Amount(total_values(node, g, self.periods)),
            Measure::Budget => CellValue::Amount(total_budgets(node, g, self.periods)),
            Measure::Variance => CellValue::from_pct(variance_pct(
                total_values(node, g, self.periods),
                total_budgets(node, g, self.periods),
            )),
            Measure::Vertical => match self.opts.vertical_base {
                VerticalBase::Server => self.server_total(node.vertical_total.as_deref()),
                VerticalBase::Dynamic => CellValue::from_pct(share_pct(
                    total_values(node, g, self.periods),
                    self.dynamic_total_base,
                )),
            },
            Measure::Horizontal => self.server_total(node.horizontal_total.as_deref()),
        }
    }

    fn server_total(&self, total: Option<&str>) -> CellValue {
        if self.full_range {
            CellValue::from_server(total)
        } else {
            CellValue::Empty
        }
    }

    fn cells(&self, node: &FinancialNode, columns: &[StatementColumn]) -> Vec<CellValue> {
        columns
            .iter()
            .map(|c| match &c.period {
                Some(p) => self.period_cell(node, p, c.measure),
                None => self.total_cell(node, c.measure),
            })
            .collect()
    }
}

/// Build the pivot for a statement. With `expand` the rows follow the
/// open/closed state; without it every node is included (export and text
/// output).
pub fn build_statement_report(
    statement: &Statement,
    kind: StatementKind,
    opts: &ReportOptions,
    expand: Option<&ExpandState>,
) -> StatementReport {
    let periods = filter_periods(statement, opts.year, opts.granularity);
    let measures = opts.measures();
    let columns = columns_for(&periods, &measures);

    let full_range = periods == filter_periods(statement, YearFilter::All, opts.granularity);
    let ctx = CellContext {
        opts,
        periods: &periods,
        dynamic_total_base: dynamic_vertical_base(statement, opts.granularity, &periods),
        full_range,
    };

    let nodes = match expand {
        Some(state) => state.visible(statement),
        None => statement.walk(),
    };

    let rows = nodes
        .into_iter()
        .map(|node| StatementRow {
            id: node.id.clone(),
            depth: node.id.depth(),
            nome: node.nome.clone(),
            kind: node.tipo.clone(),
            expandable: node.has_children(),
            open: expand.map(|e| e.is_open(&node.id)).unwrap_or(true),
            cells: ctx.cells(node, &columns),
        })
        .collect();

    StatementReport {
        title: kind.title().to_string(),
        periods,
        measures,
        columns,
        rows,
        full_range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PctMap, PeriodMap};

    fn map(entries: &[(&str, f64)]) -> PeriodMap {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn pcts(entries: &[(&str, &str)]) -> PctMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn statement() -> Statement {
        let vendas = FinancialNode {
            tipo: LineKind::Inflow,
            nome: "Vendas".into(),
            valores_mensais: Some(map(&[("2023-12", 10.0), ("2024-01", 100.0), ("2024-02", 50.0)])),
            orcamentos_mensais: Some(map(&[("2024-01", 80.0)])),
            vertical_mensais: Some(pcts(&[("2024-01", "62.5%")])),
            vertical_total: Some("55.0%".into()),
            ..Default::default()
        };
        let receitas = FinancialNode {
            tipo: LineKind::Inflow,
            nome: "Receitas".into(),
            valores_mensais: Some(map(&[("2023-12", 10.0), ("2024-01", 100.0), ("2024-02", 50.0)])),
            classificacoes: vec![vendas],
            ..Default::default()
        };
        let despesas = FinancialNode {
            tipo: LineKind::Outflow,
            nome: "Despesas".into(),
            valores_mensais: Some(map(&[("2024-01", -60.0), ("2024-02", -90.0)])),
            ..Default::default()
        };
        Statement::new(
            vec!["2023-12".into(), "2024-01".into(), "2024-02".into()],
            vec![],
            vec![2023, 2024],
            vec![receitas, despesas],
        )
    }

    fn opts_2024() -> ReportOptions {
        ReportOptions::new(Granularity::Month, YearFilter::Year(2024))
    }

    fn total_real(report: &StatementReport, row: usize) -> CellValue {
        let idx = report
            .columns
            .iter()
            .position(|c| c.period.is_none() && c.measure == Measure::Real)
            .unwrap();
        report.rows[row].cells[idx].clone()
    }

    #[test]
    fn test_columns_are_periods_then_total() {
        let report = build_statement_report(&statement(), StatementKind::Dre, &opts_2024(), None);
        assert_eq!(report.periods, vec!["2024-01", "2024-02"]);
        assert_eq!(report.columns.len(), 3);
        assert!(report.columns[2].period.is_none());
        assert!(!report.has_sub_columns());
    }

    #[test]
    fn test_total_follows_year_filter() {
        let s = statement();
        let r2024 = build_statement_report(&s, StatementKind::Dre, &opts_2024(), None);
        assert_eq!(total_real(&r2024, 0), CellValue::Amount(150.0));

        let all = ReportOptions::new(Granularity::Month, YearFilter::All);
        let rall = build_statement_report(&s, StatementKind::Dre, &all, None);
        assert_eq!(total_real(&rall, 0), CellValue::Amount(160.0));
    }

    #[test]
    fn test_budget_toggle_does_not_change_total() {
        let s = statement();
        let plain = build_statement_report(&s, StatementKind::Dre, &opts_2024(), None);
        let mut with_budget = opts_2024();
        with_budget.show_budget = true;
        with_budget.show_variance = true;
        let budgeted = build_statement_report(&s, StatementKind::Dre, &with_budget, None);
        assert_eq!(total_real(&plain, 0), total_real(&budgeted, 0));
        assert!(budgeted.has_sub_columns());
    }

    #[test]
    fn test_variance_blank_without_budget() {
        let s = statement();
        let mut opts = opts_2024();
        opts.show_budget = true;
        opts.show_variance = true;
        let report = build_statement_report(&s, StatementKind::Dre, &opts, None);
        // Columns: [01 Real, 01 Orçado, 01 Var, 02 Real, 02 Orçado, 02 Var, T Real, T Orçado, T Var]
        let vendas = &report.rows[1];
        assert_eq!(vendas.nome, "Vendas");
        assert_eq!(vendas.cells[2], CellValue::Pct(25.0));
        assert_eq!(vendas.cells[5], CellValue::Empty);
        let despesas = &report.rows[2];
        assert_eq!(despesas.cells[8], CellValue::Empty);
    }

    #[test]
    fn test_server_and_dynamic_vertical_bases_differ() {
        let s = statement();
        let mut opts = ReportOptions::new(Granularity::Month, YearFilter::All);
        opts.show_vertical = true;
        let server = build_statement_report(&s, StatementKind::Dre, &opts, None);
        // Columns: [12 Real, 12 AV, 01 Real, 01 AV, 02 Real, 02 AV, T Real, T AV]
        let vendas = &server.rows[1];
        assert_eq!(vendas.cells[3], CellValue::ServerPct("62.5%".into()));
        assert_eq!(vendas.cells[5], CellValue::Empty);
        assert_eq!(vendas.cells[7], CellValue::ServerPct("55.0%".into()));

        opts.vertical_base = VerticalBase::Dynamic;
        let dynamic = build_statement_report(&s, StatementKind::Dre, &opts, None);
        let vendas = &dynamic.rows[1];
        // one base for every column: |160| + |-150| = 310
        assert_eq!(vendas.cells[3], CellValue::Pct(100.0 / 310.0 * 100.0));
        assert_eq!(vendas.cells[5], CellValue::Pct(50.0 / 310.0 * 100.0));
        assert_eq!(vendas.cells[7], CellValue::Pct(160.0 / 310.0 * 100.0));
    }

    #[test]
    fn test_dynamic_base_is_shared_by_period_and_total_columns() {
        let s = statement();
        let mut opts = opts_2024();
        opts.show_vertical = true;
        opts.vertical_base = VerticalBase::Dynamic;
        let report = build_statement_report(&s, StatementKind::Dre, &opts, None);
        // Columns: [01 Real, 01 AV, 02 Real, 02 AV, T Real, T AV]
        // base for the filtered range: |150| + |-150| = 300
        let vendas = &report.rows[1];
        assert_eq!(vendas.cells[1], CellValue::Pct(100.0 / 300.0 * 100.0));
        assert_eq!(vendas.cells[3], CellValue::Pct(50.0 / 300.0 * 100.0));
        assert_eq!(vendas.cells[5], CellValue::Pct(50.0));
    }

    #[test]
    fn test_server_totals_blank_when_year_filter_narrows_range() {
        let s = statement();
        let mut opts = opts_2024();
        opts.show_vertical = true;
        opts.show_horizontal = true;
        let report = build_statement_report(&s, StatementKind::Dre, &opts, None);
        // Columns: [01 Real, 01 AV, 01 AH, 02 Real, 02 AV, 02 AH, T Real, T AV, T AH]
        let vendas = &report.rows[1];
        assert_eq!(vendas.cells[1], CellValue::ServerPct("62.5%".into()));
        assert_eq!(vendas.cells[6], CellValue::Amount(150.0));
        assert_eq!(vendas.cells[7], CellValue::Empty);
        assert_eq!(vendas.cells[8], CellValue::Empty);
    }

    #[test]
    fn test_expand_state_limits_rows_but_export_walk_does_not() {
        let s = statement();
        let state = ExpandState::new();
        let visible = build_statement_report(&s, StatementKind::Dre, &opts_2024(), Some(&state));
        assert_eq!(visible.rows.len(), 2);
        assert!(visible.rows[0].expandable);
        assert!(!visible.rows[0].open);

        let full = build_statement_report(&s, StatementKind::Dre, &opts_2024(), None);
        assert_eq!(full.rows.len(), 3);
        assert_eq!(full.rows[1].indented_label(), "  Vendas");
    }

    #[test]
    fn test_year_granularity_with_dot_zero_keys() {
        let node = FinancialNode {
            nome: "Caixa".into(),
            valores_anuais: Some(map(&[("2024.0", 500.0), ("2023.0", 100.0)])),
            ..Default::default()
        };
        let s = Statement::new(vec![], vec![], vec![2023, 2024], vec![node]);
        let opts = ReportOptions::new(Granularity::Year, YearFilter::All);
        let report = build_statement_report(&s, StatementKind::Dfc, &opts, None);
        assert_eq!(report.periods, vec!["2023", "2024"]);
        assert_eq!(report.rows[0].cells, vec![
            CellValue::Amount(100.0),
            CellValue::Amount(500.0),
            CellValue::Amount(600.0),
        ]);
    }
}
