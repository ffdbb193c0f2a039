use colored::{ColoredString, Colorize};
use comfy_table::{Cell, CellAlignment, Table};

use crate::aggregate::variance_favorable;
use crate::charts::{net_movement, sorted_mom, NetMovementPoint};
use crate::client::ReportSource;
use crate::error::Result;
use crate::fmt::{money, pct, pct_opt};
use crate::models::{LineKind, MomItem, MomSeries, StatementKind};
use crate::reports::{build_statement_report, CellValue, Measure, ReportOptions, StatementReport};

// ---------------------------------------------------------------------------
// Data-fetching + formatting wrappers (used by dispatch)
// ---------------------------------------------------------------------------

pub fn statement(source: &dyn ReportSource, kind: StatementKind, opts: &ReportOptions) -> Result<String> {
    let data = source.statement(kind)?;
    let report = build_statement_report(&data, kind, opts, None);
    Ok(format_statement(&report, &report.subtitle(opts)))
}

pub fn mom(source: &dyn ReportSource, series: MomSeries, month: Option<&str>) -> Result<String> {
    let items = source.mom(series)?;
    Ok(format_mom(series.title(), &items, month))
}

pub fn net(source: &dyn ReportSource, month: Option<&str>) -> Result<String> {
    let receber = source.mom(MomSeries::Receber)?;
    let pagar = source.mom(MomSeries::Pagar)?;
    let movimentacoes = source.mom(MomSeries::Movimentacoes)?;
    let points = net_movement(&receber, &pagar, &movimentacoes);
    Ok(format_net(&points, month))
}

// ---------------------------------------------------------------------------
// Pure formatting functions (report data → String)
// ---------------------------------------------------------------------------

fn signed(amount: f64) -> ColoredString {
    if amount < 0.0 {
        money(amount).red()
    } else {
        money(amount).green()
    }
}

fn cell_text(value: &CellValue, measure: Measure, kind: &LineKind) -> ColoredString {
    match value {
        CellValue::Amount(v) => signed(*v),
        CellValue::Pct(p) if measure == Measure::Variance => {
            if variance_favorable(kind, *p) {
                pct(*p).green()
            } else {
                pct(*p).red()
            }
        }
        CellValue::Pct(p) => pct(*p).normal(),
        CellValue::ServerPct(s) => s.as_str().normal(),
        CellValue::Empty => "".normal(),
    }
}

fn right(content: impl std::fmt::Display) -> Cell {
    Cell::new(content).set_alignment(CellAlignment::Right)
}

pub fn format_statement(report: &StatementReport, subtitle: &str) -> String {
    let mut table = Table::new();

    let mut header = vec![Cell::new("Conta")];
    for col in &report.columns {
        let period = col.period.as_deref().unwrap_or("Total");
        let label = if report.has_sub_columns() {
            format!("{period}\n{}", col.measure.header())
        } else {
            period.to_string()
        };
        header.push(right(label));
    }
    table.set_header(header);

    for row in &report.rows {
        let label = if row.depth == 0 {
            row.indented_label().bold()
        } else {
            row.indented_label().normal()
        };
        let mut cells = vec![Cell::new(label)];
        for (col, value) in report.columns.iter().zip(&row.cells) {
            cells.push(right(cell_text(value, col.measure, &row.kind)));
        }
        table.add_row(cells);
    }

    if report.rows.is_empty() {
        return format!("{}\n{subtitle}\n\nNenhum dado.", report.title);
    }
    format!("{}\n{subtitle}\n{table}", report.title)
}

fn marker(selected: Option<&str>, mes: &str) -> &'static str {
    if selected == Some(mes) {
        "\u{25b8} "
    } else {
        "  "
    }
}

pub fn format_mom(title: &str, items: &[MomItem], selected: Option<&str>) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Mês", "Atual", "Anterior", "Variação", "Var %"]);
    for item in sorted_mom(items) {
        let opt_money = |v: Option<f64>| v.map(signed).unwrap_or_else(|| "".normal());
        table.add_row(vec![
            Cell::new(format!("{}{}", marker(selected, &item.mes), item.mes)),
            right(opt_money(item.valor_atual)),
            right(opt_money(item.valor_anterior)),
            right(opt_money(item.variacao_absoluta)),
            right(pct_opt(item.variacao_percentual)),
        ]);
    }
    if items.is_empty() {
        return format!("{title}\n\nNenhum dado.");
    }
    format!("{title}\n{table}")
}

pub fn format_net(points: &[NetMovementPoint], selected: Option<&str>) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Mês", "A receber", "A pagar", "Líquido", "Movimentações"]);
    for p in points {
        let net = if p.net >= 0.0 {
            money(p.net).green().bold()
        } else {
            money(p.net).red().bold()
        };
        table.add_row(vec![
            Cell::new(format!("{}{}", marker(selected, &p.mes), p.mes)),
            right(money(p.receber)),
            right(money(p.pagar)),
            right(net),
            right(p.movimentacoes.map(money).unwrap_or_default()),
        ]);
    }
    if points.is_empty() {
        return "Movimento Líquido\n\nNenhum dado.".to_string();
    }
    format!("Movimento Líquido\n{table}")
}
