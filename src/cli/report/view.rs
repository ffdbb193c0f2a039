use std::path::PathBuf;
use std::sync::Arc;

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};
use tracing::warn;

use crate::aggregate::{total_values, variance_favorable};
use crate::charts::{mom_bars, net_bars, net_movement, sorted_mom, step_selection, ChartBar, NetMovementPoint};
use crate::cli::{parse_month_opt, AppContext, ReportCommands};
use crate::client::ReportSource;
use crate::error::Result;
use crate::expand::ExpandState;
use crate::fmt::{money, month_short, number, pct, pct_opt};
use crate::loader::Loader;
use crate::models::{MomItem, MomSeries, Statement, StatementKind};
use crate::periods::available_years;
use crate::reports::{build_statement_report, CellValue, Measure, ReportOptions, StatementReport, StatementRow};
use crate::tui::{
    money_span, run_report_view, wrap_text, ReportView, ReportViewAction, AMOUNT_NEG_STYLE, AMOUNT_POS_STYLE,
    ERROR_STYLE, FOOTER_STYLE, HEADER_STYLE, HIGHLIGHT_BAR_STYLE, SELECTED_STYLE,
};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Dispatch a report command to an interactive ratatui view.
pub fn dispatch(ctx: &AppContext, cmd: ReportCommands) -> Result<()> {
    let mut view = build_view(ctx, &cmd)?;
    run_report_view(view.as_mut())
}

/// Build a report view from a command. Used by both CLI dispatch and dashboard.
pub(crate) fn build_view(ctx: &AppContext, cmd: &ReportCommands) -> Result<Box<dyn ReportView>> {
    match cmd {
        ReportCommands::Dfc { filters, .. } => {
            let opts = filters.options(StatementKind::Dfc)?;
            Ok(Box::new(StatementView::new(ctx, StatementKind::Dfc, opts)))
        }
        ReportCommands::Dre { filters, .. } => {
            let opts = filters.options(StatementKind::Dre)?;
            Ok(Box::new(StatementView::new(ctx, StatementKind::Dre, opts)))
        }
        ReportCommands::Mom { series, month, .. } => {
            let selected = parse_month_opt(month)?;
            Ok(Box::new(MomChartView::new(ctx.source.clone(), *series, selected)))
        }
        ReportCommands::Net { month, .. } => {
            let selected = parse_month_opt(month)?;
            Ok(Box::new(NetMovementView::new(ctx.source.clone(), selected)))
        }
    }
}

const BOLD: Style = Style::new().add_modifier(Modifier::BOLD);
const HEADER_ROW_STYLE: Style = Style::new()
    .fg(ratatui::style::Color::DarkGray)
    .add_modifier(Modifier::BOLD);

const LABEL_WIDTH: u16 = 34;
const VALUE_WIDTH: u16 = 13;
const COLUMN_SPACING: u16 = 1;

fn separator(frame: &mut Frame, area: Rect) {
    frame.render_widget(
        Paragraph::new("━".repeat(area.width as usize)).style(FOOTER_STYLE),
        area,
    );
}

fn render_error(frame: &mut Frame, area: Rect, message: &str) {
    let (wrapped, _) = wrap_text(&format!("Erro: {message}"), area.width.saturating_sub(2) as usize);
    frame.render_widget(
        Paragraph::new(wrapped).style(ERROR_STYLE).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_loading(frame: &mut Frame, area: Rect) {
    frame.render_widget(Paragraph::new(" Carregando\u{2026}").style(FOOTER_STYLE), area);
}

// ---------------------------------------------------------------------------
// Statement view (DFC / DRE)
// ---------------------------------------------------------------------------

pub(crate) struct StatementView {
    kind: StatementKind,
    source: Arc<dyn ReportSource>,
    export_dir: PathBuf,
    loader: Loader<Statement>,
    statement: Option<Statement>,
    error: Option<String>,
    opts: ReportOptions,
    expand: ExpandState,
    selected: usize,
    offset: usize,
    col_offset: usize,
    visible_count: usize,
    status: Option<String>,
}

impl StatementView {
    pub(crate) fn new(ctx: &AppContext, kind: StatementKind, opts: ReportOptions) -> Self {
        let mut view = Self {
            kind,
            source: ctx.source.clone(),
            export_dir: ctx.settings.export_path(),
            loader: Loader::new(),
            statement: None,
            error: None,
            opts,
            expand: ExpandState::new(),
            selected: 0,
            offset: 0,
            col_offset: 0,
            visible_count: 20,
            status: None,
        };
        view.reload();
        view
    }

    fn reload(&mut self) {
        let source = self.source.clone();
        let kind = self.kind;
        self.error = None;
        self.loader.start(move || source.statement(kind));
    }

    fn accept(&mut self, result: Result<Statement>) {
        match result {
            Ok(statement) => {
                self.statement = Some(statement);
                self.error = None;
                self.clamp_selection();
            }
            Err(e) => {
                warn!(kind = self.kind.slug(), error = %e, "statement fetch failed");
                self.statement = None;
                self.error = Some(e.to_string());
            }
        }
    }

    fn report(&self) -> Option<StatementReport> {
        self.statement
            .as_ref()
            .map(|s| build_statement_report(s, self.kind, &self.opts, Some(&self.expand)))
    }

    fn row_count(&self) -> usize {
        self.statement
            .as_ref()
            .map(|s| self.expand.visible(s).len())
            .unwrap_or(0)
    }

    fn clamp_selection(&mut self) {
        let n = self.row_count();
        self.selected = self.selected.min(n.saturating_sub(1));
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + self.visible_count {
            self.offset = self.selected + 1 - self.visible_count;
        }
    }

    fn move_selection(&mut self, delta: i64) {
        let next = (self.selected as i64 + delta).max(0) as usize;
        self.selected = next;
        self.clamp_selection();
    }

    fn toggle_selected(&mut self) {
        let Some(statement) = &self.statement else { return };
        if let Some(node) = self.expand.visible(statement).get(self.selected) {
            if node.has_children() {
                let id = node.id.clone();
                self.expand.toggle(&id);
            }
        }
    }

    fn set_all(&mut self, open: bool) {
        if let Some(statement) = &self.statement {
            if open {
                self.expand.expand_all(statement);
            } else {
                self.expand.collapse_all(statement);
            }
        }
        self.clamp_selection();
    }

    fn cycle_year(&mut self, delta: i32) {
        let years = self.statement.as_ref().map(available_years).unwrap_or_default();
        self.opts.year = self.opts.year.cycle(&years, delta);
        self.col_offset = 0;
    }

    /// Flip one optional measure; the column count changes, so keep the
    /// horizontal scroll inside the new table.
    fn toggle_measure(&mut self, flag: fn(&mut ReportOptions) -> &mut bool) {
        let on = flag(&mut self.opts);
        *on = !*on;
        self.scroll_columns(0);
    }

    fn scroll_columns(&mut self, delta: i64) {
        let max = self.report().map(|r| r.columns.len()).unwrap_or(0).saturating_sub(1);
        self.col_offset = ((self.col_offset as i64 + delta).max(0) as usize).min(max);
    }

    #[cfg(feature = "xlsx")]
    fn export(&mut self) {
        let Some(statement) = &self.statement else {
            self.status = Some("Nada para exportar ainda.".into());
            return;
        };
        let path = crate::cli::export::default_path(&self.export_dir, self.kind);
        self.status = Some(
            match crate::cli::export::write_statement(statement, self.kind, &self.opts, &path) {
                Ok(p) => format!("Exportado para {}", p.display()),
                Err(e) => format!("Falha na exportação: {e}"),
            },
        );
    }

    #[cfg(not(feature = "xlsx"))]
    fn export(&mut self) {
        let _ = &self.export_dir;
        self.status = Some("Exportação xlsx indisponível neste build.".into());
    }

    fn header_row(report: &StatementReport, columns: &[usize]) -> Row<'static> {
        let two_lines = report.has_sub_columns();
        let mut cells = vec![Cell::from("Conta")];
        for &i in columns {
            let col = &report.columns[i];
            let period = col.period.clone().unwrap_or_else(|| "Total".to_string());
            let text = if two_lines {
                Text::from(vec![Line::from(period), Line::from(col.measure.header())])
            } else {
                Text::from(period)
            };
            cells.push(Cell::from(text.right_aligned()));
        }
        Row::new(cells)
            .style(HEADER_ROW_STYLE)
            .height(if two_lines { 2 } else { 1 })
            .bottom_margin(1)
    }

    fn value_cell(value: &CellValue, measure: Measure, row: &StatementRow) -> Cell<'static> {
        let span = match value {
            CellValue::Amount(v) => {
                let style = if *v < 0.0 { AMOUNT_NEG_STYLE } else { AMOUNT_POS_STYLE };
                Span::styled(number(*v), style)
            }
            CellValue::Pct(p) if measure == Measure::Variance => {
                let style = if variance_favorable(&row.kind, *p) {
                    AMOUNT_POS_STYLE
                } else {
                    AMOUNT_NEG_STYLE
                };
                Span::styled(pct(*p), style)
            }
            CellValue::Pct(p) => Span::raw(pct(*p)),
            CellValue::ServerPct(s) => Span::raw(s.clone()),
            CellValue::Empty => Span::raw(""),
        };
        Cell::from(Line::from(span).right_aligned())
    }

    fn label_cell(row: &StatementRow) -> Cell<'static> {
        let marker = match (row.expandable, row.open) {
            (true, true) => "\u{25be} ",
            (true, false) => "\u{25b8} ",
            _ => "  ",
        };
        let text = format!("{}{marker}{}", "  ".repeat(row.depth), row.nome);
        if row.depth == 0 {
            Cell::from(Span::styled(text, BOLD))
        } else {
            Cell::from(text)
        }
    }

    /// Server totals for the selected line, shown under the table.
    fn detail_line(&self, report: &StatementReport) -> Line<'static> {
        let (Some(statement), Some(row)) = (&self.statement, report.rows.get(self.selected)) else {
            return Line::default();
        };
        let Some(node) = statement.find(&row.id) else {
            return Line::default();
        };
        let total = total_values(node, self.opts.granularity, &report.periods);
        let mut spans = vec![Span::styled(format!(" {}: ", node.nome), BOLD), money_span(total)];
        // Server totals cover every period; hide them under a narrower filter.
        if report.full_range {
            let extras = [
                ("AV", &node.vertical_total),
                ("AH", &node.horizontal_total),
                ("AV orç.", &node.vertical_orcamentos_total),
                ("AH orç.", &node.horizontal_orcamentos_total),
            ];
            for (label, value) in extras {
                if let Some(v) = value {
                    spans.push(Span::raw(format!("  {label} {v}")));
                }
            }
        }
        Line::from(spans)
    }

    fn flags_label(&self) -> String {
        let on = |b: bool| if b { "on" } else { "off" };
        format!(
            "orç {}  var {}  AV {} ({:?})  AH {}",
            on(self.opts.show_budget),
            on(self.opts.show_variance),
            on(self.opts.show_vertical),
            self.opts.vertical_base,
            on(self.opts.show_horizontal),
        )
    }
}

impl ReportView for StatementView {
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [header_area, sep_area, content_area, detail_area, status_area, footer_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .areas(area);

        frame.render_widget(
            Paragraph::new(format!(
                " {} \u{2014} {} \u{2014} {}",
                self.kind.title(),
                self.opts.granularity.label(),
                self.opts.year
            ))
            .style(HEADER_STYLE),
            header_area,
        );
        separator(frame, sep_area);

        if let Some(err) = &self.error {
            render_error(frame, content_area, err);
        } else if let Some(report) = self.report() {
            let header_height: u16 = if report.has_sub_columns() { 3 } else { 2 };
            self.visible_count = (content_area.height.saturating_sub(header_height) as usize).max(1);
            self.clamp_selection();

            let room = content_area.width.saturating_sub(LABEL_WIDTH + COLUMN_SPACING);
            let fit = (room / (VALUE_WIDTH + COLUMN_SPACING)).max(1) as usize;
            let columns: Vec<usize> = (self.col_offset..report.columns.len()).take(fit).collect();

            let mut widths = vec![Constraint::Length(LABEL_WIDTH)];
            widths.extend(columns.iter().map(|_| Constraint::Length(VALUE_WIDTH)));

            let rows: Vec<Row> = report
                .rows
                .iter()
                .enumerate()
                .skip(self.offset)
                .take(self.visible_count)
                .map(|(i, row)| {
                    let mut cells = vec![Self::label_cell(row)];
                    for &c in &columns {
                        cells.push(Self::value_cell(&row.cells[c], report.columns[c].measure, row));
                    }
                    let r = Row::new(cells);
                    if i == self.selected {
                        r.style(SELECTED_STYLE)
                    } else {
                        r
                    }
                })
                .collect();

            let table = Table::new(rows, widths)
                .header(Self::header_row(&report, &columns))
                .column_spacing(COLUMN_SPACING);
            frame.render_widget(table, content_area);

            frame.render_widget(
                Paragraph::new(self.detail_line(&report)),
                detail_area,
            );
        } else {
            render_loading(frame, content_area);
        }

        let status = match &self.status {
            Some(s) => format!(" {s}"),
            None if self.loader.is_pending() && self.statement.is_some() => {
                " Atualizando\u{2026}".to_string()
            }
            None => format!(" {}", self.flags_label()),
        };
        frame.render_widget(Paragraph::new(status).style(FOOTER_STYLE), status_area);
        frame.render_widget(
            Paragraph::new(
                " \u{2191}/\u{2193}=select  Enter=abrir/fechar  e/c=expandir/recolher  \
                 \u{2190}/\u{2192}=ano  [/]=colunas  g=período  b/v/a/h=colunas extra  \
                 x=exportar  r=recarregar  q=sair",
            )
            .style(FOOTER_STYLE),
            footer_area,
        );
    }

    fn handle_key(&mut self, code: KeyCode) -> ReportViewAction {
        self.status = None;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.loader.cancel();
                return ReportViewAction::Close;
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-(self.visible_count as i64)),
            KeyCode::PageDown => self.move_selection(self.visible_count as i64),
            KeyCode::Home => self.move_selection(i64::MIN / 2),
            KeyCode::End => self.move_selection(i64::MAX / 2),
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('e') => self.set_all(true),
            KeyCode::Char('c') => self.set_all(false),
            KeyCode::Left => self.cycle_year(-1),
            KeyCode::Right => self.cycle_year(1),
            KeyCode::Char('[') => self.scroll_columns(-1),
            KeyCode::Char(']') => self.scroll_columns(1),
            KeyCode::Char('g') => {
                self.opts.granularity = self.opts.granularity.next();
                self.col_offset = 0;
            }
            KeyCode::Char('b') => self.toggle_measure(|o| &mut o.show_budget),
            KeyCode::Char('v') => self.toggle_measure(|o| &mut o.show_variance),
            KeyCode::Char('a') => self.toggle_measure(|o| &mut o.show_vertical),
            KeyCode::Char('h') => self.toggle_measure(|o| &mut o.show_horizontal),
            KeyCode::Char('x') => self.export(),
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
        ReportViewAction::Continue
    }

    fn tick(&mut self) {
        if let Some(result) = self.loader.poll() {
            self.accept(result);
        }
    }
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

const BAR_WIDTH: u16 = 7;
const BAR_GAP: u16 = 1;

/// Window of bars that fits `width`, keeping the selected bar in view.
fn visible_bars(bars: &[ChartBar], width: u16) -> &[ChartBar] {
    let fit = ((width / (BAR_WIDTH + BAR_GAP)).max(1) as usize).min(bars.len());
    let end = bars
        .iter()
        .position(|b| b.highlighted)
        .map(|i| (i + 1).max(fit))
        .unwrap_or(bars.len());
    &bars[end - fit..end]
}

fn render_bars(frame: &mut Frame, area: Rect, title: &str, bars: &[ChartBar]) {
    let shown = visible_bars(bars, area.width);
    let data: Vec<Bar> = shown
        .iter()
        .map(|b| {
            let style = if b.highlighted {
                HIGHLIGHT_BAR_STYLE
            } else if b.is_negative() {
                AMOUNT_NEG_STYLE
            } else {
                AMOUNT_POS_STYLE
            };
            Bar::default()
                .value(b.magnitude())
                .label(Line::from(month_short(&b.label)))
                .text_value(compact(b.value))
                .style(style)
        })
        .collect();
    let chart = BarChart::default()
        .block(Block::default().title(title.to_string()).title_style(BOLD))
        .data(BarGroup::default().bars(&data))
        .bar_width(BAR_WIDTH)
        .bar_gap(BAR_GAP);
    frame.render_widget(chart, area);
}

/// Short value for bar tops: 1234567 → `1,2M`, 15300 → `15,3k`.
fn compact(val: f64) -> String {
    let abs = val.abs();
    let sign = if val < 0.0 { "-" } else { "" };
    let s = if abs >= 1_000_000.0 {
        format!("{:.1}M", abs / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.1}k", abs / 1_000.0)
    } else {
        format!("{abs:.0}")
    };
    format!("{sign}{}", s.replace('.', ","))
}

fn chart_layout(area: Rect) -> [Rect; 5] {
    Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area)
}

const CHART_HINTS: &str = " \u{2190}/\u{2192}=mês  r=recarregar  q/Esc=sair";

pub(crate) struct MomChartView {
    series: MomSeries,
    source: Arc<dyn ReportSource>,
    loader: Loader<Vec<MomItem>>,
    items: Option<Vec<MomItem>>,
    error: Option<String>,
    selected: Option<String>,
}

impl MomChartView {
    pub(crate) fn new(source: Arc<dyn ReportSource>, series: MomSeries, selected: Option<String>) -> Self {
        let mut view = Self {
            series,
            source,
            loader: Loader::new(),
            items: None,
            error: None,
            selected,
        };
        view.reload();
        view
    }

    fn reload(&mut self) {
        let source = self.source.clone();
        let series = self.series;
        self.error = None;
        self.loader.start(move || source.mom(series));
    }

    fn accept(&mut self, result: Result<Vec<MomItem>>) {
        match result {
            Ok(items) => {
                let labels = month_labels(&items);
                if self.selected.as_ref().map_or(true, |s| !labels.contains(s)) {
                    self.selected = labels.last().cloned();
                }
                self.items = Some(items);
            }
            Err(e) => {
                warn!(series = self.series.title(), error = %e, "series fetch failed");
                self.items = None;
                self.error = Some(e.to_string());
            }
        }
    }

    fn detail_line(&self) -> String {
        let Some(items) = &self.items else { return String::new() };
        let Some(item) = self
            .selected
            .as_deref()
            .and_then(|s| items.iter().find(|i| i.mes == s))
        else {
            return String::new();
        };
        let opt = |v: Option<f64>| v.map(money).unwrap_or_else(|| "\u{2014}".to_string());
        format!(
            " {}  atual {}  anterior {}  \u{0394} {}  \u{0394}% {}",
            month_short(&item.mes),
            opt(item.valor_atual),
            opt(item.valor_anterior),
            opt(item.variacao_absoluta),
            pct_opt(item.variacao_percentual),
        )
    }
}

fn month_labels(items: &[MomItem]) -> Vec<String> {
    sorted_mom(items).into_iter().map(|i| i.mes).collect()
}

impl ReportView for MomChartView {
    fn draw(&mut self, frame: &mut Frame) {
        let [header_area, sep_area, chart_area, detail_area, footer_area] = chart_layout(frame.area());
        frame.render_widget(
            Paragraph::new(format!(" {} \u{2014} mês a mês", self.series.title())).style(HEADER_STYLE),
            header_area,
        );
        separator(frame, sep_area);

        if let Some(err) = &self.error {
            render_error(frame, chart_area, err);
        } else if let Some(items) = &self.items {
            let bars = mom_bars(items, self.selected.as_deref());
            render_bars(frame, chart_area, "Valor atual", &bars);
            frame.render_widget(Paragraph::new(self.detail_line()).style(BOLD), detail_area);
        } else {
            render_loading(frame, chart_area);
        }
        frame.render_widget(Paragraph::new(CHART_HINTS).style(FOOTER_STYLE), footer_area);
    }

    fn handle_key(&mut self, code: KeyCode) -> ReportViewAction {
        let labels = self.items.as_deref().map(month_labels).unwrap_or_default();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.loader.cancel();
                return ReportViewAction::Close;
            }
            KeyCode::Left => self.selected = step_selection(&labels, self.selected.as_deref(), -1),
            KeyCode::Right => self.selected = step_selection(&labels, self.selected.as_deref(), 1),
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
        ReportViewAction::Continue
    }

    fn tick(&mut self) {
        if let Some(result) = self.loader.poll() {
            self.accept(result);
        }
    }
}

type NetSeries = (Vec<MomItem>, Vec<MomItem>, Vec<MomItem>);

pub(crate) struct NetMovementView {
    source: Arc<dyn ReportSource>,
    loader: Loader<NetSeries>,
    points: Option<Vec<NetMovementPoint>>,
    error: Option<String>,
    selected: Option<String>,
}

impl NetMovementView {
    pub(crate) fn new(source: Arc<dyn ReportSource>, selected: Option<String>) -> Self {
        let mut view = Self {
            source,
            loader: Loader::new(),
            points: None,
            error: None,
            selected,
        };
        view.reload();
        view
    }

    fn reload(&mut self) {
        let source = self.source.clone();
        self.error = None;
        self.loader.start(move || {
            Ok((
                source.mom(MomSeries::Receber)?,
                source.mom(MomSeries::Pagar)?,
                source.mom(MomSeries::Movimentacoes)?,
            ))
        });
    }

    fn accept(&mut self, result: Result<NetSeries>) {
        match result {
            Ok((receber, pagar, movimentacoes)) => {
                let points = net_movement(&receber, &pagar, &movimentacoes);
                if self
                    .selected
                    .as_ref()
                    .map_or(true, |s| !points.iter().any(|p| &p.mes == s))
                {
                    self.selected = points.last().map(|p| p.mes.clone());
                }
                self.points = Some(points);
            }
            Err(e) => {
                warn!(error = %e, "net movement fetch failed");
                self.points = None;
                self.error = Some(e.to_string());
            }
        }
    }

    fn detail_line(&self) -> String {
        let Some(p) = self
            .points
            .as_ref()
            .zip(self.selected.as_deref())
            .and_then(|(points, s)| points.iter().find(|p| p.mes == s))
        else {
            return String::new();
        };
        let mov = p.movimentacoes.map(money).unwrap_or_else(|| "\u{2014}".to_string());
        format!(
            " {}  receber {}  pagar {}  líquido {}  movimentações {mov}",
            month_short(&p.mes),
            money(p.receber),
            money(p.pagar),
            money(p.net),
        )
    }
}

impl ReportView for NetMovementView {
    fn draw(&mut self, frame: &mut Frame) {
        let [header_area, sep_area, chart_area, detail_area, footer_area] = chart_layout(frame.area());
        frame.render_widget(
            Paragraph::new(" Movimento Líquido \u{2014} receber menos pagar").style(HEADER_STYLE),
            header_area,
        );
        separator(frame, sep_area);

        if let Some(err) = &self.error {
            render_error(frame, chart_area, err);
        } else if let Some(points) = &self.points {
            let bars = net_bars(points, self.selected.as_deref());
            render_bars(frame, chart_area, "Líquido", &bars);
            frame.render_widget(Paragraph::new(self.detail_line()).style(BOLD), detail_area);
        } else {
            render_loading(frame, chart_area);
        }
        frame.render_widget(Paragraph::new(CHART_HINTS).style(FOOTER_STYLE), footer_area);
    }

    fn handle_key(&mut self, code: KeyCode) -> ReportViewAction {
        let labels: Vec<String> = self
            .points
            .as_deref()
            .map(|ps| ps.iter().map(|p| p.mes.clone()).collect())
            .unwrap_or_default();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.loader.cancel();
                return ReportViewAction::Close;
            }
            KeyCode::Left => self.selected = step_selection(&labels, self.selected.as_deref(), -1),
            KeyCode::Right => self.selected = step_selection(&labels, self.selected.as_deref(), 1),
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
        ReportViewAction::Continue
    }

    fn tick(&mut self) {
        if let Some(result) = self.loader.poll() {
            self.accept(result);
        }
    }
}
