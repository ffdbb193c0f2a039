use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::cli::default_vertical_base;
use crate::cli::report::view::{MomChartView, NetMovementView, StatementView};
use crate::cli::AppContext;
use crate::error::Result;
use crate::models::{Granularity, MomSeries, StatementKind};
use crate::periods::YearFilter;
use crate::reports::ReportOptions;
use crate::tui::{run_report_view, ReportView, ReportViewAction, FOOTER_STYLE, HEADER_STYLE, SELECTED_STYLE};

#[derive(Clone, Copy, Debug, PartialEq)]
enum MenuItem {
    Statement(StatementKind),
    Mom(MomSeries),
    Net,
}

const MENU_ITEMS: &[MenuItem] = &[
    MenuItem::Statement(StatementKind::Dfc),
    MenuItem::Statement(StatementKind::Dre),
    MenuItem::Mom(MomSeries::Receber),
    MenuItem::Mom(MomSeries::Pagar),
    MenuItem::Mom(MomSeries::Movimentacoes),
    MenuItem::Net,
];

impl MenuItem {
    fn label(self) -> &'static str {
        match self {
            MenuItem::Statement(kind) => kind.title(),
            MenuItem::Mom(series) => series.title(),
            MenuItem::Net => "Movimento Líquido",
        }
    }
}

enum DashboardScreen {
    Home,
    ReportView(Box<dyn ReportView>),
}

struct Dashboard {
    ctx: AppContext,
    screen: DashboardScreen,
    menu_selection: usize,
}

impl Dashboard {
    fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            screen: DashboardScreen::Home,
            menu_selection: 0,
        }
    }

    fn open(&self, item: MenuItem) -> Box<dyn ReportView> {
        match item {
            MenuItem::Statement(kind) => {
                let mut opts = ReportOptions::new(Granularity::Month, YearFilter::All);
                opts.vertical_base = default_vertical_base(kind);
                Box::new(StatementView::new(&self.ctx, kind, opts))
            }
            MenuItem::Mom(series) => Box::new(MomChartView::new(self.ctx.source.clone(), series, None)),
            MenuItem::Net => Box::new(NetMovementView::new(self.ctx.source.clone(), None)),
        }
    }

    fn draw_home(&self, frame: &mut Frame) {
        let [header_area, api_area, menu_area, footer_area] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        frame.render_widget(Paragraph::new(" Painel financeiro").style(HEADER_STYLE), header_area);
        frame.render_widget(
            Paragraph::new(format!(" API: {}", self.ctx.settings.api_url)).style(FOOTER_STYLE),
            api_area,
        );

        let lines: Vec<Line> = MENU_ITEMS
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let text = format!("  {}. {}", i + 1, item.label());
                if i == self.menu_selection {
                    Line::from(Span::styled(text, SELECTED_STYLE))
                } else {
                    Line::from(text)
                }
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), menu_area);

        frame.render_widget(
            Paragraph::new(" \u{2191}/\u{2193}=select  Enter=abrir  1-6=atalho  q=sair").style(FOOTER_STYLE),
            footer_area,
        );
    }

    fn handle_home_key(&mut self, code: KeyCode) -> ReportViewAction {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return ReportViewAction::Close,
            KeyCode::Up | KeyCode::Char('k') => {
                self.menu_selection = self.menu_selection.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.menu_selection = (self.menu_selection + 1).min(MENU_ITEMS.len() - 1);
            }
            KeyCode::Enter => {
                self.screen = DashboardScreen::ReportView(self.open(MENU_ITEMS[self.menu_selection]));
            }
            KeyCode::Char(c) => {
                if let Some(i) = c.to_digit(10).map(|d| d as usize) {
                    if (1..=MENU_ITEMS.len()).contains(&i) {
                        self.menu_selection = i - 1;
                        self.screen = DashboardScreen::ReportView(self.open(MENU_ITEMS[i - 1]));
                    }
                }
            }
            _ => {}
        }
        ReportViewAction::Continue
    }
}

impl ReportView for Dashboard {
    fn draw(&mut self, frame: &mut Frame) {
        if let DashboardScreen::ReportView(view) = &mut self.screen {
            view.draw(frame);
            return;
        }
        self.draw_home(frame);
    }

    fn handle_key(&mut self, code: KeyCode) -> ReportViewAction {
        let DashboardScreen::ReportView(view) = &mut self.screen else {
            return self.handle_home_key(code);
        };
        if matches!(view.handle_key(code), ReportViewAction::Close) {
            self.screen = DashboardScreen::Home;
        }
        ReportViewAction::Continue
    }

    fn tick(&mut self) {
        if let DashboardScreen::ReportView(view) = &mut self.screen {
            view.tick();
        }
    }
}

pub fn run(ctx: AppContext) -> Result<()> {
    let mut dashboard = Dashboard::new(ctx);
    run_report_view(&mut dashboard)
}
