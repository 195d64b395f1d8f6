//! The article analysis screen.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use claimdesk_core::{Article, Claim};

use super::{spinner_char, truncate};
use crate::app::{App, InputMode};
use crate::theme::Theme;

/// Dropdown rows shown before the list scrolls.
const DROPDOWN_ROWS: u16 = 8;

pub fn render(f: &mut Frame, app: &App) {
    let [header, body, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(f.area());

    render_header(f, app, header);
    match app.view.article() {
        None => render_placeholder(f, app, body),
        Some(article) => render_article(f, app, article, body),
    }
    render_footer(f, app, footer);
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let id = app.view.article_id().unwrap_or("<no article id>");
    let text = format!(" claimdesk \u{2502} article {id}");
    let line = Line::from(Span::styled(
        format!("{text:<width$}", width = area.width as usize),
        app.theme.header_style(),
    ));
    f.render_widget(Paragraph::new(line), area);
}

fn render_placeholder(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let line = Line::from(vec![
        Span::styled(
            format!("{} ", spinner_char(app.tick)),
            Style::default().fg(theme.spinner),
        ),
        Span::styled("Loading article\u{2026}", Style::default().fg(theme.dim)),
    ]);
    let rect = super::centered_rect(24.min(area.width), 1.min(area.height), area);
    f.render_widget(Paragraph::new(line), rect);
}

fn render_article(f: &mut Frame, app: &App, article: &Article, area: Rect) {
    let results = app.view.search_results();
    let dropdown_height = if results.is_empty() {
        0
    } else {
        (results.len() as u16).min(DROPDOWN_ROWS) + 2
    };

    let [meta, search, dropdown, claims] = Layout::vertical([
        Constraint::Length(8),
        Constraint::Length(3),
        Constraint::Length(dropdown_height),
        Constraint::Min(3),
    ])
    .areas(area);

    render_metadata(f, app, article, meta);
    render_search_box(f, app, search);
    if !results.is_empty() {
        render_dropdown(f, app, results, dropdown);
    }
    render_claims(f, &app.theme, app.view.claims(), claims);
}

fn render_metadata(f: &mut Frame, app: &App, article: &Article, area: Rect) {
    let theme = &app.theme;
    let width = area.width.saturating_sub(4) as usize;
    let label = |s: &'static str| Span::styled(s, Style::default().fg(theme.dim));
    let value = |s: String| Span::styled(s, Style::default().fg(theme.text));

    let approved = article
        .approved_at
        .map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let year = article
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let completion = if app.view.can_mark_complete() {
        Line::from(vec![
            Span::styled("[c] ", Style::default().fg(theme.active)),
            Span::styled(
                "Mark analysis complete",
                Style::default()
                    .fg(theme.active)
                    .add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        Line::from(Span::styled(
            "\u{2714} Analysis Completed",
            Style::default().fg(theme.done).add_modifier(Modifier::BOLD),
        ))
    };

    let lines = vec![
        Line::from(Span::styled(
            truncate(&article.title, width),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![label("Authors: "), value(truncate(&article.author_line(), width))]),
        Line::from(vec![label("Year: "), value(year)]),
        Line::from(vec![label("Moderator approved on: "), value(approved)]),
        Line::from(vec![
            label("Source: "),
            Span::styled(
                truncate(&article.url, width),
                Style::default()
                    .fg(theme.link)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        ]),
        completion,
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(" Article ");
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
}

fn render_search_box(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let searching = app.input_mode == InputMode::Search;

    let mut spans = vec![Span::styled(
        app.view.search_text().to_string(),
        Style::default().fg(theme.text),
    )];
    if searching {
        spans.push(Span::styled("\u{2588}", Style::default().fg(theme.active)));
    } else if app.view.search_text().is_empty() {
        spans.push(Span::styled(
            "press / to search claims",
            Style::default().fg(theme.dim),
        ));
    }

    let title = if app.view.search_pending() {
        format!(" Search claims {} ", spinner_char(app.tick))
    } else {
        " Search claims ".to_string()
    };
    let border = if searching {
        theme.active_border_style()
    } else {
        theme.border_style()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title);
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_dropdown(f: &mut Frame, app: &App, results: &[Claim], area: Rect) {
    let theme = &app.theme;
    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = results
        .iter()
        .map(|c| ListItem::new(truncate(&c.name, width)).style(Style::default().fg(theme.text)))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.active_border_style())
                .title(format!(" {} matching ", results.len())),
        )
        .highlight_style(theme.highlight_style())
        .highlight_symbol("\u{25B8} ");

    let mut state = ListState::default().with_selected(Some(app.result_cursor));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_claims(f: &mut Frame, theme: &Theme, claims: &[Claim], area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(format!(" Claims ({}) ", claims.len()));

    if claims.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "No claims for this article",
            Style::default().fg(theme.dim),
        ))
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let width = area.width.saturating_sub(6) as usize;
    let items: Vec<ListItem> = claims
        .iter()
        .enumerate()
        .map(|(i, c)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>3}. ", i + 1), Style::default().fg(theme.dim)),
                Span::styled(truncate(&c.name, width), Style::default().fg(theme.text)),
            ]))
        })
        .collect();
    f.render_widget(List::new(items).block(block), area);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let line = match app.view.latest_notice() {
        Some(notice) => Line::from(Span::styled(
            format!(" {}", truncate(&notice.message, area.width.saturating_sub(1) as usize)),
            Style::default().fg(theme.notice_color(notice.level)),
        )),
        None => Line::from(Span::styled(
            " / search  \u{2191}\u{2193} select  Enter attach  c complete  r reload  ? help  q quit",
            theme.footer_style(),
        )),
    };
    f.render_widget(Paragraph::new(line).style(theme.footer_style()), area);
}
