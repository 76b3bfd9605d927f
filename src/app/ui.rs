use crate::app::state::AppState;
use crate::domain::models::PaletteMode;
use crate::infrastructure::sim::BrowserSnapshot;
use crate::protocol::PaletteView;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Widget, Wrap},
    Frame,
};

pub fn draw(f: &mut Frame, state: &AppState, snapshot: &BrowserSnapshot) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab strip
            Constraint::Min(0),    // Page
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    draw_tab_strip(f, layout[0], state, snapshot);
    draw_page(f, layout[1], state, snapshot);
    draw_footer(f, layout[2], state);

    if let Some(overlay) = snapshot.page.as_ref().and_then(|p| p.overlay.as_ref()) {
        if overlay.visible {
            f.render_widget(
                PaletteOverlay {
                    theme: &state.theme,
                    view: &overlay.palette,
                },
                layout[1],
            );
        }
    }
}

fn draw_tab_strip(f: &mut Frame, area: Rect, state: &AppState, snapshot: &BrowserSnapshot) {
    let mut spans = Vec::new();
    for (i, tab) in snapshot.tabs.iter().enumerate() {
        let style = if i == snapshot.active {
            state.theme.tab_active
        } else {
            state.theme.tab_inactive
        };
        spans.push(Span::styled(format!(" {} ", truncate(&tab.title, 18)), style));
        spans.push(Span::raw(" "));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_page(f: &mut Frame, area: Rect, state: &AppState, snapshot: &BrowserSnapshot) {
    let Some(page) = &snapshot.page else {
        return;
    };
    let block = Block::default()
        .title(Span::styled(format!(" {} ", page.title), state.theme.page_title))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(state.theme.border);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let body = Paragraph::new(vec![
        Line::from(Span::styled(page.url.clone(), state.theme.page_text)),
        Line::default(),
        Line::from(Span::styled(
            "Lorem ipsum dolor sit amet, consectetur adipiscing elit. \
             Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.",
            state.theme.page_text,
        )),
    ])
    .wrap(Wrap { trim: true });
    f.render_widget(body, inner);

    if page.scroll_locked {
        dim_area(f.buffer_mut(), area);
    }
}

fn draw_footer(f: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = vec![
        Span::styled(" ^K", state.theme.key_binding),
        Span::styled(" tabs ", state.theme.footer),
        Span::styled("^P", state.theme.key_binding),
        Span::styled(" commands ", state.theme.footer),
        Span::styled("F2", state.theme.key_binding),
        Span::styled(" toolbar ", state.theme.footer),
        Span::styled("^R", state.theme.key_binding),
        Span::styled(" reload ", state.theme.footer),
        Span::styled("^Q", state.theme.key_binding),
        Span::styled(" quit ", state.theme.footer),
    ];
    if let Some(status) = &state.status {
        let style = if status.is_error {
            state.theme.status_error
        } else {
            state.theme.status_info
        };
        spans.push(Span::styled(format!("  {}", status.message), style));
    }
    f.render_widget(Paragraph::new(Line::from(spans)).style(state.theme.footer), area);
}

pub struct PaletteOverlay<'a> {
    pub theme: &'a Theme,
    pub view: &'a PaletteView,
}

impl Widget for PaletteOverlay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let modal_area = centered_rect_fixed_height(60, 14, area);
        if modal_area.width == 0 || modal_area.height == 0 {
            return;
        }

        draw_drop_shadow(buf, modal_area, area);
        Clear.render(modal_area, buf);

        let title = match self.view.mode {
            PaletteMode::TabSwitcher => " TAB SWITCHER ",
            PaletteMode::General => " COMMANDS ",
        };
        let block = Block::default()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(title, self.theme.palette_title),
                Span::raw(" "),
            ]))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(self.theme.border_focus);

        let inner = block.inner(modal_area);
        block.render(modal_area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Query input
                Constraint::Length(1), // Separator
                Constraint::Min(0),    // Results
                Constraint::Length(1), // Notice
            ])
            .split(inner);

        let query_line = if self.view.query.is_empty() {
            Line::from(vec![
                Span::styled(" > ", self.theme.border_focus),
                Span::styled("_", self.theme.query),
                Span::styled(format!(" {}", self.view.placeholder()), self.theme.placeholder),
            ])
        } else {
            Line::from(vec![
                Span::styled(" > ", self.theme.border_focus),
                Span::styled(self.view.query.as_str(), self.theme.query),
                Span::styled("_", self.theme.query),
            ])
        };
        buf.set_line(layout[0].x, layout[0].y, &query_line, layout[0].width);

        let separator = "─".repeat(layout[1].width as usize);
        buf.set_string(layout[1].x, layout[1].y, separator, self.theme.border_focus);

        if self.view.rows.is_empty() {
            let empty = match self.view.mode {
                PaletteMode::TabSwitcher => "  No tabs found.",
                PaletteMode::General => "  No commands found.",
            };
            buf.set_line(
                layout[2].x,
                layout[2].y + 1,
                &Line::from(Span::styled(empty, self.theme.list_detail)),
                layout[2].width,
            );
        } else {
            let items: Vec<ListItem> = self
                .view
                .rows
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    let selected = self.view.selected == Some(i);
                    let style = if selected {
                        self.theme.list_selected
                    } else {
                        self.theme.list_item
                    };
                    let prefix = if selected { "> " } else { "  " };
                    let mut spans = vec![
                        Span::styled(prefix, style),
                        Span::styled(format!("{} ", row.icon), style),
                        Span::styled(row.title.clone(), style),
                    ];
                    if let Some(detail) = &row.detail {
                        spans.push(Span::styled(
                            format!("  {detail}"),
                            self.theme.list_detail,
                        ));
                    }
                    ListItem::new(Line::from(spans))
                })
                .collect();
            List::new(items).render(layout[2], buf);
        }

        if let Some(notice) = &self.view.notice {
            buf.set_line(
                layout[3].x,
                layout[3].y,
                &Line::from(Span::styled(format!(" {notice}"), self.theme.notice)),
                layout[3].width,
            );
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

pub fn dim_area(buf: &mut Buffer, area: Rect) {
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            let cell = &mut buf[(x, y)];
            cell.set_style(cell.style().add_modifier(ratatui::style::Modifier::DIM));
        }
    }
}

pub fn centered_rect_fixed_height(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(r.height.saturating_sub(height) / 2),
            Constraint::Length(height.min(r.height)),
            Constraint::Min(0),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(100u16.saturating_sub(percent_x) / 2),
            Constraint::Percentage(percent_x.min(100)),
            Constraint::Percentage(100u16.saturating_sub(percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn draw_drop_shadow(buf: &mut Buffer, area: Rect, terminal_area: Rect) {
    let shadow_area = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width,
        height: area.height,
    };

    let shadow_area = shadow_area.intersection(terminal_area);

    for y in shadow_area.top()..shadow_area.bottom() {
        for x in shadow_area.left()..shadow_area.right() {
            let cell = &mut buf[(x, y)];
            cell.set_style(ratatui::style::Style::default().bg(ratatui::style::Color::Black));
            cell.set_symbol(" ");
        }
    }
}
