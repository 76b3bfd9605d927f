use ratatui::style::{Color, Modifier, Style};

pub struct Theme {
    pub border: Style,
    pub border_focus: Style,

    pub tab_active: Style,
    pub tab_inactive: Style,

    pub page_title: Style,
    pub page_text: Style,

    pub palette_title: Style,
    pub query: Style,
    pub placeholder: Style,
    pub list_item: Style,
    pub list_selected: Style,
    pub list_detail: Style,
    pub notice: Style,

    pub footer: Style,
    pub key_binding: Style,
    pub status_info: Style,
    pub status_error: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            border: Style::default().fg(Color::Rgb(80, 80, 80)),
            border_focus: Style::default().fg(Color::Cyan),

            tab_active: Style::default()
                .bg(Color::Rgb(50, 50, 50))
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default()
                .bg(Color::Rgb(30, 30, 30))
                .fg(Color::Rgb(150, 150, 150)),

            page_title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            page_text: Style::default().fg(Color::Rgb(180, 180, 180)),

            palette_title: Style::default()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            query: Style::default().fg(Color::White),
            placeholder: Style::default().fg(Color::Rgb(100, 100, 100)),
            list_item: Style::default().fg(Color::Rgb(180, 180, 180)),
            list_selected: Style::default()
                .bg(Color::Rgb(50, 50, 50))
                .add_modifier(Modifier::BOLD),
            list_detail: Style::default().fg(Color::Rgb(130, 130, 130)),
            notice: Style::default().fg(Color::Yellow),

            footer: Style::default()
                .bg(Color::Rgb(30, 30, 30))
                .fg(Color::Rgb(150, 150, 150)),
            key_binding: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            status_info: Style::default().fg(Color::Green),
            status_error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        }
    }
}
