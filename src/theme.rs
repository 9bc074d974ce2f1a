use ratatui::style::{Color, Modifier, Style};

pub struct Theme {
    pub focus_border: Color,
    pub blurred_border: Color,
    pub text: Color,
    pub text_secondary: Color,
    pub text_highlight: Color,
    pub row_alt_bg: Color,

    // Specific components
    pub title: Style,
    pub section_title: Style,
    pub file_name: Style,
    pub file_size: Style,
    pub table_header: Style,
    pub placeholder: Style,
    pub error: Style,
    pub recommendation: Style,
    pub submit_enabled: Style,
    pub submit_disabled: Style,
    pub notice: Style,
    pub footer: Style,
    pub popup_border: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            focus_border: Color::Cyan,
            blurred_border: Color::DarkGray,
            text: Color::White,
            text_secondary: Color::Gray,
            text_highlight: Color::Yellow,
            row_alt_bg: Color::Rgb(30, 30, 30),

            title: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            section_title: Style::default().fg(Color::White).add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            file_name: Style::default().fg(Color::White),
            file_size: Style::default().fg(Color::DarkGray),
            table_header: Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
            placeholder: Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            error: Style::default().fg(Color::Red),
            recommendation: Style::default().fg(Color::Green),
            submit_enabled: Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
            submit_disabled: Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM),
            notice: Style::default().fg(Color::Yellow),
            footer: Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
            popup_border: Style::default().fg(Color::Magenta).bg(Color::Black),
        }
    }
}

impl Theme {
    pub fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.focus_border).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.blurred_border)
        }
    }
}
