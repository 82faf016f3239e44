use tui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tone {
    Primary,
    Accent,
    Dim,
    /// Team picked to win, or a correct pick once the game is played.
    Winner,
    /// Pick the result has already ruled out.
    Miss,
    Selected,
}

pub fn resolve(tone: Tone) -> Style {
    match tone {
        Tone::Primary => Style::default().fg(Color::Rgb(0, 122, 195)),
        Tone::Accent => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        Tone::Dim => Style::default().fg(Color::Indexed(240)),
        Tone::Winner => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        Tone::Miss => Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::CROSSED_OUT),
        Tone::Selected => Style::default()
            .fg(Color::White)
            .bg(Color::Indexed(236))
            .add_modifier(Modifier::BOLD),
    }
}
