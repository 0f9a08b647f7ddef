use htheatpump::params::Param;
use ratatui::{
    buffer::Buffer,
    crossterm::event::{Event, KeyCode, KeyEvent},
    layout::Rect,
    style::Stylize,
    text::Line,
    widgets::{Paragraph, Widget, Wrap},
};

// Maximum number of rendered settings, limited by number of usable function keys
const MAX_NUM_SETTINGS: usize = 12;

#[derive(Debug)]
pub struct CommandBar {
    settings: Vec<Param>,
}

impl CommandBar {
    pub fn new(mut settings: Vec<Param>) -> Self {
        settings.truncate(MAX_NUM_SETTINGS);

        Self { settings }
    }

    pub fn event_to_setting(&self, event: &Event) -> Option<&Param> {
        if let Some(KeyEvent {
            code: KeyCode::F(key),
            ..
        }) = event.as_key_press_event()
        {
            self.settings.get(usize::from(key).checked_sub(1)?)
        } else {
            None
        }
    }
}

impl Widget for &CommandBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let len = self.settings.len();
        let spans = self
            .settings
            .iter()
            .enumerate()
            .flat_map(|(i, param)| {
                // Map settings to function keys
                let name = param.name().into();
                let key = format!("<F{}>", i + 1).bold();

                if i + 1 == len {
                    [name, " ".into(), key, "".into()]
                } else {
                    [name, " ".into(), key, " | ".into()]
                }
            })
            .collect::<Vec<_>>();

        if spans.is_empty() {
            "No writable settings available.".render(area, buf);
        } else {
            Paragraph::new(Line::from(spans))
                .wrap(Wrap { trim: true })
                .render(area, buf);
        }
    }
}
