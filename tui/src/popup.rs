use htheatpump::params::{Param, Value};
use ratatui::{
    buffer::Buffer,
    crossterm::event::{Event, KeyCode, KeyEvent},
    layout::{Constraint, Layout, Margin, Position, Rect},
    style::Stylize,
    text::Line,
    widgets::{Block, BorderType, Clear, Padding, Paragraph, StatefulWidget, Widget, Wrap},
};
use tui_input::{Input, backend::crossterm::EventHandler};

#[derive(Debug)]
pub enum State {
    Open,
    Confirmed,
    Dismissed,
}

#[derive(Debug)]
pub enum Popup {
    SetParam(Param, Input),
    ParamSet(String, Value),
    ParamRejected(String, String),
}

impl Popup {
    pub fn handle_event(&mut self, event: &Event) -> State {
        if let Some(KeyEvent { code, .. }) = event.as_key_press_event() {
            match code {
                KeyCode::Enter => {
                    return State::Confirmed;
                }
                KeyCode::Esc => {
                    return State::Dismissed;
                }
                _ => {}
            }
        }

        if let Self::SetParam(_, input) = self {
            input.handle_event(event);
        }

        State::Open
    }

    fn render_set_param_prompt(
        area: Rect,
        buf: &mut Buffer,
        param: &Param,
        input: &Input,
    ) -> Position {
        let limits = match (param.min(), param.max()) {
            (Some(min), Some(max)) => format!("{min} to {max}"),
            (Some(min), None) => format!("at least {min}"),
            (None, Some(max)) => format!("at most {max}"),
            (None, None) => "unrestricted".to_string(),
        };
        let par = Paragraph::new(vec![
            Line::from(vec![
                "Please specify a new value for ".into(),
                param.name().bold(),
                ".".into(),
            ]),
            Line::default(),
            Line::from(vec![
                "Data type: ".into(),
                param.data_type().to_string().bold(),
                ", limits: ".into(),
                limits.bold(),
                ".".into(),
            ]),
        ])
        .wrap(Wrap { trim: false });

        // Split message into multiple lines if too long
        let width = par.line_width().min(area.width.saturating_sub(50) as usize);
        let lines = par.line_count(width as u16);

        let inner = Self::render_popup(area, buf, "Change setting", width, lines + 2);
        let [top, bottom] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(inner);

        par.render(top, buf);
        input.value().render(bottom, buf);

        (bottom.x + input.visual_cursor() as u16, bottom.y).into()
    }

    fn render_param_set(area: Rect, buf: &mut Buffer, name: &str, val: &Value) {
        let msg = Line::from(vec![
            name.bold(),
            " has been set to ".into(),
            val.to_string().bold(),
            ".".into(),
        ]);
        let inner = Self::render_popup(area, buf, "Setting changed", msg.width(), 1);

        msg.render(inner, buf);
    }

    fn render_param_rejected(area: Rect, buf: &mut Buffer, name: &str, reason: &str) {
        let par = Paragraph::new(vec![
            Line::from(vec!["The value for ".into(), name.bold(), " was rejected.".into()]),
            Line::default(),
            Line::from(reason),
        ])
        .wrap(Wrap { trim: false });
        let width = par.line_width().min(area.width.saturating_sub(50) as usize);
        let lines = par.line_count(width as u16);
        let inner = Self::render_popup(area, buf, "Change failed", width, lines);

        par.render(inner, buf);
    }

    fn render_popup(
        area: Rect,
        buf: &mut Buffer,
        title: &str,
        width: usize,
        height: usize,
    ) -> Rect {
        // Increase size by block padding and border
        let pad = Padding::proportional(1);
        let width = (width as u16) + pad.left + pad.right + 2;
        let height = (height as u16) + pad.top + pad.bottom + 2;
        let popup = area.centered(Constraint::Length(width), Constraint::Length(height));
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .padding(pad)
            .title(Line::from(vec![" ".into(), title.bold(), " ".into()]).centered());
        let inner = block.inner(popup);

        // Clear area around the block with additional margin
        Clear.render(popup.outer(Margin::new(2, 1)), buf);
        block.render(popup, buf);

        inner
    }
}

impl StatefulWidget for &Popup {
    type State = Option<Position>;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        match self {
            Popup::SetParam(param, input) => {
                // Update state with current input prompt cursor position
                *state = Some(Popup::render_set_param_prompt(area, buf, param, input));
            }
            Popup::ParamSet(name, val) => Popup::render_param_set(area, buf, name, val),
            Popup::ParamRejected(name, reason) => {
                Popup::render_param_rejected(area, buf, name, reason);
            }
        }
    }
}
