use crate::{
    bar::CommandBar,
    popup::{Popup, State},
    table::{Cell, ParamTable},
    worker::{Group, Request, Response},
};
use anyhow::Result;
use htheatpump::params::Param;
use ratatui::{
    buffer::Buffer,
    crossterm::event::Event,
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Stylize},
    text::Line,
    widgets::{Block, Borders, Padding, StatefulWidget, Widget},
};
use tokio::sync::mpsc::UnboundedSender;
use tui_input::Input;

#[derive(Debug)]
pub struct Session {
    serial_number: u32,
    version: String,
    tables: Vec<(Group, ParamTable)>,
    bar: CommandBar,
    popup: Option<Popup>,
    update_counter: usize,
    tx: UnboundedSender<Request>,
}

impl Session {
    pub fn create(
        serial_number: u32,
        version: String,
        settings: Vec<Param>,
        tx: UnboundedSender<Request>,
    ) -> Result<Self> {
        let mut sess = Session {
            serial_number,
            version,
            tables: vec![
                (
                    Group::Temperatures,
                    ParamTable::new("Temperatures", Color::Green),
                ),
                (Group::Faults, ParamTable::new("Fault List", Color::Red)),
                (
                    Group::Operation,
                    ParamTable::new("Operating State", Color::Blue),
                ),
                (Group::Settings, ParamTable::new("Settings", Color::Magenta)),
            ],
            bar: CommandBar::new(settings),
            popup: None,
            update_counter: 0,
            tx,
        };

        sess.schedule_update()?;

        Ok(sess)
    }

    pub fn handle_event(&mut self, event: &Event) -> Result<bool> {
        if let Some(popup) = &mut self.popup {
            match popup.handle_event(event) {
                State::Dismissed => {
                    self.popup = None;
                }
                State::Confirmed => {
                    self.popup = match popup {
                        // Values are entered like on the command line
                        Popup::SetParam(param, input) => match param.parse(input.value(), false) {
                            Ok(val) => {
                                self.tx
                                    .send(Request::SetParam(param.name().to_string(), val))?;

                                None
                            }
                            Err(err) => Some(Popup::ParamRejected(
                                param.name().to_string(),
                                err.to_string(),
                            )),
                        },
                        _ => None,
                    };
                }
                State::Open => {}
            }

            Ok(true)
        } else if let Some(param) = self.bar.event_to_setting(event) {
            self.popup = Some(Popup::SetParam(param.clone(), Input::default()));

            Ok(true)
        } else {
            // Event wasn't handled
            Ok(false)
        }
    }

    pub fn handle_worker_response(&mut self, resp: Response) -> Result<()> {
        match resp {
            Response::Connected { .. } | Response::Disconnected => {}
            Response::ParamsQueried(group, data) => {
                let rows = data
                    .into_iter()
                    .map(|(param, val)| {
                        let cell = Cell::from_param(&param, val);

                        (param.name().to_string(), cell)
                    })
                    .collect();

                self.update_table(group, rows);
                self.schedule_update()?;
            }
            Response::FaultsQueried(faults) => {
                let rows = faults
                    .iter()
                    .map(|fault| (format!("#{:03}", fault.index), Cell::from_fault(fault)))
                    .collect();

                self.update_table(Group::Faults, rows);
                self.schedule_update()?;
            }
            Response::ParamSet(name, val) => {
                self.popup = Some(Popup::ParamSet(name, val));
            }
            Response::ParamRejected(name, reason) => {
                self.popup = Some(Popup::ParamRejected(name, reason));
            }
        }

        Ok(())
    }

    fn update_table(&mut self, group: Group, rows: Vec<(String, Cell)>) {
        if let Some((_, table)) = self.tables.iter_mut().find(|(g, _)| g == &group) {
            table.update(rows);
        }
    }

    fn schedule_update(&mut self) -> Result<()> {
        // Select next group to update
        let group = match self.update_counter {
            0 => Group::Temperatures,
            1 => Group::Operation,
            2 => Group::Settings,
            3 => Group::Faults,
            cnt if cnt % 60 == 0 => Group::Faults,
            cnt if cnt % 20 == 0 => Group::Settings,
            cnt if cnt % 2 == 0 => Group::Temperatures,
            _ => Group::Operation,
        };

        self.tx.send(Request::Query(group))?;
        self.update_counter += 1;

        Ok(())
    }

    fn render_tables(&self, area: Rect, buf: &mut Buffer) {
        let [top, bottom] = Layout::vertical(vec![Constraint::Fill(1); 2])
            .spacing(1)
            .areas(area);
        let [top_left, top_right] = Layout::horizontal(vec![Constraint::Fill(1); 2])
            .spacing(2)
            .areas(top);
        let [bottom_left, bottom_right] = Layout::horizontal(vec![Constraint::Fill(1); 2])
            .spacing(2)
            .areas(bottom);
        let areas = [top_left, bottom_left, top_right, bottom_right];

        for ((_, table), inner) in self.tables.iter().zip(areas) {
            table.render(inner, buf);
        }
    }

    fn render_bar(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .borders(Borders::TOP)
            .padding(Padding::proportional(1))
            .title("Settings ".bold())
            .title(
                Line::from(vec![
                    " Serial number: ".into(),
                    self.serial_number.to_string().into(),
                    ", Software: ".into(),
                    self.version.as_str().into(),
                    " ".into(),
                    self.spinner().green(),
                    " ".into(),
                ])
                .bold()
                .right_aligned(),
            );

        self.bar.render(block.inner(area), buf);
        block.render(area, buf);
    }

    fn spinner(&self) -> String {
        let symbols = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
        let index = self.update_counter % symbols.len();

        symbols[index].to_string()
    }
}

impl StatefulWidget for &Session {
    type State = Option<Position>;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let [top, bottom] = Layout::vertical([Constraint::Fill(1), Constraint::Length(5)])
            .spacing(1)
            .areas(area);

        self.render_tables(top, buf);
        self.render_bar(bottom, buf);

        if let Some(popup) = &self.popup {
            // Pass cursor position state to popup
            popup.render(top, buf, state);
        }
    }
}
