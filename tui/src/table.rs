use htheatpump::{
    FaultEntry,
    params::{Param, Value},
};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    symbols::line,
    text::Line,
    widgets::{Block, BorderType, LineGauge, Padding, Paragraph, Widget, Wrap},
};

#[derive(Debug)]
pub enum Cell {
    Text(String),
    Gauge(String, f64),
}

impl Cell {
    pub fn from_param(param: &Param, val: Value) -> Self {
        match val {
            Value::Bool(val) => Self::Text(String::from(if val { "Yes" } else { "No" })),
            Value::Int(_) => Self::Text(val.to_string()),
            Value::Float(cur) => {
                let txt = format!("{cur:.1}");

                // Show measured values relative to their limits
                match (param.min().and_then(Value::as_f64), param.max().and_then(Value::as_f64)) {
                    (Some(min), Some(max)) if max > min => {
                        Self::Gauge(txt, ((cur - min) / (max - min)).clamp(0.0, 1.0))
                    }
                    _ => Self::Text(txt),
                }
            }
        }
    }

    pub fn from_fault(fault: &FaultEntry) -> Self {
        Self::Text(format!(
            "{} ({}, error {})",
            fault.message, fault.datetime, fault.error
        ))
    }
}

#[derive(Debug)]
pub struct ParamTable {
    title: &'static str,
    color: Color,
    rows: Vec<(String, Cell)>,
}

impl ParamTable {
    pub fn new(title: &'static str, color: Color) -> Self {
        Self {
            title,
            color,
            rows: Vec::new(),
        }
    }

    pub fn update(&mut self, rows: Vec<(String, Cell)>) {
        self.rows = rows;
    }

    fn render_rows(&self, area: Rect, buf: &mut Buffer) {
        let layout = Layout::horizontal([Constraint::Fill(1); 2]);
        let mut offset = 0;

        for ((label, cell), row) in self.rows.iter().zip(area.rows()) {
            let [mut left, mut right] = layout.areas(row);

            left.y += offset;
            right.y += offset;

            // Abort if row exceeds table bounds
            if Self::row_height_out_of_bounds(right, area) {
                break;
            }

            match cell {
                Cell::Text(txt) => {
                    let par = Paragraph::new(txt.as_str()).wrap(Wrap { trim: false });

                    right.height = par.line_count(right.width) as u16;

                    // Abort if wrapped paragraph exceeds table bounds
                    if Self::row_height_out_of_bounds(right, area) {
                        break;
                    }

                    par.render(right, buf);
                }
                Cell::Gauge(txt, ratio) => LineGauge::default()
                    .filled_symbol(line::THICK_HORIZONTAL)
                    .filled_style(self.color)
                    .ratio(*ratio)
                    .label(txt.as_str())
                    .render(right, buf),
            }

            label.as_str().bold().render(left, buf);
            offset += right.height - 1;
        }
    }

    fn row_height_out_of_bounds(row: Rect, area: Rect) -> bool {
        row.y + row.height > area.y + area.height
    }
}

impl Widget for &ParamTable {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(self.color)
            .padding(Padding::proportional(1))
            .title(Line::from(vec![" ".into(), self.title.bold(), " ".into()]).centered())
            .title_style(Style::reset());
        let inner = block.inner(area);

        if self.rows.is_empty() {
            "No data available.".bold().render(inner, buf);
        } else {
            self.render_rows(inner, buf);
        }

        block.render(area, buf);
    }
}
