//! Text layer for each step of the card.

use unicode_width::UnicodeWidthChar;

use crate::app::{App, AppStep, Field};
use crate::canvas::{Frame, Style, text_width};

const WHITE: Style = Style::new((255, 255, 255));
const GRAY: Style = Style::new((156, 163, 175));
const DIM: Style = Style::new((107, 114, 128));
const FAINT: Style = Style::new((75, 85, 99));
const YELLOW: Style = Style::new((250, 204, 21));
const PURPLE: Style = Style::new((192, 132, 252));
const GREEN: Style = Style::new((74, 222, 128));

const EDITOR_WIDTH: usize = 60;
const MESSAGE_ROWS: usize = 6;
const TEXT_WIDTH: usize = 64;

const DIGITS: [[&str; 5]; 10] = [
    ["███", "█ █", "█ █", "█ █", "███"],
    [" █ ", "██ ", " █ ", " █ ", "███"],
    ["███", "  █", "███", "█  ", "███"],
    ["███", "  █", "███", "  █", "███"],
    ["█ █", "█ █", "███", "  █", "  █"],
    ["███", "█  ", "███", "  █", "███"],
    ["███", "█  ", "███", "█ █", "███"],
    ["███", "  █", "  █", "  █", "  █"],
    ["███", "█ █", "███", "█ █", "███"],
    ["███", "█ █", "███", "  █", "███"],
];

enum Align {
    Center,
    Left(usize),
}

struct Line {
    text: String,
    style: Style,
    align: Align,
}

/// Lines stacked top to bottom, then centered vertically on the frame.
#[derive(Default)]
struct Column {
    lines: Vec<Line>,
}

impl Column {
    fn center(&mut self, text: impl Into<String>, style: Style) {
        self.lines.push(Line {
            text: text.into(),
            style,
            align: Align::Center,
        });
    }

    fn left(&mut self, col: usize, text: impl Into<String>, style: Style) {
        self.lines.push(Line {
            text: text.into(),
            style,
            align: Align::Left(col),
        });
    }

    fn gap(&mut self) {
        self.center("", WHITE);
    }

    fn draw(&self, frame: &mut Frame) {
        let top = frame.rows().saturating_sub(self.lines.len()) / 2;
        for (i, line) in self.lines.iter().enumerate() {
            let row = top + i;
            match line.align {
                Align::Center => frame.put_centered(row, &line.text, line.style),
                Align::Left(col) => {
                    frame.put_str(col, row, &line.text, line.style);
                }
            }
        }
    }
}

pub fn draw(app: &App, frame: &mut Frame) {
    let mut column = Column::default();
    let width = frame.cols().saturating_sub(4).min(TEXT_WIDTH).max(1);

    match app.step() {
        AppStep::Create => create(app, frame, &mut column),
        AppStep::ShareLink => share_link(app, width, &mut column),
        AppStep::LightsOff => {
            column.center("Wait... why is it so dark?", GRAY);
            column.gap();
            column.center("Press Enter to turn on the lights", WHITE.bold());
        }
        AppStep::Decorate => {
            column.center("MUCH BETTER! ✦", WHITE.bold());
            column.gap();
            column.center(format!("But we need more {} spirit...", app.year()), GRAY);
            column.gap();
            column.center("Press Enter to decorate!", PURPLE.bold());
        }
        AppStep::Countdown => countdown(app, frame, &mut column),
        AppStep::Celebration => celebration(app, width, &mut column),
    }
    column.draw(frame);

    let sound = if app.is_muted() { "♪ off" } else { "♪ on" };
    let hint = if app.step() == AppStep::Create { "F2" } else { "m" };
    let label = format!("{sound} ({hint})");
    let col = frame.cols().saturating_sub(text_width(&label) + 1);
    frame.put_str(col, 0, &label, DIM);
}

fn create(app: &App, frame: &Frame, column: &mut Column) {
    let box_width = frame.cols().saturating_sub(4).min(EDITOR_WIDTH).max(1);
    let left = frame.cols().saturating_sub(box_width) / 2;
    let wish = app.wish();
    let cursor = if app.time() % 1.0 < 0.5 { "▏" } else { " " };

    column.center(format!("WISH {}", app.year()), YELLOW.bold());
    column.center("Personalize a magical experience to share", GRAY);
    column.gap();

    column.left(left, "RECIPIENT'S NAME", DIM);
    let name_focused = app.focus() == Field::Name;
    if wish.name.is_empty() && !name_focused {
        column.left(left, "  e.g. Sarah", FAINT);
    } else {
        let text = if name_focused {
            format!("> {}{}", wish.name, cursor)
        } else {
            format!("  {}", wish.name)
        };
        column.left(left, text, if name_focused { WHITE.bold() } else { GRAY });
    }
    column.gap();

    column.left(left, "LONG SECRET MESSAGE", DIM);
    let message_focused = app.focus() == Field::Message;
    let mut rows = if wish.message.is_empty() && !message_focused {
        vec!["Write your heart out! We'll show it in beautiful chunks...".to_string()]
    } else {
        let mut text = wish.message.clone();
        if message_focused {
            text.push_str(cursor);
        }
        wrap(&text, box_width.saturating_sub(2))
    };
    // keep the end of the message, where typing happens, in view
    if rows.len() > MESSAGE_ROWS {
        rows.drain(..rows.len() - MESSAGE_ROWS);
    }
    let style = if wish.message.is_empty() && !message_focused {
        FAINT
    } else if message_focused {
        WHITE
    } else {
        GRAY
    };
    for i in 0..MESSAGE_ROWS {
        let marker = if message_focused && i == 0 { "> " } else { "  " };
        let text = rows.get(i).map(String::as_str).unwrap_or("");
        column.left(left, format!("{marker}{text}"), style);
    }
    column.gap();

    let button = if app.focus() == Field::Generate {
        "> Generate Link <"
    } else {
        "  Generate Link  "
    };
    let style = if !app.can_generate() {
        FAINT
    } else if app.focus() == Field::Generate {
        PURPLE.bold()
    } else {
        WHITE
    };
    column.center(button, style);
    column.gap();
    column.center("Tab next field · Enter confirm · Esc quit", FAINT);
}

fn share_link(app: &App, width: usize, column: &mut Column) {
    column.center("Ready to Go!", WHITE.bold());
    column.gap();
    for line in wrap(
        "Copy this link and send it. They'll experience a sequence of surprises before your reveal!",
        width,
    ) {
        column.center(line, GRAY);
    }
    column.gap();

    let link = app.share_url().map(|u| u.as_str()).unwrap_or("");
    column.center(truncate(link, width), DIM);
    column.gap();
    if app.is_copied() {
        column.center("✓ Copied!", GREEN.bold());
    } else {
        column.center("Press c to copy the link", WHITE);
    }
    column.gap();
    column.center("Press Enter to preview the magic", PURPLE.bold());
}

fn countdown(app: &App, frame: &Frame, column: &mut Column) {
    let year = app.year().to_string();
    // pulse between gold and white, once a second
    let style = if app.time() % 1.0 < 0.5 { YELLOW.bold() } else { WHITE.bold() };

    let banner = big_digits(&year);
    if banner.first().is_some_and(|row| text_width(row) + 4 <= frame.cols()) {
        for row in banner {
            column.center(row, style);
        }
    } else {
        column.center(year, style);
    }
    column.gap();
    column.center("Prepare for the celebration of a lifetime.", GRAY);
    column.gap();
    column.center("Press Enter to BLAST OFF!", YELLOW.bold());
}

fn celebration(app: &App, width: usize, column: &mut Column) {
    let pager = app.pager();

    column.center("Happy New Year, dearest...", YELLOW);
    column.center(app.wish().name.clone(), WHITE.bold());
    column.gap();

    for line in wrap(pager.current(), width) {
        column.center(line, WHITE);
    }
    column.gap();

    // a disabled arrow is left blank
    let prev = if pager.has_prev() { '‹' } else { ' ' };
    let next = if pager.has_next() { '›' } else { ' ' };
    let part = format!("Part {} of {}", pager.index() + 1, pager.len());
    column.center(format!("{prev}   {part}   {next}"), GRAY);
    column.gap();

    column.center(format!("Press f for a {} prediction", app.year()), YELLOW);
    if let Some(fortune) = app.fortune() {
        for line in wrap(&fortune, width.min(48)) {
            column.center(line, WHITE.bold());
        }
    }
    column.gap();
    column.center("Press r to create your own", DIM);
    column.center("CLICK THE SKY TO LAUNCH FIREWORKS!", FAINT);
}

fn big_digits(text: &str) -> Vec<String> {
    if !text.chars().all(|c| c.is_ascii_digit()) {
        return Vec::new();
    }
    (0..5)
        .map(|row| {
            text.chars()
                .map(|c| DIGITS[(c as u8 - b'0') as usize][row])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// Greedy word wrap by display width. Words longer than a line are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_width = 0;
        for word in paragraph.split(' ') {
            let word_width = text_width(word);
            if line_width > 0 && line_width + 1 + word_width > width {
                out.push(std::mem::take(&mut line));
                line_width = 0;
            }
            if line_width > 0 {
                line.push(' ');
                line_width += 1;
            }
            for ch in word.chars() {
                let w = ch.width().unwrap_or(0);
                if line_width + w > width && line_width > 0 {
                    out.push(std::mem::take(&mut line));
                    line_width = 0;
                }
                line.push(ch);
                line_width += w;
            }
        }
        out.push(line);
    }
    out
}

fn truncate(text: &str, width: usize) -> String {
    if text_width(text) <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}
