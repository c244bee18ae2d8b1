//! End-to-end runs of the card driven by terminal events: composing a wish,
//! sharing it, and opening it as the recipient.

use std::cell::RefCell;
use std::rc::Rc;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use wishcard::canvas::{Frame, DEFAULT_BG};
use wishcard::clipboard::Clipboard;
use wishcard::config::Settings;
use wishcard::link;
use wishcard::{App, AppStep, Control, WishData};

const COLS: usize = 80;
const ROWS: usize = 24;

#[derive(Clone, Default)]
struct SharedClipboard(Rc<RefCell<Option<String>>>);

impl Clipboard for SharedClipboard {
    fn set_text(&mut self, text: &str) -> wishcard::Result<()> {
        *self.0.borrow_mut() = Some(text.to_string());
        Ok(())
    }
}

fn new_app(settings: Settings) -> App {
    App::new(settings, Box::new(SharedClipboard::default()), COLS, ROWS)
        .with_rng(fastrand::Rng::with_seed(7))
}

fn key(app: &mut App, code: KeyCode) -> Control {
    app.handle_event(&Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
}

fn type_text(app: &mut App, text: &str) {
    for ch in text.chars() {
        let code = if ch == '\n' { KeyCode::Enter } else { KeyCode::Char(ch) };
        key(app, code);
    }
}

fn click(app: &mut App, column: u16, row: u16) {
    app.handle_event(&Event::Mouse(MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column,
        row,
        modifiers: KeyModifiers::NONE,
    }));
}

fn screen(app: &App) -> String {
    let mut frame = Frame::new(COLS, ROWS, app.backdrop());
    app.render(&mut frame);
    frame.text()
}

/// Types a wish into the editor and generates its link.
fn compose(app: &mut App, name: &str, message: &str) -> String {
    type_text(app, name);
    key(app, KeyCode::Tab);
    type_text(app, message);
    key(app, KeyCode::Tab);
    key(app, KeyCode::Enter);
    assert_eq!(app.step(), AppStep::ShareLink);
    app.share_url().map(|u| u.to_string()).unwrap_or_default()
}

fn open(url: &str) -> App {
    let settings = Settings {
        opened: link::parse_link(url),
        auto_bursts: false,
        ..Settings::default()
    };
    new_app(settings)
}

#[test]
fn test_compose_share_and_open() {
    let mut creator = new_app(Settings::default());
    let url = compose(&mut creator, "Alex", "Line1\nLine2\nLine3");

    let mut app = open(&url);
    assert_eq!(app.step(), AppStep::LightsOff);
    assert!(screen(&app).contains("Wait... why is it so dark?"));

    key(&mut app, KeyCode::Enter);
    assert_eq!(app.step(), AppStep::Decorate);
    key(&mut app, KeyCode::Char(' '));
    assert_eq!(app.step(), AppStep::Countdown);
    key(&mut app, KeyCode::Enter);
    assert_eq!(app.step(), AppStep::Celebration);

    let text = screen(&app);
    assert!(text.contains("Alex"));
    assert!(text.contains("Line1"));
    assert!(text.contains("Line2"));
    assert!(!text.contains("Line3"));
    assert!(text.contains("Part 1 of 2"));

    key(&mut app, KeyCode::Right);
    let text = screen(&app);
    assert!(text.contains("Line3"));
    assert!(!text.contains("Line1"));
    assert!(text.contains("Part 2 of 2"));
    assert!(!app.pager().has_next());

    key(&mut app, KeyCode::Right);
    assert_eq!(app.pager().index(), 1);

    key(&mut app, KeyCode::Left);
    assert_eq!(app.pager().index(), 0);
    key(&mut app, KeyCode::Left);
    assert_eq!(app.pager().index(), 0);
}

#[test]
fn test_prompts_are_key_hints() {
    let mut app = open("https://wishcard.app/?n=Sarah&m=Hi");
    let prompts = [
        "Press Enter to turn on the lights",
        "Press Enter to decorate!",
        "Press Enter to BLAST OFF!",
        "Press r to create your own",
    ];
    for prompt in prompts {
        let text = screen(&app);
        assert!(text.contains(prompt), "missing {prompt:?}");
        assert!(!text.contains("[ "));
        key(&mut app, KeyCode::Enter);
    }
    assert_eq!(app.step(), AppStep::Celebration);
}

#[test]
fn test_known_link_opens() {
    let app = open("https://wishcard.app/?n=Sarah&m=Hi%0AThere");
    assert_eq!(app.step(), AppStep::LightsOff);
    assert_eq!(app.wish(), &WishData::new("Sarah", "Hi\nThere"));
    assert_eq!(app.pager().len(), 1);
}

#[test]
fn test_incomplete_link_opens_editor() {
    let app = open("https://wishcard.app/?n=Sarah");
    assert_eq!(app.step(), AppStep::Create);
    assert!(app.wish().name.is_empty());
}

#[test]
fn test_copy_and_preview() {
    let clipboard = SharedClipboard::default();
    let mut app = App::new(Settings::default(), Box::new(clipboard.clone()), COLS, ROWS);
    let url = compose(&mut app, "Sarah", "Hi");

    key(&mut app, KeyCode::Char('c'));
    assert_eq!(clipboard.0.borrow().as_deref(), Some(url.as_str()));
    assert!(screen(&app).contains("Copied!"));

    key(&mut app, KeyCode::Enter);
    assert_eq!(app.step(), AppStep::LightsOff);
}

#[test]
fn test_generate_needs_both_fields() {
    let mut app = new_app(Settings::default());
    type_text(&mut app, "Alex");
    key(&mut app, KeyCode::BackTab);
    key(&mut app, KeyCode::Enter);
    assert_eq!(app.step(), AppStep::Create);
    assert!(app.share_url().is_none());
}

#[test]
fn test_paste_goes_into_focused_field() {
    let mut app = new_app(Settings::default());
    app.handle_event(&Event::Paste("Jordan".into()));
    key(&mut app, KeyCode::Tab);
    app.handle_event(&Event::Paste("first\nsecond".into()));
    assert_eq!(app.wish(), &WishData::new("Jordan", "first\nsecond"));
}

#[test]
fn test_clicks_launch_fireworks() {
    let mut app = open("https://wishcard.app/?n=Sarah&m=Hi");
    click(&mut app, 10, 5);
    for _ in 0..3 {
        key(&mut app, KeyCode::Enter);
    }
    assert_eq!(app.fireworks().map(|f| f.len()), Some(0));

    click(&mut app, 10, 5);
    click(&mut app, 40, 8);
    assert_eq!(app.fireworks().map(|f| f.len()), Some(160));

    app.update(1.0 / 60.0);
    let canvas = app.fireworks().map(|f| f.canvas()).unwrap();
    let lit = (0..canvas.height())
        .flat_map(|y| (0..canvas.width()).map(move |x| (x, y)))
        .any(|(x, y)| canvas.get(x, y) != Some(DEFAULT_BG));
    assert!(lit);
}

#[test]
fn test_create_your_own_starts_over() {
    let mut app = open("https://wishcard.app/?n=Sarah&m=Hi");
    for _ in 0..3 {
        key(&mut app, KeyCode::Enter);
    }
    key(&mut app, KeyCode::Char('r'));
    assert_eq!(app.step(), AppStep::Create);
    assert!(app.fireworks().is_none());
    assert!(screen(&app).contains("RECIPIENT'S NAME"));
}

#[test]
fn test_quit_keys() {
    let mut app = new_app(Settings::default());
    assert_eq!(key(&mut app, KeyCode::Char('q')), Control::Continue);
    assert_eq!(key(&mut app, KeyCode::Esc), Control::Quit);

    let mut app = open("https://wishcard.app/?n=Sarah&m=Hi");
    assert_eq!(key(&mut app, KeyCode::Char('m')), Control::Continue);
    assert!(app.is_muted());
    assert_eq!(key(&mut app, KeyCode::Char('q')), Control::Quit);
    let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert_eq!(app.handle_event(&Event::Key(ctrl_c)), Control::Quit);
}
