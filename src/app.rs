//! The card's step sequence and everything the listener can do in each
//! step.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use url::Url;

use crate::canvas::{self, Frame, Rgb};
use crate::clipboard::Clipboard;
use crate::config::Settings;
use crate::effects::Effect;
use crate::effects::decorations::{FloatingBalloons, PartyBulbs};
use crate::effects::fireworks::FireworkEngine;
use crate::link::{self, WishData};
use crate::message::Pager;
use crate::view;

const COPIED_SECS: f32 = 2.0;
const FORTUNE_SECS: f32 = 4.0;
// Seconds for the sky to go dark or come back
const BACKDROP_FADE: f32 = 1.0;
const LIGHTS_OFF_COLOR: Rgb = (0, 0, 0);

const FORTUNES: [&str; 6] = [
    "In {year}, you will finally find that one sock you lost three years ago.",
    "Prediction: You'll start 3 new hobbies and finish... exactly zero of them. Standard.",
    "Good news! Scientists in {year} confirm that pizza counts as a salad if it has oregano.",
    "Your {year} will be so bright, you'll need two pairs of sunglasses.",
    "Expect a very important text from a cat. Or someone who acts like one.",
    "You will travel somewhere new. Like the kitchen, but for a fancy snack.",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AppStep {
    /// Composing the card
    Create,
    ShareLink,
    // The recipient's sequence
    LightsOff,
    Decorate,
    Countdown,
    Celebration,
}

// editor focus
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Name,
    Message,
    Generate,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Field::Name => Field::Message,
            Field::Message => Field::Generate,
            Field::Generate => Field::Name,
        }
    }

    fn prev(self) -> Self {
        match self {
            Field::Name => Field::Generate,
            Field::Message => Field::Name,
            Field::Generate => Field::Message,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct App {
    step: AppStep,
    wish: WishData,
    focus: Field,
    share_url: Option<Url>,
    pager: Pager,
    // seconds left on the "copied" indicator
    copied: f32,
    fortune: Option<(usize, f32)>,
    muted: bool,
    // 0 = normal sky, 1 = lights off
    darkness: f32,
    time: f32,
    width: usize,
    height: usize,
    settings: Settings,
    clipboard: Box<dyn Clipboard>,
    rng: fastrand::Rng,
    bulbs: PartyBulbs,
    balloons: Option<FloatingBalloons>,
    fireworks: Option<FireworkEngine>,
}

impl App {
    /// `cols` x `rows` is the terminal size. A link carrying a complete wish
    /// skips straight to the recipient's sequence.
    pub fn new(settings: Settings, clipboard: Box<dyn Clipboard>, cols: usize, rows: usize) -> Self {
        let (width, height) = (cols, rows * 2);
        let mut app = Self {
            step: AppStep::Create,
            wish: WishData::default(),
            focus: Field::Name,
            share_url: None,
            pager: Pager::new(""),
            copied: 0.0,
            fortune: None,
            muted: settings.muted,
            darkness: 0.0,
            time: 0.0,
            width,
            height,
            settings,
            clipboard,
            rng: fastrand::Rng::new(),
            bulbs: PartyBulbs::new(width, height),
            balloons: None,
            fireworks: None,
        };

        if let Some(wish) = app.settings.opened.clone() {
            tracing::info!("opened a card for {:?}", wish.name);
            app.pager = Pager::new(&wish.message);
            app.wish = wish;
            app.set_step(AppStep::LightsOff);
            app.darkness = 1.0;
        }
        app
    }

    pub fn with_rng(mut self, rng: fastrand::Rng) -> Self {
        self.rng = rng;
        self
    }

    pub fn step(&self) -> AppStep {
        self.step
    }

    pub fn wish(&self) -> &WishData {
        &self.wish
    }

    pub fn focus(&self) -> Field {
        self.focus
    }

    pub fn share_url(&self) -> Option<&Url> {
        self.share_url.as_ref()
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn is_copied(&self) -> bool {
        self.copied > 0.0
    }

    pub fn fortune(&self) -> Option<String> {
        self.fortune
            .map(|(i, _)| FORTUNES[i].replace("{year}", &self.settings.year.to_string()))
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn year(&self) -> u16 {
        self.settings.year
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn can_generate(&self) -> bool {
        self.wish.is_complete()
    }

    pub fn fireworks(&self) -> Option<&FireworkEngine> {
        self.fireworks.as_ref()
    }

    pub fn balloons(&self) -> Option<&FloatingBalloons> {
        self.balloons.as_ref()
    }

    pub fn bulbs(&self) -> &PartyBulbs {
        &self.bulbs
    }

    pub fn backdrop(&self) -> Rgb {
        canvas::lerp_rgb(self.settings.bg_color, LIGHTS_OFF_COLOR, self.darkness)
    }

    fn set_step(&mut self, step: AppStep) {
        tracing::debug!(from = ?self.step, to = ?step, "step");
        self.step = step;
        self.bulbs.set_active(matches!(
            step,
            AppStep::Decorate | AppStep::Countdown | AppStep::Celebration
        ));

        if step == AppStep::Celebration {
            if self.fireworks.is_none() {
                let seed = self.rng.u64(..);
                self.fireworks = FireworkEngine::mount(self.width, self.height, self.settings.scale)
                    .map(|engine| {
                        engine
                            .with_rng(fastrand::Rng::with_seed(seed))
                            .with_autonomous(self.settings.auto_bursts)
                    });
            }
            if self.balloons.is_none() {
                self.balloons = Some(FloatingBalloons::new(self.width, self.height, &mut self.rng));
            }
        } else {
            self.fireworks = None;
            self.balloons = None;
        }
    }

    pub fn generate_link(&mut self) -> bool {
        // refused until both fields have content
        if self.step != AppStep::Create || !self.can_generate() {
            return false;
        }
        let url = link::encode(&self.settings.base_url, &self.wish);
        tracing::info!("generated link ({} bytes)", url.as_str().len());
        self.share_url = Some(url);
        self.pager = Pager::new(&self.wish.message);
        self.copied = 0.0;
        self.set_step(AppStep::ShareLink);
        true
    }

    pub fn copy_link(&mut self) {
        if self.step != AppStep::ShareLink {
            return;
        }
        let Some(url) = &self.share_url else { return };
        match self.clipboard.set_text(url.as_str()) {
            Ok(()) => self.copied = COPIED_SECS,
            Err(e) => tracing::warn!("copy failed: {}", e),
        }
    }

    pub fn preview(&mut self) {
        if self.step == AppStep::ShareLink {
            self.set_step(AppStep::LightsOff);
        }
    }

    pub fn turn_on_lights(&mut self) {
        if self.step == AppStep::LightsOff {
            self.set_step(AppStep::Decorate);
        }
    }

    pub fn decorate(&mut self) {
        if self.step == AppStep::Decorate {
            self.set_step(AppStep::Countdown);
        }
    }

    pub fn blast_off(&mut self) {
        if self.step == AppStep::Countdown {
            self.set_step(AppStep::Celebration);
        }
    }

    pub fn next_chunk(&mut self) -> bool {
        self.step == AppStep::Celebration && self.pager.next_chunk()
    }

    pub fn prev_chunk(&mut self) -> bool {
        self.step == AppStep::Celebration && self.pager.prev_chunk()
    }

    pub fn show_fortune(&mut self) {
        if self.step == AppStep::Celebration {
            let i = self.rng.usize(0..FORTUNES.len());
            self.fortune = Some((i, FORTUNE_SECS));
        }
    }

    // "create your own": back to an empty editor
    pub fn reset(&mut self) {
        if self.step != AppStep::Celebration {
            return;
        }
        self.wish = WishData::default();
        self.settings.opened = None;
        self.share_url = None;
        self.pager = Pager::new("");
        self.fortune = None;
        self.copied = 0.0;
        self.focus = Field::Name;
        self.set_step(AppStep::Create);
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        tracing::debug!(muted = self.muted, "mute toggled");
    }

    /// A click on the sky at terminal cell `(col, row)`. Only the celebration
    /// has a sky to click.
    pub fn launch_at(&mut self, col: u16, row: u16) {
        if self.step != AppStep::Celebration {
            return;
        }
        if let Some(engine) = self.fireworks.as_mut() {
            let scale = engine.scale();
            let x = (col as f32 + 0.5) * scale;
            let y = (row as f32 * 2.0 + 1.0) * scale;
            engine.launch(x, y);
        }
    }

    pub fn resize(&mut self, cols: usize, rows: usize) {
        self.width = cols;
        self.height = rows * 2;
        self.bulbs.resize(self.width, self.height);
        if let Some(balloons) = self.balloons.as_mut() {
            balloons.resize(self.width, self.height);
        }
        match self.fireworks.as_mut() {
            Some(engine) => engine.resize(self.width, self.height),
            // the sky may have been too small to start on
            None if self.step == AppStep::Celebration => self.set_step(AppStep::Celebration),
            None => {}
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.time += dt;
        if self.time > 10000.0 {
            self.time -= 10000.0;
        }

        self.copied = (self.copied - dt).max(0.0);
        if let Some((_, left)) = self.fortune.as_mut() {
            *left -= dt;
            if *left <= 0.0 {
                self.fortune = None;
            }
        }

        let step = dt / BACKDROP_FADE;
        self.darkness = if self.step == AppStep::LightsOff {
            (self.darkness + step).min(1.0)
        } else {
            (self.darkness - step).max(0.0)
        };

        self.bulbs.update(dt);
        if let Some(balloons) = self.balloons.as_mut() {
            balloons.update(dt);
        }
        if let Some(engine) = self.fireworks.as_mut() {
            engine.update(dt);
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        // back to front: sky, fireworks, balloons, bulbs, text
        frame.clear(self.backdrop());
        if let Some(engine) = &self.fireworks {
            engine.render(frame);
        }
        if let Some(balloons) = &self.balloons {
            balloons.render(frame);
        }
        self.bulbs.render(frame);
        view::draw(self, frame);
    }

    pub fn handle_event(&mut self, event: &Event) -> Control {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                ..
            }) => {
                self.launch_at(*column, *row);
                Control::Continue
            }
            Event::Paste(text) => {
                if self.step == AppStep::Create {
                    self.insert_text(text);
                }
                Control::Continue
            }
            Event::Resize(cols, rows) => {
                self.resize(*cols as usize, *rows as usize);
                Control::Continue
            }
            _ => Control::Continue,
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Control {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return Control::Quit,
            KeyCode::Char('c') if ctrl => return Control::Quit,
            KeyCode::F(2) => {
                self.toggle_mute();
                return Control::Continue;
            }
            _ => {}
        }

        if self.step == AppStep::Create {
            self.handle_editor_key(key);
            return Control::Continue;
        }

        let advance = matches!(key.code, KeyCode::Enter | KeyCode::Char(' '));
        match (self.step, key.code) {
            (_, KeyCode::Char('q')) => return Control::Quit,
            (_, KeyCode::Char('m')) => self.toggle_mute(),
            (AppStep::ShareLink, KeyCode::Char('c')) => self.copy_link(),
            (AppStep::ShareLink, KeyCode::Enter | KeyCode::Char('p')) => self.preview(),
            (AppStep::LightsOff, _) if advance => self.turn_on_lights(),
            (AppStep::Decorate, _) if advance => self.decorate(),
            (AppStep::Countdown, _) if advance => self.blast_off(),
            (AppStep::Celebration, KeyCode::Right | KeyCode::Char('n')) => {
                self.next_chunk();
            }
            (AppStep::Celebration, KeyCode::Left | KeyCode::Char('p')) => {
                self.prev_chunk();
            }
            (AppStep::Celebration, KeyCode::Char('f')) => self.show_fortune(),
            (AppStep::Celebration, KeyCode::Char('r')) => self.reset(),
            _ => {}
        }
        Control::Continue
    }

    fn handle_editor_key(&mut self, key: &KeyEvent) {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return;
        }
        match key.code {
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::Enter => match self.focus {
                Field::Name => self.focus = Field::Message,
                Field::Message => self.wish.message.push('\n'),
                Field::Generate => {
                    self.generate_link();
                }
            },
            KeyCode::Backspace => match self.focus {
                Field::Name => {
                    self.wish.name.pop();
                }
                Field::Message => {
                    self.wish.message.pop();
                }
                Field::Generate => {}
            },
            KeyCode::Char(ch) => self.insert_text(&ch.to_string()),
            _ => {}
        }
    }

    fn insert_text(&mut self, text: &str) {
        match self.focus {
            Field::Name => self
                .wish
                .name
                .extend(text.chars().map(|c| if c.is_control() { ' ' } else { c })),
            Field::Message => self
                .wish
                .message
                .extend(text.chars().filter(|c| *c == '\n' || !c.is_control())),
            Field::Generate => {}
        }
    }
}
