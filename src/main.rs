use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor::{Hide, Show},
    event::{self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture, Event},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::fs::OpenOptions;
use std::io::{stdout, BufWriter, Stdout, Write};
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use wishcard::audio::{self, RodioPlayback, SoundManager};
use wishcard::canvas::{self, Frame};
use wishcard::clipboard::SystemClipboard;
use wishcard::config::{Args, Settings};
use wishcard::{App, Control};

const FIXED_DT: f32 = 1.0 / 60.0;

/// Logs go to a file: the terminal belongs to the card.
fn init_logging(path: &Path) {
    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => file,
        Err(_) => return,
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wishcard=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn run(settings: Settings) -> anyhow::Result<()> {
    let stdout = stdout();
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout);

    terminal::enable_raw_mode()?;
    let result = execute!(
        stdout,
        EnterAlternateScreen,
        Hide,
        Clear(ClearType::All),
        EnableMouseCapture,
        EnableBracketedPaste
    )
    .map_err(anyhow::Error::from)
    .and_then(|()| event_loop(&mut stdout, settings));

    // every restore step runs, even after a failed one
    let leave = execute!(stdout, DisableBracketedPaste, DisableMouseCapture, Show, LeaveAlternateScreen)
        .map_err(anyhow::Error::from);
    let raw = terminal::disable_raw_mode().map_err(anyhow::Error::from);

    first_error([result, leave, raw])
}

fn first_error(results: impl IntoIterator<Item = anyhow::Result<()>>) -> anyhow::Result<()> {
    results.into_iter().collect()
}

fn event_loop(stdout: &mut BufWriter<Stdout>, settings: Settings) -> anyhow::Result<()> {
    let (cols, rows) = terminal::size()?;
    let (cols, rows) = (cols as usize, rows as usize);

    let mut sound = SoundManager::new(RodioPlayback::open_or_silence(settings.track.as_deref()));
    let mut app = App::new(settings, Box::new(SystemClipboard::new()), cols, rows);
    let mut frame = Frame::new(cols, rows, canvas::background());
    let mut output = Vec::with_capacity(cols * rows * 25);

    let mut last_frame = Instant::now();
    let mut accumulator = 0.0f32;

    loop {
        if event::poll(Duration::from_millis(1))? {
            let event = event::read()?;
            if let Event::Resize(cols, rows) = event {
                frame.resize(cols as usize, rows as usize, canvas::background());
                execute!(stdout, Clear(ClearType::All))?;
            }
            if app.handle_event(&event) == Control::Quit {
                break;
            }
        }

        let now = Instant::now();
        let frame_time = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        accumulator += frame_time;
        if accumulator > FIXED_DT * 3.0 {
            accumulator = FIXED_DT * 3.0;
        }

        let mut stepped = false;
        while accumulator >= FIXED_DT {
            app.update(FIXED_DT);
            accumulator -= FIXED_DT;
            stepped = true;
        }
        if !stepped {
            continue;
        }

        sound.sync(audio::should_play(app.step()), app.is_muted());

        app.render(&mut frame);
        output.clear();
        frame.encode(&mut output)?;
        stdout.write_all(&output)?;
        stdout.flush()?;
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let settings = Args::parse().into_settings().context("invalid options")?;

    init_logging(&settings.log_file);
    canvas::set_background(settings.bg_color);
    tracing::info!(
        opened = settings.opened.is_some(),
        scale = settings.scale,
        "starting wishcard"
    );

    run(settings)
}
