use std::path::PathBuf;

use clap::Parser;
use url::Url;

use crate::canvas::{Rgb, DEFAULT_BG};
use crate::error::{Result, WishError};
use crate::link::{self, WishData};

/// wishcard - a New Year greeting card for your terminal
#[derive(Parser, Debug)]
#[command(name = "wishcard")]
#[command(about = "Compose a greeting, share the link, and open it for a firework finale")]
#[command(after_help = "Press Esc or Ctrl+C to exit")]
pub struct Args {
    /// Shared link to open (starts the recipient sequence)
    pub link: Option<String>,

    /// Base URL that generated links point at
    #[arg(long, default_value = link::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Background color as hex (e.g. 1a1b26)
    #[arg(long, value_name = "RRGGBB")]
    pub bg_color: Option<String>,

    /// Logical firework units per terminal pixel
    #[arg(long, default_value_t = 6.0)]
    pub scale: f32,

    /// Audio file to loop during the celebration (built-in jingle otherwise)
    #[arg(long, value_name = "PATH")]
    pub track: Option<PathBuf>,

    /// Start with the music muted
    #[arg(long)]
    pub muted: bool,

    /// Only launch fireworks on click
    #[arg(long)]
    pub no_auto_bursts: bool,

    /// Year shown on the card
    #[arg(long, default_value_t = 2026)]
    pub year: u16,

    /// Log file (RUST_LOG controls the level)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

// Args after validation
#[derive(Clone, Debug)]
pub struct Settings {
    // decoded from the opened link
    pub opened: Option<WishData>,
    pub base_url: Url,
    pub bg_color: Rgb,
    pub scale: f32,
    pub track: Option<PathBuf>,
    pub muted: bool,
    pub auto_bursts: bool,
    pub year: u16,
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            opened: None,
            base_url: default_base_url(),
            bg_color: DEFAULT_BG,
            scale: 6.0,
            track: None,
            muted: false,
            auto_bursts: true,
            year: 2026,
            log_file: default_log_file(),
        }
    }
}

impl Args {
    pub fn into_settings(self) -> Result<Settings> {
        let bg_color = match self.bg_color {
            Some(hex) => parse_hex_color(&hex).ok_or(WishError::InvalidColor(hex))?,
            None => DEFAULT_BG,
        };
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(WishError::InvalidScale(self.scale));
        }

        Ok(Settings {
            opened: self.link.as_deref().and_then(link::parse_link),
            base_url: Url::parse(&self.base_url)?,
            bg_color,
            scale: self.scale,
            track: self.track,
            muted: self.muted,
            auto_bursts: !self.no_auto_bursts,
            year: self.year,
            log_file: self.log_file.unwrap_or_else(default_log_file),
        })
    }
}

fn default_base_url() -> Url {
    Url::parse(link::DEFAULT_BASE_URL).expect("DEFAULT_BASE_URL is a valid URL")
}

fn default_log_file() -> PathBuf {
    std::env::temp_dir().join("wishcard.log")
}

pub fn parse_hex_color(hex: &str) -> Option<Rgb> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}
