use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use ratatui::style::Color;

pub const DEFAULT_PROC_ROOT: &str = "/proc";
pub const DEFAULT_POLL_MS: u64 = 100;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, ValueEnum)]
pub enum Theme {
    #[default]
    Pink,
    Serious,
}

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub header: Color,
    pub text: Color,
    pub selected_fg: Color,
    pub selected_bg: Color,
    pub prompt: Color,
    pub success: Color,
    pub error: Color,
}

impl Theme {
    pub fn palette(self) -> Palette {
        match self {
            Theme::Pink => Palette {
                header: Color::Rgb(255, 121, 198),
                text: Color::Rgb(230, 230, 230),
                selected_fg: Color::Black,
                selected_bg: Color::Rgb(255, 182, 222),
                prompt: Color::Rgb(255, 121, 198),
                success: Color::Rgb(80, 250, 123),
                error: Color::Rgb(255, 85, 85),
            },
            Theme::Serious => Palette {
                header: Color::White,
                text: Color::Gray,
                selected_fg: Color::Black,
                selected_bg: Color::White,
                prompt: Color::White,
                success: Color::Green,
                error: Color::Red,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub proc_root: PathBuf,
    pub initial_filter: Option<String>,
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            proc_root: PathBuf::from(DEFAULT_PROC_ROOT),
            initial_filter: None,
            poll_interval: Duration::from_millis(DEFAULT_POLL_MS),
        }
    }
}
