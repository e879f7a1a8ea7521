use std::sync::Mutex;

use minefriend_domain::LineStyle;

use crate::infrastructure::ports::{ChatLine, ChatPort};

/// Keeps every broadcast line, optionally echoing them to stdout.
#[derive(Default)]
pub struct RecordingChat {
    lines: Mutex<Vec<ChatLine>>,
    echo: bool,
}

impl RecordingChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn echoing() -> Self {
        Self {
            lines: Mutex::default(),
            echo: true,
        }
    }

    pub fn lines(&self) -> Vec<ChatLine> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn texts(&self) -> Vec<String> {
        self.lines().into_iter().map(|l| l.text).collect()
    }
}

impl ChatPort for RecordingChat {
    fn broadcast(&self, line: &ChatLine) {
        if self.echo {
            match line.style {
                LineStyle::Plain => println!("{}", line.render()),
                LineStyle::Italic => println!("\x1b[3m{}\x1b[0m", line.render()),
            }
        }
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.clone());
        }
    }
}
