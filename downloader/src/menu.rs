//! Console prompts for the date range and the go/no-go confirmation

use crate::download::{DateRange, DownloadError};
use chrono::NaiveDate;
use std::io::{self, BufRead, Write};

/// Canned date ranges offered at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePreset {
    OneYear,
    TwoYears,
    ThreeYears,
}

impl DatePreset {
    pub const ALL: [DatePreset; 3] = [Self::OneYear, Self::TwoYears, Self::ThreeYears];

    /// Empty input or `1` is the one-year preset, `2` two years; any other
    /// answer selects the full three-year history
    pub fn from_choice(choice: &str) -> Self {
        match choice.trim() {
            "" | "1" => Self::OneYear,
            "2" => Self::TwoYears,
            _ => Self::ThreeYears,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::OneYear => "last 1 year - quick",
            Self::TwoYears => "last 2 years - recommended",
            Self::ThreeYears => "last 3 years - full history",
        }
    }

    pub fn start(&self) -> NaiveDate {
        let (y, m, d) = match self {
            Self::OneYear => (2024, 2, 15),
            Self::TwoYears => (2023, 2, 15),
            Self::ThreeYears => (2022, 2, 15),
        };
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    /// Preset start through `today`
    pub fn range(&self, today: NaiveDate) -> Result<DateRange, DownloadError> {
        DateRange::new(self.start(), Some(today))
    }
}

fn prompt_line<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> io::Result<String> {
    write!(output, "{}", prompt)?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Print the preset menu and read a choice (empty input picks 1)
pub fn choose_preset<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<DatePreset> {
    writeln!(output, "\nDate range presets:")?;
    for (i, preset) in DatePreset::ALL.iter().enumerate() {
        writeln!(output, "{}. {} (from {})", i + 1, preset.label(), preset.start())?;
    }
    let choice = prompt_line(input, output, "\nChoose (1-3, default=1): ")?;
    Ok(DatePreset::from_choice(&choice))
}

/// Only an explicit `y` confirms
pub fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> io::Result<bool> {
    let answer = prompt_line(input, output, &format!("\n{} (y/n): ", question))?;
    Ok(answer.eq_ignore_ascii_case("y"))
}
