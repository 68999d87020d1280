use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

const SEPARATORS: [char; 3] = ['/', '-', '.'];
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateParseError {
    #[error("no valid date found in {0:?}")]
    NoDate(String),
}

/// A calendar date recovered from free text. Displays as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ParsedDate(NaiveDate);

impl ParsedDate {
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl From<ParsedDate> for NaiveDate {
    fn from(parsed: ParsedDate) -> Self {
        parsed.0
    }
}

impl fmt::Display for ParsedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

/// Finds the first date written as `day/month/year` or `year/month/day` in `text`.
///
/// Fields are maximal digit runs joined by `/`, `-` or `.`. Layouts are tried in that
/// order. Within a layout every numeric triple is tried left to right: first as written
/// (day before month), then with day and month swapped. Two-digit years pivot at 70,
/// so `24` is 2024 and `99` is 1999.
pub fn parse_date_text(text: &str) -> Result<ParsedDate, DateParseError> {
    let triples = numeric_triples(&tokenize(text));

    LAYOUTS
        .iter()
        .find_map(|layout| {
            triples
                .iter()
                .filter_map(|triple| layout.candidate(*triple))
                .find_map(|candidate| candidate.resolve())
        })
        .map(ParsedDate)
        .ok_or_else(|| DateParseError::NoDate(text.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Digits(&'a str),
    Separator,
    Other,
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c.is_ascii_digit() {
            let mut end = start + 1;
            while let Some(&(index, next)) = chars.peek() {
                if !next.is_ascii_digit() {
                    break;
                }
                end = index + 1;
                chars.next();
            }
            tokens.push(Token::Digits(&text[start..end]));
        } else if SEPARATORS.contains(&c) {
            tokens.push(Token::Separator);
        } else {
            tokens.push(Token::Other);
        }
    }

    tokens
}

fn numeric_triples<'a>(tokens: &[Token<'a>]) -> Vec<[&'a str; 3]> {
    tokens
        .windows(5)
        .filter_map(|window| match window {
            [
                Token::Digits(a),
                Token::Separator,
                Token::Digits(b),
                Token::Separator,
                Token::Digits(c),
            ] => Some([*a, *b, *c]),
            _ => None,
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
enum Layout {
    DayMonthYear,
    YearMonthDay,
}

const LAYOUTS: [Layout; 2] = [Layout::DayMonthYear, Layout::YearMonthDay];

impl Layout {
    fn candidate(self, [a, b, c]: [&str; 3]) -> Option<Candidate> {
        let short = |field: &str| (1..=2).contains(&field.len());

        match self {
            Self::DayMonthYear if short(a) && short(b) && matches!(c.len(), 2 | 4) => {
                Some(Candidate {
                    year: expand_year(c)?,
                    month: b.parse().ok()?,
                    day: a.parse().ok()?,
                })
            }
            Self::YearMonthDay if a.len() == 4 && short(b) && short(c) => Some(Candidate {
                year: a.parse().ok()?,
                month: b.parse().ok()?,
                day: c.parse().ok()?,
            }),
            _ => None,
        }
    }
}

fn expand_year(field: &str) -> Option<i32> {
    let year: i32 = field.parse().ok()?;
    match field.len() {
        2 if year < 70 => Some(2000 + year),
        2 => Some(1900 + year),
        _ => Some(year),
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    year: i32,
    month: u32,
    day: u32,
}

impl Candidate {
    fn resolve(&self) -> Option<NaiveDate> {
        let valid = |month, day| NaiveDate::from_ymd_opt(self.year, month, day).is_some();

        let (month, day) = if valid(self.month, self.day) {
            (self.month, self.day)
        } else if valid(self.day, self.month) {
            (self.day, self.month)
        } else {
            return None;
        };

        let assembled = format!("{:04}-{month:02}-{day:02}", self.year);
        NaiveDate::parse_from_str(&assembled, DATE_FORMAT).ok()
    }
}
