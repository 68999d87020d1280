mod date_parser;
mod details;
mod gemini;
mod outcome;

pub use date_parser::{DateParseError, ParsedDate, parse_date_text};
pub use details::{MedicineDetails, MedicineDetailsExtractor};
pub use gemini::{ExtractError, GeminiExtractor, image_mime_type};
pub use outcome::ScanOutcome;
