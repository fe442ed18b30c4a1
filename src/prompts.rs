//! The extraction prompt sent to the language model.
//!
//! Kept in one place so tests can inspect the exact wording without a live
//! model, and so a wording change never touches the HTTP or OCR code.

/// Instruction preceding the OCR text.
///
/// The JSON shape given here is the only contract on the model's reply; the
/// reply itself is not validated against a schema.
pub const GRADE_REPORT_INSTRUCTIONS: &str = "You are an assistant that analyzes grade reports. \
Given the following grade report text, extract the overall GPA (on a 0.0 to 4.0 scale) \
and count the number of subjects with grade F. \
Return your answer as valid JSON in the following format:\n\
{\"GPA\": <number>, \"F\": <number>}\n\
Grade Report Text:\n";

/// Build the full prompt for one grade report.
pub fn grade_report_prompt(extracted_text: &str) -> String {
    format!("{GRADE_REPORT_INSTRUCTIONS}'''{extracted_text}'''")
}
