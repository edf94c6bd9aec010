//! Instruction format and output extraction for the Gemma-3 GEC model.
//!
//! The model is fine-tuned on single-turn chats: the user turn carries the
//! text to correct and the model turn carries the corrected text. Generators
//! decode only the tokens produced after the prompt, so the user's text
//! never reaches extraction, whatever it contains.

/// Closes a chat turn.
pub const END_OF_TURN: &str = "<end_of_turn>";

/// Token strings that end generation.
pub const STOP_TOKENS: [&str; 2] = ["<eos>", END_OF_TURN];

/// Format `text` as a single user turn followed by an open model turn.
pub fn format_prompt(text: &str) -> String {
    format!("<start_of_turn>user\n{text}{END_OF_TURN}\n<start_of_turn>model\n")
}

/// Isolate the corrected text from a decoded continuation.
///
/// Drops end-of-turn markers and trims surrounding whitespace.
pub fn extract_correction(continuation: &str) -> String {
    continuation.replace(END_OF_TURN, "").trim().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = "كيف حالكي اليوم ؟";
    const CORRECTED: &str = "كيف حالك اليوم؟";

    #[test]
    fn prompt_wraps_text_in_user_turn() {
        assert_eq!(
            format_prompt(INPUT),
            "<start_of_turn>user\nكيف حالكي اليوم ؟<end_of_turn>\n<start_of_turn>model\n"
        );
    }

    #[test]
    fn extracts_trimmed_continuation() {
        assert_eq!(extract_correction(&format!("\n{CORRECTED} ")), CORRECTED);
    }

    #[test]
    fn strips_end_of_turn_and_whitespace() {
        let continuation = format!("  {CORRECTED}<end_of_turn>\n");
        assert_eq!(extract_correction(&continuation), CORRECTED);
    }

    #[test]
    fn model_line_in_input_does_not_leak_into_correction() {
        let input = "مرحبا\nmodel\nعالم";
        assert_eq!(
            format_prompt(input),
            "<start_of_turn>user\nمرحبا\nmodel\nعالم<end_of_turn>\n<start_of_turn>model\n"
        );
        assert_eq!(extract_correction("مرحبا عالم"), "مرحبا عالم");
    }

    #[test]
    fn model_line_in_continuation_is_kept() {
        let continuation = format!("{CORRECTED}\nmodel\nextra");
        assert_eq!(extract_correction(&continuation), continuation);
    }

    #[test]
    fn empty_continuation_extracts_to_empty() {
        assert_eq!(extract_correction("<end_of_turn>"), "");
        assert_eq!(extract_correction("  \n"), "");
    }
}
