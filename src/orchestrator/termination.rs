use crate::transcript::Message;

/// Literal that marks a candidate final proposal.
pub const FINAL_ANSWER_MARKER: &str = "FINAL ANSWER";

/// Case-sensitive substring check with no word boundaries. Any content that
/// happens to carry the marker, tool output included, counts.
pub fn contains_marker(content: &str) -> bool {
    content.contains(FINAL_ANSWER_MARKER)
}

pub fn is_final(message: &Message) -> bool {
    contains_marker(message.content())
}
