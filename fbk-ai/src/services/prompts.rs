//! Prompt construction
//!
//! Both builders are pure and deterministic: identical input always yields an
//! identical prompt.

use fbk_common::db::{Sentiment, Urgency};

/// Shortest delimiter fencing the feedback text inside the analysis prompt
pub const FEEDBACK_DELIMITER: &str = "\"\"\"";

/// Fence that does not occur anywhere in `feedback`
///
/// Starts at [`FEEDBACK_DELIMITER`] and grows one quote at a time, so the
/// block can only be closed by the prompt itself.
fn feedback_fence(feedback: &str) -> String {
    let mut fence = FEEDBACK_DELIMITER.to_string();
    while feedback.contains(&fence) {
        fence.push('"');
    }
    fence
}

fn quoted_list(values: &[&str]) -> String {
    let quoted: Vec<String> = values.iter().map(|v| format!("\"{}\"", v)).collect();
    match quoted.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{}, or {}", rest.join(", "), last),
        Some((last, _)) => last.clone(),
        None => String::new(),
    }
}

/// Build the structured analysis prompt for one (already trimmed) feedback text
pub fn analysis_prompt(feedback: &str) -> String {
    let sentiments: Vec<&str> = Sentiment::ALL.iter().map(|s| s.as_str()).collect();
    let urgencies: Vec<&str> = Urgency::ALL.iter().map(|u| u.as_str()).collect();

    format!(
        "You are a product manager analyzing customer feedback.\n\
         \n\
         Feedback:\n\
         {delim}\n\
         {feedback}\n\
         {delim}\n\
         \n\
         Return a JSON object with exactly these three fields:\n\
         - \"summary\": string, 1-2 sentences\n\
         - \"sentiment\": one of {sentiments}\n\
         - \"urgency\": one of {urgencies}\n\
         \n\
         Respond with only the JSON object. Do not add any explanation, and do not wrap it in markdown code fences.\n",
        delim = feedback_fence(feedback),
        feedback = feedback,
        sentiments = quoted_list(&sentiments),
        urgencies = quoted_list(&urgencies),
    )
}

/// Build the free-text summary prompt over texts in retrieval order
pub fn summary_prompt(texts: &[String]) -> String {
    format!("Summarize the following feedback:\n{}", texts.join("\n"))
}
