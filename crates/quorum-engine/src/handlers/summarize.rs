use quorum_config::SummaryStyle;
use serde_json::Value;

use super::compare::model_texts;
use crate::inputs::NodeInputs;

/// Keep the first `keep` sentences of the combined inputs.
///
/// Multi-model payloads contribute their response texts only, so model
/// labels never end up in the summary.
pub(super) fn run(inputs: &NodeInputs, keep: usize, style: SummaryStyle) -> Value {
  let text = model_texts(inputs)
    .into_iter()
    .map(|t| t.text)
    .collect::<Vec<_>>()
    .join("\n\n");
  let sentences: Vec<String> = split_sentences(&text).into_iter().take(keep).collect();

  let summary = match style {
    SummaryStyle::Bullets => sentences
      .iter()
      .map(|s| format!("- {}", s))
      .collect::<Vec<_>>()
      .join("\n"),
    SummaryStyle::Paragraph => sentences.join(" "),
  };
  Value::String(summary)
}

/// Split text into sentences on `.`, `!` or `?` followed by whitespace, and
/// on blank lines. Inner whitespace is collapsed.
pub fn split_sentences(text: &str) -> Vec<String> {
  let mut sentences = Vec::new();
  let mut current = String::new();
  let mut chars = text.chars().peekable();

  while let Some(c) = chars.next() {
    let next = chars.peek().copied();
    current.push(c);

    let terminal = matches!(c, '.' | '!' | '?') && next.is_none_or(char::is_whitespace);
    let paragraph_break = c == '\n' && next == Some('\n');
    if terminal || paragraph_break {
      push_sentence(&mut sentences, &current);
      current.clear();
    }
  }
  push_sentence(&mut sentences, &current);
  sentences
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
  let sentence = raw.split_whitespace().collect::<Vec<_>>().join(" ");
  if !sentence.is_empty() {
    sentences.push(sentence);
  }
}
