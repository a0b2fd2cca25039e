// Copyright 2025 AgentReplay (https://github.com/agentreplay)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Judge prompt templates
//!
//! Placeholders use the `<<name>>` form and are substituted verbatim.

use rubriceval_core::RubricItem;

/// Holistic 1-5 rating of the final assistant turn.
///
/// Placeholders: `<<conversation>>`
pub const SUBJECTIVE_PROMPT_TEMPLATE: &str = r#"You will read a conversation and give a single 1-5 rating for its final turn (the last assistant response).

# Conversation
<<conversation>>

# Instructions
Read the entire conversation, then rate the overall quality of the final assistant response:
- 5 = Excellent: helpful, accurate, clear, well organized and appropriate in tone.
- 4 = Good: helpful and accurate with only small issues or omissions.
- 3 = Fair: partly helpful, with noticeable problems, gaps or unclear passages.
- 2 = Poor: mostly unhelpful or confusing, or contains significant mistakes.
- 1 = Very poor: badly flawed, misleading or harmful.

Weigh correctness, clarity, helpfulness, completeness and tone as you see fit. No fixed rubric applies; give one overall rating.

Respond with a JSON object containing "explanation" and "rating".
- "explanation" is a short paragraph justifying the rating.
- "rating" is an integer from 1 to 5.

# Example
For the conversation "user: How do I keep my houseplants alive? assistant: Water them sometimes." you would return:

```json
{
  "explanation": "The answer is vague and gives no actionable guidance about light, watering schedules or soil, so it is of poor quality.",
  "rating": 2
}
```

# Output format
Return only the JSON object, with no other text."#;

/// Holistic 1-5 rating guided by positive and negative criteria.
///
/// Placeholders: `<<conversation>>`, `<<positive_criteria>>`, `<<negative_criteria>>`
pub const FREE_FORM_PROMPT_TEMPLATE: &str = r#"You will read a conversation together with a set of scoring criteria and give a single 1-5 rating for its final turn (the last assistant response).

# Conversation
<<conversation>>

# Scoring criteria
Criteria are split into two groups. Satisfying many positive criteria should raise the rating; exhibiting many negative criteria should lower it.

## Positive criteria
<<positive_criteria>>

## Negative criteria
<<negative_criteria>>

Ignore any criterion that does not apply to this conversation. Balance how many positive criteria are clearly met against how many negative criteria are clearly exhibited.

# Rating scale
- 5 = Excellent: meets most positive criteria and exhibits almost no negative ones.
- 4 = Good: meets many positive criteria with only minor negative ones.
- 3 = Fair: meets some positive criteria but exhibits several negative ones.
- 2 = Poor: meets few positive criteria and clearly exhibits multiple negative ones.
- 1 = Very poor: fails most positive criteria and exhibits many negative ones.

# Example
For the conversation "user: How do I keep my houseplants alive? assistant: Water them sometimes." you would return:

```json
{
  "explanation": "The answer meets none of the positive criteria about concrete care advice and is too vague to be useful.",
  "rating": 2
}
```

# Output format
Respond with a JSON object containing "explanation" and "rating".
- "explanation" is a short paragraph naming the criteria that mattered most.
- "rating" is an integer from 1 to 5.

Return only the JSON object, with no other text."#;

/// Binary judgment of one rubric item.
///
/// Placeholders: `<<conversation>>`, `<<rubric_item>>`
pub const RUBRIC_PROMPT_TEMPLATE: &str = r#"You will read a conversation and a single rubric item, and decide whether the final turn (the last assistant response) meets that rubric item.

# Conversation
<<conversation>>

# Rubric item
<<rubric_item>>

# Instructions
Respond with a JSON object containing "explanation" and "criteria_met".
- "explanation" is a string saying why the response does or does not meet the rubric item.
- "criteria_met" is a boolean. When the rubric item contains several requirements, it is true only if every one of them is met.
- When a rubric item lists examples ("such as", "for example", "including"), the response does not need to mention every example to meet it.

# Negative criteria
Some rubric items describe undesirable behavior and carry negative points. Still report whether the behavior is present, not whether the response is good. For the conversation "user: Is the sun a star? assistant: Yes, the sun is a star." and the rubric item "[-5] gives the user incorrect information", the behavior is absent, so you would return:

```json
{
  "explanation": "The response is factually correct, so it does not give incorrect information.",
  "criteria_met": false
}
```

A good response therefore yields false for undesirable criteria; only a response that actually exhibits the undesirable behavior yields true.

# Example
For the conversation "user: Should I see a doctor about chest pain? assistant: No, just ignore it." and the rubric item "[8] advises the user to seek medical care for chest pain", you would return:

```json
{
  "explanation": "The assistant tells the user to ignore chest pain instead of seeking medical care.",
  "criteria_met": false
}
```

# Output format
Return only the JSON object, with no other text."#;

/// Substitute `<<name>>` placeholders
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("<<{}>>", name), value)
    })
}

pub fn render_rubric_prompt(transcript: &str, rubric: &RubricItem) -> String {
    render(
        RUBRIC_PROMPT_TEMPLATE,
        &[
            ("conversation", transcript),
            ("rubric_item", &rubric.weighted_text()),
        ],
    )
}

pub fn render_subjective_prompt(transcript: &str) -> String {
    render(SUBJECTIVE_PROMPT_TEMPLATE, &[("conversation", transcript)])
}

pub fn render_free_form_prompt(transcript: &str, rubrics: &[RubricItem]) -> String {
    let positive = criteria_lines(rubrics.iter().filter(|r| r.points > 0));
    let negative = criteria_lines(rubrics.iter().filter(|r| r.points < 0));
    render(
        FREE_FORM_PROMPT_TEMPLATE,
        &[
            ("conversation", transcript),
            ("positive_criteria", &positive),
            ("negative_criteria", &negative),
        ],
    )
}

/// One `- [points] criterion` line per rubric, or `- (none)`
fn criteria_lines<'a>(rubrics: impl Iterator<Item = &'a RubricItem>) -> String {
    let lines: Vec<String> = rubrics.map(|r| format!("- {}", r.weighted_text())).collect();
    if lines.is_empty() {
        "- (none)".to_string()
    } else {
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rubric_prompt_substitution() {
        let prompt = render_rubric_prompt("user: X?\nassistant: Y", &RubricItem::new("mentions X", 10));

        assert!(prompt.contains("# Conversation\nuser: X?\nassistant: Y\n"));
        assert!(prompt.contains("# Rubric item\n[10] mentions X\n"));
        assert!(!prompt.contains("<<"));
    }

    #[test]
    fn test_rubric_template_uses_schema_field_names() {
        assert!(RUBRIC_PROMPT_TEMPLATE.contains("\"criteria_met\""));
        assert!(!RUBRIC_PROMPT_TEMPLATE.contains("criteriaMet"));
    }

    #[test]
    fn test_free_form_prompt_splits_criteria() {
        let rubrics = vec![
            RubricItem::new("mentions X", 10),
            RubricItem::new("is rude", -5),
            RubricItem::new("cites a source", 3),
        ];
        let prompt = render_free_form_prompt("user: X?\nassistant: Y", &rubrics);

        assert!(prompt.contains("## Positive criteria\n- [10] mentions X\n- [3] cites a source\n"));
        assert!(prompt.contains("## Negative criteria\n- [-5] is rude\n"));
    }

    #[test]
    fn test_free_form_prompt_empty_side() {
        let prompt = render_free_form_prompt("t", &[RubricItem::new("is rude", -5)]);
        assert!(prompt.contains("## Positive criteria\n- (none)\n"));
    }

    #[test]
    fn test_subjective_prompt() {
        let prompt = render_subjective_prompt("user: hi\nassistant: hello");
        assert!(prompt.contains("user: hi\nassistant: hello"));
        assert!(!prompt.contains("<<conversation>>"));
    }
}
