//! Instruction sent to the language model

/// Build the instruction for one piece of text
///
/// The requested JSON shape is what [`super::parse_detection_response`]
/// expects first; older shapes are still accepted on the way back.
pub fn build_prompt(text: &str, directive: &str) -> String {
    let directive = directive.trim();
    let directive = if directive.is_empty() {
        "none"
    } else {
        directive
    };

    format!(
        r#"Find the personal information and the additionally requested information in the text below.
- Personal information is anything that identifies a person: names (usually 2 to 4 Korean syllables), addresses (e.g. "서울시 강남구 역삼동"), phone numbers, e-mail addresses, resident registration numbers, dates of birth, bank accounts, passport and card numbers.
- Additionally requested information: {directive}

Copy every value exactly as it appears in the text. Answer with JSON only, in this shape:
{{
  "standard_personal_info": {{
    "name": ["홍길동"],
    "address": ["서울시 강남구 역삼동"],
    "phone": ["010-1234-5678"],
    "email": ["user@example.com"]
  }},
  "additional_requested_info": {{
    "<requested category>": ["<value>"]
  }}
}}
Use empty objects when nothing is found.

Text:
{text}"#
    )
}
