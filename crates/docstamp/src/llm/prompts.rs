//! Prompt templates and structured response shapes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::DeclarationKind;

/// Answer to a declaration or return-value prompt.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DescriptionResponse {
    /// One or two sentence description.
    pub description: String,
}

/// Answer to a parameter prompt.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ParametersResponse {
    #[serde(default)]
    pub parameters: Vec<ParameterDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ParameterDescription {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Prompt builder for description requests.
pub struct PromptBuilder<'a> {
    language: &'a str,
}

impl<'a> PromptBuilder<'a> {
    /// Prompts ask for answers written in `language`.
    pub fn new(language: &'a str) -> Self {
        Self { language }
    }

    pub fn declaration(&self, kind: DeclarationKind, snippet: &str) -> String {
        format!(
            r#"You are a technical documentation expert. Describe this TypeScript/JavaScript {subject} for a JSDoc comment.

Code:
{snippet}

Return ONLY a JSON object with this exact structure:
{{
  "description": "One or two sentences explaining what this {subject} is for"
}}

Requirements:
- Write the description in {language}
- Focus on WHAT it does, not on how the code is written
- Do not repeat the name or the type signature
- Output ONLY valid JSON (no markdown, no code blocks, no extra text)"#,
            subject = subject(kind),
            snippet = snippet,
            language = self.language,
        )
    }

    pub fn parameters(&self, snippet: &str, names: &[String], is_generic: bool) -> String {
        let what = if is_generic {
            "generic type parameters"
        } else {
            "parameters"
        };
        format!(
            r#"You are a technical documentation expert. Describe the {what} of this TypeScript/JavaScript code for a JSDoc comment.

Code:
{snippet}

Names to describe: {names}

Return ONLY a JSON object with this exact structure:
{{
  "parameters": [
    {{ "name": "<name>", "description": "Short description" }}
  ]
}}

Requirements:
- Write every description in {language}
- Use exactly the names listed above, one entry per name
- Keep each description to a single short sentence
- Output ONLY valid JSON (no markdown, no code blocks, no extra text)"#,
            what = what,
            snippet = snippet,
            names = names.join(", "),
            language = self.language,
        )
    }

    pub fn return_value(&self, snippet: &str, return_type: &str) -> String {
        format!(
            r#"You are a technical documentation expert. Describe the value returned by this TypeScript/JavaScript code for a JSDoc @returns tag.

Code:
{snippet}

Return type: {return_type}

Return ONLY a JSON object with this exact structure:
{{
  "description": "Short description of the returned value"
}}

Requirements:
- Write the description in {language}
- Do not repeat the return type
- Output ONLY valid JSON (no markdown, no code blocks, no extra text)"#,
            snippet = snippet,
            return_type = return_type,
            language = self.language,
        )
    }
}

fn subject(kind: DeclarationKind) -> &'static str {
    match kind {
        DeclarationKind::ClassLike => "class or interface",
        DeclarationKind::Property => "property",
        DeclarationKind::Accessor => "accessor",
        DeclarationKind::Enum => "enum",
        DeclarationKind::Method => "function",
        DeclarationKind::Constructor => "constructor",
        DeclarationKind::TypeAlias => "type alias",
        DeclarationKind::Variable => "variable",
        DeclarationKind::File => "file",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_carry_language_and_names() {
        let prompts = PromptBuilder::new("German");
        let prompt = prompts.parameters("function f(a, b) {}", &["a".into(), "b".into()], false);
        assert!(prompt.contains("Names to describe: a, b"));
        assert!(prompt.contains("in German"));
        assert!(prompt.contains("the parameters of"));

        let generic = prompts.parameters("type T<K> = K", &["K".into()], true);
        assert!(generic.contains("generic type parameters"));
    }

    #[test]
    fn declaration_prompt_names_the_subject() {
        let prompt = PromptBuilder::new("English").declaration(DeclarationKind::Method, "f()");
        assert!(prompt.contains("this TypeScript/JavaScript function"));
    }

    #[test]
    fn parameters_response_tolerates_missing_fields() {
        let parsed: ParametersResponse =
            serde_json::from_str(r#"{"parameters":[{"name":"a"}]}"#).unwrap();
        assert_eq!(parsed.parameters[0].description, "");
        let empty: ParametersResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.parameters.is_empty());
    }
}
