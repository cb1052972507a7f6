/// Structured view of an existing documentation comment.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedHeader {
    /// Free text before the first tag, lines joined with a space.
    pub summary: Option<String>,
    /// Tags in source order.
    pub tags: Vec<HeaderTag>,
}

/// One `@tag` line of an existing comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderTag {
    pub name: String,
    pub type_hint: Option<String>,
    pub payload: Option<String>,
}

/// Parses a complete `/** ... */` comment. Text without the delimiters is
/// accepted as well.
pub fn parse_header(comment: &str) -> ParsedHeader {
    let body = strip_delimiters(comment);
    let mut summary_lines: Vec<&str> = Vec::new();
    let mut tags: Vec<HeaderTag> = Vec::new();

    for line in body.lines().map(normalize_line) {
        if let Some(rest) = line.strip_prefix('@') {
            let (name, payload) = split_tag_payload(rest);
            if name.is_empty() {
                continue;
            }
            let (type_hint, payload) = split_type(payload);
            tags.push(HeaderTag {
                name: name.to_string(),
                type_hint,
                payload,
            });
        } else if let Some(tag) = tags.last_mut() {
            // continuation of the previous tag's payload
            if !line.is_empty() {
                let joined = match tag.payload.take() {
                    Some(existing) => format!("{existing} {line}"),
                    None => line.to_string(),
                };
                tag.payload = Some(joined);
            }
        } else {
            summary_lines.push(line);
        }
    }

    ParsedHeader {
        summary: compose_summary(&summary_lines),
        tags,
    }
}

fn strip_delimiters(comment: &str) -> &str {
    let trimmed = comment.trim();
    let trimmed = trimmed.strip_prefix("/**").unwrap_or(trimmed);
    trimmed.strip_suffix("*/").unwrap_or(trimmed)
}

fn normalize_line(line: &str) -> &str {
    let line = line.trim();
    let line = line.strip_prefix('*').unwrap_or(line);
    line.trim()
}

fn compose_summary(lines: &[&str]) -> Option<String> {
    let text = lines
        .iter()
        .copied()
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}

fn split_tag_payload(input: &str) -> (&str, &str) {
    let mut parts = input.splitn(2, char::is_whitespace);
    let tag = parts.next().unwrap_or("");
    let payload = parts.next().unwrap_or("").trim();
    (tag, payload)
}

fn split_type(payload: &str) -> (Option<String>, Option<String>) {
    let trimmed = payload.trim();
    if let Some(stripped) = trimmed.strip_prefix('{') {
        // nested braces inside the type are allowed
        let mut depth = 1usize;
        for (idx, ch) in stripped.char_indices() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        let ty = stripped[..idx].trim();
                        let rest = stripped[idx + 1..].trim();
                        return (
                            (!ty.is_empty()).then(|| ty.to_string()),
                            (!rest.is_empty()).then(|| rest.to_string()),
                        );
                    }
                }
                _ => {}
            }
        }
    }
    (None, (!trimmed.is_empty()).then(|| trimmed.to_string()))
}
