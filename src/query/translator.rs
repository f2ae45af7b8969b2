// file: src/query/translator.rs
// description: compiles structured search requests into recoll query language
// reference: https://www.recoll.org/usermanual/#RCL.SEARCH.LANG

use super::filetype::resolve_filetype;
use crate::error::{AdapterError, Result};
use crate::models::{DateRange, QueryClause, SearchRequest};
use tracing::debug;

/// Matches every indexed document.
pub const MATCH_ALL: &str = "dir:/";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Word(&'a str),
    Open,
    Close,
    And,
    Or,
    Not,
}

pub struct QueryTranslator;

impl QueryTranslator {
    pub fn translate(request: &SearchRequest) -> Result<String> {
        let mut parts: Vec<String> = Vec::new();
        let mut compound_text = false;

        if let Some(text) = request.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let tokens = validate_expression(text)?;
            compound_text = tokens > 1;
            parts.push(text.to_string());
        }

        if let Some(clause) = &request.clause {
            parts.push(compile_clause(clause)?);
        }

        if let Some(range) = &request.date_range
            && let Some(predicate) = date_predicate(range)?
        {
            parts.push(predicate);
        }

        if let Some(filetype) = &request.filetype {
            parts.push(mime_predicate(filetype)?);
        }

        let compiled = match parts.len() {
            0 => MATCH_ALL.to_string(),
            1 => parts.remove(0),
            _ => {
                if compound_text {
                    parts[0] = format!("({})", parts[0]);
                }
                parts.join(" AND ")
            }
        };

        debug!("Translated request into query: {}", compiled);
        Ok(compiled)
    }
}

/// Quotes a value as a phrase when it carries whitespace or characters the
/// engine's parser would interpret.
pub fn quote_if_needed(value: &str) -> String {
    let value = value.trim();
    let reserved = value.starts_with('-')
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, ':' | '"' | '(' | ')'));

    if reserved {
        quote_phrase(value)
    } else {
        value.to_string()
    }
}

fn quote_phrase(value: &str) -> String {
    format!("\"{}\"", value.replace('"', " ").trim())
}

fn compile_clause(clause: &QueryClause) -> Result<String> {
    match clause {
        QueryClause::Term(term) => {
            require_non_blank(term, "term")?;
            Ok(quote_if_needed(term))
        }
        QueryClause::Phrase(phrase) => {
            require_non_blank(phrase, "phrase")?;
            Ok(quote_phrase(phrase))
        }
        QueryClause::Field { name, value } => {
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(AdapterError::InvalidQuery(format!(
                    "invalid field name '{name}'"
                )));
            }
            require_non_blank(value, "field value")?;
            Ok(format!("{}:{}", name, quote_if_needed(value)))
        }
        QueryClause::And(children) => compile_group(children, "AND"),
        QueryClause::Or(children) => compile_group(children, "OR"),
        QueryClause::Not(inner) => {
            let compiled = compile_clause(inner)?;
            match inner.as_ref() {
                QueryClause::Term(_) | QueryClause::Phrase(_) | QueryClause::Field { .. } => {
                    Ok(format!("-{compiled}"))
                }
                _ => Ok(format!("NOT {compiled}")),
            }
        }
    }
}

fn compile_group(children: &[QueryClause], operator: &str) -> Result<String> {
    match children {
        [] => Err(AdapterError::InvalidQuery(format!(
            "empty {operator} clause"
        ))),
        [only] => compile_clause(only),
        _ => {
            let compiled = children
                .iter()
                .map(compile_clause)
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("({})", compiled.join(&format!(" {operator} "))))
        }
    }
}

fn require_non_blank(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AdapterError::InvalidQuery(format!("empty {what}")));
    }
    Ok(())
}

fn date_predicate(range: &DateRange) -> Result<Option<String>> {
    let predicate = match (range.from, range.to) {
        (Some(from), Some(to)) if from > to => {
            return Err(AdapterError::InvalidQuery(format!(
                "date range starts on {} after it ends on {}",
                from.format(DATE_FORMAT),
                to.format(DATE_FORMAT)
            )));
        }
        (Some(from), Some(to)) => format!(
            "date:{}/{}",
            from.format(DATE_FORMAT),
            to.format(DATE_FORMAT)
        ),
        (Some(from), None) => format!("date:{}/", from.format(DATE_FORMAT)),
        (None, Some(to)) => format!("date:/{}", to.format(DATE_FORMAT)),
        (None, None) => return Ok(None),
    };
    Ok(Some(predicate))
}

fn mime_predicate(filetype: &str) -> Result<String> {
    let token = filetype.trim();
    if token.is_empty()
        || token
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '(' | ')'))
    {
        return Err(AdapterError::InvalidQuery(format!(
            "'{filetype}' is not a usable filetype"
        )));
    }
    Ok(format!("mime:{}", resolve_filetype(token)))
}

/// Checks the Boolean structure of free text and returns its token count.
/// Terms themselves are never rewritten.
fn validate_expression(text: &str) -> Result<usize> {
    let tokens = tokenize(text)?;
    let mut expect_operand = true;
    let mut depth: usize = 0;

    for token in &tokens {
        match token {
            Token::Word(_) => expect_operand = false,
            Token::Open => {
                depth += 1;
                expect_operand = true;
            }
            Token::Close => {
                if expect_operand {
                    return Err(AdapterError::InvalidQuery(
                        "empty group or operator before ')'".to_string(),
                    ));
                }
                depth = depth.checked_sub(1).ok_or_else(|| {
                    AdapterError::InvalidQuery("unbalanced ')'".to_string())
                })?;
            }
            Token::And | Token::Or => {
                if expect_operand {
                    return Err(AdapterError::InvalidQuery(
                        "AND/OR must sit between two terms".to_string(),
                    ));
                }
                expect_operand = true;
            }
            Token::Not => expect_operand = true,
        }
    }

    if expect_operand && !tokens.is_empty() {
        return Err(AdapterError::InvalidQuery(
            "query ends with an operator".to_string(),
        ));
    }

    if depth != 0 {
        return Err(AdapterError::InvalidQuery("unbalanced '('".to_string()));
    }

    Ok(tokens.len())
}

fn tokenize(text: &str) -> Result<Vec<Token<'_>>> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b if b.is_ascii_whitespace() => i += 1,
            b'(' => {
                tokens.push(Token::Open);
                i += 1;
            }
            b')' => {
                tokens.push(Token::Close);
                i += 1;
            }
            _ => {
                let start = i;
                while i < bytes.len()
                    && !bytes[i].is_ascii_whitespace()
                    && bytes[i] != b'('
                    && bytes[i] != b')'
                {
                    if bytes[i] == b'"' {
                        let close = text[i + 1..].find('"').ok_or_else(|| {
                            AdapterError::InvalidQuery("unterminated quoted phrase".to_string())
                        })?;
                        i += close + 2;
                    } else {
                        i += 1;
                    }
                }
                tokens.push(match &text[start..i] {
                    "AND" => Token::And,
                    "OR" => Token::Or,
                    "NOT" => Token::Not,
                    word => Token::Word(word),
                });
            }
        }
    }

    Ok(tokens)
}
