//! Template rendering
//!
//! One substitution pass over `{key}` placeholders, no nested or recursive
//! expansion. `{{` and `}}` are literal-brace escapes. A placeholder naming
//! a key absent from the mapping is a hard error, never silently skipped.

use std::path::Path;

use crate::domain::value_objects::ConfigMap;
use crate::error::{HostsmithError, HostsmithResult};

/// Result of rendering one template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// The substituted text
    pub text: String,
    /// Whether any substituted value was sensitive
    pub used_secret: bool,
}

/// Substitute every `{key}` placeholder in `template` from `values`
///
/// `file` is only used for error context.
pub fn render(template: &str, values: &ConfigMap, file: &Path) -> HostsmithResult<Rendered> {
    let mut text = String::with_capacity(template.len());
    let mut used_secret = false;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    text.push('{');
                    continue;
                }
                let mut key = String::new();
                let mut closed = false;
                for k in chars.by_ref() {
                    if k == '}' {
                        closed = true;
                        break;
                    }
                    key.push(k);
                }
                if !closed {
                    return Err(HostsmithError::UnbalancedBrace {
                        file: file.to_path_buf(),
                    });
                }
                match values.get(&key) {
                    Some(value) => {
                        text.push_str(value.as_str());
                        used_secret |= value.is_secret();
                    }
                    None => {
                        return Err(HostsmithError::MissingTemplateKey {
                            key,
                            file: file.to_path_buf(),
                        });
                    }
                }
            }
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                    text.push('}');
                } else {
                    return Err(HostsmithError::UnbalancedBrace {
                        file: file.to_path_buf(),
                    });
                }
            }
            other => text.push(other),
        }
    }

    Ok(Rendered { text, used_secret })
}
