//! Animation scripts and the pure text helpers applied to model output.
//!
//! Everything here is total: model responses are arbitrary text, so
//! extraction and normalization degrade gracefully instead of failing.

use std::fmt;

/// Fence tags accepted as "this block is the script".
const CODE_FENCE_TAGS: [&str; 4] = ["python", "python3", "py", ""];

const FENCE: &str = "```";

/// The current attempt at an animation script.
///
/// Replaced wholesale on every repair round, never patched in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateScript(String);

impl CandidateScript {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Number of source lines, for progress reporting.
    pub fn lines_count(&self) -> usize {
        self.0.lines().count()
    }
}

impl fmt::Display for CandidateScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structural contract every generated script must meet.
///
/// Parameterizes the prompts and the local checks so one synthesizer
/// serves any scene-graph API with the same shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTemplate {
    /// Name of the scene class the renderer is pointed at
    pub scene_name: String,
    /// Base class the scene must inherit from
    pub base_class: String,
    /// Method the renderer calls to build the scene
    pub construct_method: String,
    /// Module name of the animation API
    pub module: String,
}

impl Default for ScriptTemplate {
    fn default() -> Self {
        Self {
            scene_name: "TheoremScene".to_string(),
            base_class: "Scene".to_string(),
            construct_method: "construct".to_string(),
            module: "manim".to_string(),
        }
    }
}

impl ScriptTemplate {
    /// The one import line every normalized script starts with.
    pub fn canonical_import(&self) -> String {
        format!("from {} import *", self.module)
    }

    /// Declaration of the scene entry point, e.g. `class TheoremScene(Scene):`.
    pub fn entry_point_declaration(&self) -> String {
        format!("class {}({}):", self.scene_name, self.base_class)
    }

    /// Whether a source line imports from the animation API.
    pub fn is_api_import(&self, line: &str) -> bool {
        let trimmed = line.trim();
        let from_prefix = format!("from {} import", self.module);
        if trimmed.starts_with(&from_prefix) {
            return true;
        }

        match trimmed.strip_prefix("import ") {
            Some(rest) => {
                let rest = rest.trim_start();
                rest == self.module
                    || rest
                        .strip_prefix(self.module.as_str())
                        .is_some_and(|tail| tail.starts_with(' ') || tail.starts_with(','))
            }
            None => false,
        }
    }
}

/// Extract the script from a model response.
///
/// Returns the trimmed interior of the first fence tagged as Python (or
/// untagged). Without such a fence, returns the trimmed response.
pub fn extract_code_block(text: &str) -> String {
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find(FENCE) {
        let open = search_from + offset;
        let after_fence = open + FENCE.len();
        let after_open = after_fence
            + text[after_fence..]
                .find(|c: char| c != ' ' && c != '\t')
                .unwrap_or(text.len() - after_fence);

        let tag_len = text[after_open..]
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-' || c == '+'))
            .unwrap_or(text.len() - after_open);
        let tag = &text[after_open..after_open + tag_len];
        let content_start = after_open + tag_len;

        let Some(close_offset) = text[content_start..].find(FENCE) else {
            break;
        };
        let close = content_start + close_offset;

        if CODE_FENCE_TAGS
            .iter()
            .any(|accepted| tag.eq_ignore_ascii_case(accepted))
        {
            return text[content_start..close].trim().to_string();
        }

        // Skip the whole foreign block, closing fence included.
        search_from = close + FENCE.len();
    }

    text.trim().to_string()
}

/// Replace every animation-API import with exactly one canonical import.
///
/// An import continued over several lines, in parentheses or after a
/// backslash, is removed as a whole.
///
/// Idempotent: normalizing normalized code yields the same text.
pub fn normalize_imports(code: &str, template: &ScriptTemplate) -> String {
    let canonical = template.canonical_import();

    let mut kept = Vec::new();
    let mut lines = code.trim().lines();
    while let Some(line) = lines.next() {
        if !template.is_api_import(line) {
            kept.push(line);
            continue;
        }

        let mut depth = 0;
        let mut continued = continues(line, &mut depth);
        while continued {
            match lines.next() {
                Some(next) => continued = continues(next, &mut depth),
                None => break,
            }
        }
    }

    let body = kept.join("\n");
    let body = body.trim_end();

    if body.trim().is_empty() {
        canonical
    } else {
        format!("{}\n{}", canonical, body)
    }
}

/// Whether the statement on `line` carries on to the next line.
///
/// `depth` is the open parenthesis count so far in the statement.
fn continues(line: &str, depth: &mut i32) -> bool {
    let code = line.split('#').next().unwrap_or_default();
    for c in code.chars() {
        match c {
            '(' => *depth += 1,
            ')' => *depth -= 1,
            _ => {}
        }
    }
    *depth > 0 || code.trim_end().ends_with('\\')
}

/// Whether the code declares the scene entry point.
///
/// Whitespace inside the declaration is ignored, and so is whatever follows
/// its colon (a comment or an inline body).
pub fn has_entry_point(code: &str, template: &ScriptTemplate) -> bool {
    let expected: String = template.entry_point_declaration().split_whitespace().collect();
    code.lines()
        .any(|line| line.split_whitespace().collect::<String>().starts_with(&expected))
}
