//! Prompt templates.
//!
//! One parameterizable template set drives every model call. The script
//! shape (scene name, base class, construction method, import) comes from
//! the [`ScriptTemplate`], so the prompts and the local checks never drift
//! apart.
//!
//! Repair prompts are diagnostic: they carry the exact error text and the
//! full current script.

use ta_core::{IntuitionExplanation, ScriptTemplate, TheoremStatement};

/// API usage the model gets wrong often enough to warrant a reminder.
pub const API_USAGE_HINTS: &[&str] = &[
    "`ShowCreation` was removed; use `Create`.",
    "`TextMobject` and `TexMobject` were removed; use `Text`, `Tex` or `MathTex`.",
    "Constants (UP, DOWN, LEFT, RIGHT, IN, OUT, ORIGIN, PI, DEGREES) and colors come from the canonical import; do not import them separately.",
    "Colors are strings: either named constants such as BLUE or hex strings such as \"#58C4DD\".",
    "Shapes take keyword arguments: `Polygon(*points, color=...)`, `Triangle(color=...)`; `Triangle` takes no vertex arguments.",
    "Mobjects must be added with `self.add(...)` or introduced through an animation before they are transformed.",
    "Points are numpy arrays with three coordinates, e.g. `np.array([1, 0, 0])`.",
    "Only call methods that exist in Manim Community v0.18; e.g. `Polygon` has no `.angle` attribute.",
];

/// Builds every prompt of a run.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    template: ScriptTemplate,
}

impl PromptBuilder {
    pub fn new(template: ScriptTemplate) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &ScriptTemplate {
        &self.template
    }

    /// Ask for a visual explanation of the theorem.
    pub fn intuition_prompt(&self, theorem: &TheoremStatement) -> String {
        format!(
            r#"Explain the intuition behind this theorem in a way that is optimized for creating a visual animation.

Focus on:
- Geometric interpretations, spatial relationships and movement.
- The visual elements involved (points, lines, shapes, curves, vectors, areas) described concretely.
- How these objects interact, transform or evolve over time.
- Step-by-step visual clarity; avoid abstract statements with no visual counterpart.

Write 2-3 paragraphs that map easily onto a sequence of animation steps.

Theorem: {theorem}"#,
            theorem = theorem.as_str(),
        )
    }

    /// Ask for the first draft of the script.
    pub fn generation_prompt(&self, theorem: &TheoremStatement, intuition: &IntuitionExplanation) -> String {
        format!(
            r#"Write a Manim Community Edition (v0.18) script that animates the intuition of this theorem.

## REQUIREMENTS

1. Define exactly one scene: `{entry_point}`
2. Build the whole animation inside `def {construct}(self):`
3. Start the file with `{import}`; `import numpy as np` is allowed
4. Sequence animations with `self.play(...)` and end with `self.wait()`
5. Add every object to the scene, either with `self.add(...)` or through an animation

## API NOTES

{hints}

## TEMPLATE

```python
{skeleton}
```

## THEOREM

{theorem}

## INTUITION

{intuition}

Return ONLY the Python code in a ```python code block."#,
            entry_point = self.template.entry_point_declaration(),
            construct = self.template.construct_method,
            import = self.template.canonical_import(),
            hints = format_hints(),
            skeleton = self.skeleton(),
            theorem = theorem.as_str(),
            intuition = intuition.as_str(),
        )
    }

    /// Ask the model to check its own draft.
    pub fn review_prompt(&self, draft: &str) -> String {
        format!(
            r#"Review this Manim Community Edition (v0.18) script and return a corrected version.

Check for:
- Syntax errors
- Missing imports
- Wrong constructor arguments or methods that do not exist
- Objects that are used but never added to the scene
- Animation sequencing problems
- Deprecated features
- `{entry_point}` must be present, with the animation inside `{construct}`

## API NOTES

{hints}

## SCRIPT

```python
{draft}
```

Return ONLY the corrected Python code in a ```python code block."#,
            entry_point = self.template.entry_point_declaration(),
            construct = self.template.construct_method,
            hints = format_hints(),
            draft = draft,
        )
    }

    /// Ask for a fix of a structural (parse) error.
    pub fn syntax_fix_prompt(&self, code: &str, error: &str) -> String {
        format!(
            r#"This Manim script does not parse.

## ERROR

{error}

## SCRIPT

```python
{code}
```

## TASK

Fix the error above. Keep `{entry_point}` and the rest of the animation intact.

Return ONLY the fixed Python code in a ```python code block."#,
            error = error,
            code = code,
            entry_point = self.template.entry_point_declaration(),
        )
    }

    /// Ask for a fix of a render failure.
    pub fn render_repair_prompt(&self, code: &str, error: &str) -> String {
        format!(
            r#"Rendering this Manim Community Edition (v0.18) script failed.

## RENDER ERROR

{error}

## SCRIPT

```python
{code}
```

## API NOTES

{hints}

## TASK

Fix the script so that it renders. The error above tells you what failed.
Keep `{entry_point}` as the scene.

Return ONLY the fixed Python code in a ```python code block."#,
            error = error,
            code = code,
            hints = format_hints(),
            entry_point = self.template.entry_point_declaration(),
        )
    }

    /// Minimal script with the required shape.
    fn skeleton(&self) -> String {
        format!(
            "{import}\nimport numpy as np\n\n{entry_point}\n    def {construct}(self):\n        ...",
            import = self.template.canonical_import(),
            entry_point = self.template.entry_point_declaration(),
            construct = self.template.construct_method,
        )
    }
}

fn format_hints() -> String {
    API_USAGE_HINTS
        .iter()
        .map(|hint| format!("- {}", hint))
        .collect::<Vec<_>>()
        .join("\n")
}
