/// Instruction block bound to a schema. `render` appends the window text in
/// the position the instructions refer to.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    instructions: String,
}

impl PromptTemplate {
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
        }
    }

    pub fn render(&self, chunk_text: &str) -> String {
        format!(
            "{}\n\nTEXT:\n{}\n\nJSON OUTPUT:",
            self.instructions, chunk_text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_places_window_text_after_instructions() {
        let template = PromptTemplate::new("Extract things.");
        let prompt = template.render("some window");

        assert!(prompt.starts_with("Extract things."));
        assert!(prompt.contains("TEXT:\nsome window"));
        assert!(prompt.ends_with("JSON OUTPUT:"));
    }
}
