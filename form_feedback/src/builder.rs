pub use crate::model::*;

/// A builder for authoring forms.
///
/// The question ids are assigned in sequence starting from 1, and the order of the
/// questions follows the order in which they are added.
///
/// ```
/// use form_feedback::builder::{split_options, FormBuilder};
/// # use form_feedback::FormError;
///
/// let mut builder = FormBuilder::new("Conference feedback")
///     .description("Two minutes, promised");
///
/// builder.add_text_question("What was your favorite talk?", true);
/// builder.add_choice_question("Will you come back next year?", &split_options("Yes, No, Maybe"), false);
///
/// let form = builder.build()?;
/// assert_eq!(form.questions.len(), 2);
///
/// # Ok::<(), FormError>(())
/// ```
pub struct Builder {
    pub(crate) _id: FormId,
    pub(crate) _title: String,
    pub(crate) _description: Option<String>,
    pub(crate) _questions: Vec<Question>,
}

pub type FormBuilder = Builder;

impl Builder {
    pub fn new(title: &str) -> Builder {
        Builder {
            _id: FormId::new_random(),
            _title: title.to_string(),
            _description: None,
            _questions: Vec::new(),
        }
    }

    /// Uses a fixed id instead of a random one.
    pub fn id(self, id: FormId) -> Builder {
        Builder { _id: id, ..self }
    }

    pub fn description(self, description: &str) -> Builder {
        let d = description.trim();
        Builder {
            _description: if d.is_empty() {
                None
            } else {
                Some(d.to_string())
            },
            ..self
        }
    }

    pub fn add_text_question(&mut self, text: &str, is_required: bool) -> QuestionId {
        self.add_question(text, QuestionKind::Text, is_required)
    }

    /// Adds a single choice question.
    ///
    /// The options are trimmed and the blank ones are dropped. An empty list of options
    /// is accepted, but no respondent will be able to answer such a question.
    pub fn add_choice_question(
        &mut self,
        text: &str,
        options: &[String],
        is_required: bool,
    ) -> QuestionId {
        let options: Vec<String> = options
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .map(|o| o.to_string())
            .collect();
        self.add_question(text, QuestionKind::MultipleChoice { options }, is_required)
    }

    fn add_question(&mut self, text: &str, kind: QuestionKind, is_required: bool) -> QuestionId {
        let order = self._questions.len() as u32;
        let id = QuestionId(order + 1);
        self._questions.push(Question {
            id,
            text: text.trim().to_string(),
            kind,
            is_required,
            order,
        });
        id
    }

    /// Assembles the form and checks its structure.
    pub fn build(self) -> Result<Form, FormError> {
        let form = Form {
            id: self._id,
            title: self._title.trim().to_string(),
            description: self._description,
            is_active: true,
            questions: self._questions,
        };
        form.check()?;
        Ok(form)
    }
}

/// Parses a list of options typed by an operator as comma-separated values.
///
/// Each option is trimmed, and the blank options are dropped.
pub fn split_options(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
