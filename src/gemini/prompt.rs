const FULL_PROMPT: &str = r#"
You are a helpful assistant. The user gives you a course outline.
Please extract:
  1) The due dates for all exams
  2) The due dates for all assignments
  3) The class schedule (days/times)

Return ONLY valid JSON in the following structure, with no explanation,
no markdown and no text before or after it:

{
  "exams": [
    { "name": "Midterm Exam", "due_date": "YYYY-MM-DD" }
  ],
  "assignments": [
    { "name": "Assignment 1", "due_date": "YYYY-MM-DD" }
  ],
  "schedule": [
    { "day_of_week": "Monday", "time": "10:00am - 11:30am" }
  ]
}

Every due_date MUST use the YYYY-MM-DD format (for example 2025-10-20).
If any of these are missing from the outline, use an empty array for that field.

Here is the course outline:
-----------------------
{{outline}}
-----------------------
"#;

const SIMPLE_PROMPT: &str = r#"
List every exam and assignment with its due date from the course outline below.
Respond with JSON only, exactly in this shape:
{"exams": [{"name": "...", "due_date": "YYYY-MM-DD"}], "assignments": [{"name": "...", "due_date": "YYYY-MM-DD"}]}
Dates MUST be YYYY-MM-DD. Use [] when there are none.

Course outline:
-----------------------
{{outline}}
-----------------------
"#;

/// Which schema the model is asked to fill in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTemplate {
    /// Exams, assignments and the weekly schedule.
    Full,
    /// Exams and assignments only; used for the retry.
    Simplified,
}

impl PromptTemplate {
    fn template(&self) -> &'static str {
        match self {
            PromptTemplate::Full => FULL_PROMPT,
            PromptTemplate::Simplified => SIMPLE_PROMPT,
        }
    }

    pub fn build(&self, outline: &str) -> String {
        self.template().replacen("{{outline}}", outline, 1)
    }
}
