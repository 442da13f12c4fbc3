/// Values sent to the model when asking for semantic matches.
pub const SEMANTIC_SAMPLE_LIMIT: usize = 20;

/// Prompt asking the model to judge each filtered record against the
/// guideline text and answer with a JSON array.
pub fn analysis_prompt(search_term: &str, filter_column: &str, pdf_text: &str, data_text: &str) -> String {
    format!(
        r#"Analyze the following filtered data related to '{search_term}' in the {filter_column} column and provide insights based on the guidelines.

Guidelines:
{pdf_text}

Filtered Data:
{data_text}

Provide the response in **JSON format** with the following structure:
- For each record, include all the original data fields
- Add TWO additional fields:
  1. "Meets Guidelines": MUST be exactly one of these string values:
     - "True" (fully or partially meets guidelines)
     - "False" (does not meet guidelines)
  2. "Notes on Compliance": A text explanation of your analysis.
- Ensure patient/record identifiers match exactly with the original data.
- Accuracy and data integrity are crucial for the analysis.
- Include any additional insights or recommendations based on the guidelines.
- You are a professional AI assistant specialized in medical data analysis.

Example output format (with the actual columns from the data):

[
    {{
        "column1": "value1",
        "column2": "value2",
        ...
        "Meets Guidelines": "True",
        "Notes on Compliance": "Treatment follows the guidelines for this condition."
    }},
    ...
]

Ensure accuracy in extracting and formatting the response while maintaining data integrity.
"#
    )
}

/// Prompt asking which of `values` relate to `search_term`.
pub fn semantic_match_prompt(search_term: &str, filter_column: &str, values: &[String]) -> String {
    let listed = serde_json::to_string(values).unwrap_or_default();
    format!(
        r#"I'm looking for records related to "{search_term}" in a medical database.
Below are some values from the {filter_column} column.

For each value, tell me if it is semantically equivalent to or related to "{search_term}".
Answer in JSON format as follows:

{{
    "matches": ["value1", "value2"],
    "explanation": "Brief explanation of the matches and equivalences"
}}

Values to check:
{listed}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_prompt_embeds_inputs() {
        let prompt = analysis_prompt("asthma", "DiseaseName", "Use inhaled steroids.", "ID DiseaseName\n 1 Asthma");
        assert!(prompt.contains("related to 'asthma' in the DiseaseName column"));
        assert!(prompt.contains("Use inhaled steroids."));
        assert!(prompt.contains("ID DiseaseName\n 1 Asthma"));
        assert!(prompt.contains("\"Meets Guidelines\""));
        assert!(prompt.contains("\"Notes on Compliance\""));
    }

    #[test]
    fn test_semantic_prompt_lists_values_as_json() {
        let prompt = semantic_match_prompt("diabetes", "DiseaseName", &["DM2".into(), "Asthma".into()]);
        assert!(prompt.contains(r#"["DM2","Asthma"]"#));
        assert!(prompt.contains(r#""matches""#));
    }
}
