/// Prompt templates for the decision agent.
///
/// Every template starts with the caller's base prompt. JSON context is
/// embedded pretty-printed.
pub struct AgentPrompts;

impl AgentPrompts {
    pub fn build_summary_decision_prompt(base: &str, stats_json: &str, query: &str) -> String {
        format!(
            r#"{base}
Log Statistics:
{stats}

User Query: {query}

Should a summary be generated?
- If generating a summary is not relevant or the query is specific (e.g. "filter for debug logs"), respond with: no: <brief explanation>.
- If additional context is needed and a summary would be helpful, respond with: yes: <brief explanation>

Respond with exactly one line in the following format:
yes: [brief explanation]
or
no: [brief explanation]

Do not include any extra text.
"#,
            base = base,
            stats = stats_json,
            query = query,
        )
    }

    pub fn build_summary_prompt(base: &str, stats_json: &str, query: &str) -> String {
        format!(
            r#"{base}
Log Statistics:
{stats}

User Query: {query}

Generate a summary of the log statistics. Respond with just the explanation:"#,
            base = base,
            stats = stats_json,
            query = query,
        )
    }

    pub fn build_issue_decision_prompt(base: &str, query: &str) -> String {
        format!(
            r#"{base}
User Query: {query}

Should I look for known issues in the logs?
- If the user query is specific (e.g. "generate me a summary", "filter for debug logs") and does not mention problems or issues, then respond with: no: [brief explanation].
- Only respond with yes if the query is asking for detecting issues or problems in the logs.
Respond in exactly one line in the following format (without any markdown or extra text):
yes: [brief explanation]
or
no: [brief explanation]
"#,
            base = base,
            query = query,
        )
    }

    pub fn build_issue_evaluation_prompt(
        base: &str,
        issue_name: &str,
        details_json: &str,
        similar_logs_json: &str,
        query: &str,
    ) -> String {
        format!(
            r#"{base}
Known Issue: "{issue}"
Issue Details:
{details}

Similar Logs (retrieved by a simple similarity search, so they are often not relevant):
{similar}

User Query: {query}

Based on the above, should this issue be flagged?
If yes, respond in the following format:
**Issue Summary**:
<ISSUE SUMMARY>
**Resolution**:
<RESOLUTION>
Else, respond with an empty string.
Note: if the details json does not have a logs field or the logs field is empty, respond with an empty string.
"#,
            base = base,
            issue = issue_name,
            details = details_json,
            similar = similar_logs_json,
            query = query,
        )
    }

    pub fn build_filter_decision_prompt(base: &str, query: &str, detected_json: &str) -> String {
        format!(
            r#"{base}
User Query: {query}

Issues Detected (with their keywords):
{detected}

Should I add a filter to refine the log output?
- If the query implies filtering (e.g. "show only errors", "filter out debug logs") or mentions keywords/regex, respond with: yes: [brief explanation].
- Also, if there are detected issues, their keywords are likely good filter terms.
- Otherwise, respond with: no: [brief explanation].
Respond in exactly one line in the following format:
yes: [brief explanation]
or
no: [brief explanation]
Do not include any extra text.
"#,
            base = base,
            query = query,
            detected = detected_json,
        )
    }

    pub fn build_filter_group_prompt(base: &str, query: &str, detected_json: &str) -> String {
        format!(
            r#"{base}
User Query: {query}

Issues Detected (with their keywords):
{detected}

Generate a filter group in JSON format with the following structure:
{{
  "title": string,
  "description": string,
  "filters": [
    {{
      "text": string,
      "regex": boolean,
      "caseSensitive": boolean,
      "color": string,
      "description": string
    }}
    // You may include additional filters if needed.
  ]
}}

Make sure to follow these guidelines:
- The title should be a short, descriptive name for the filter group.
- The description should be a brief explanation of the filter group.
- Each filter should have a text field with the keyword or regex pattern to match.
- The regex field should be true if the text is a regex pattern, false otherwise.
- The caseSensitive field should be true if the filter should be case-sensitive, false otherwise.
    - In most cases, it should be false to match case-insensitively.
- The color field should be a hex color code.
    - Matches are highlighted on a light gray background with black text, so pick a suitable highlight color.
    - Prefer light colors that are easy on the eyes.
    - Make sure colors are varied enough to distinguish between different filters.
- The description field should be a brief explanation of the filter, like a comment.

The filter group should capture the intent of the user's request in terms of log filtering. Do not include any extra text.
"#,
            base = base,
            query = query,
            detected = detected_json,
        )
    }
}
