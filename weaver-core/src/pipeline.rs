//! Pipeline stage specifications
//!
//! A pipeline is an ordered list of [`StageSpec`] values built per
//! invocation; there is no shared pipeline graph. Each stage declares the
//! prompt it sends, the fields its structured output must contain, and
//! whether that output contributes files to the final bundle.
//!
//! Stage prompts use `{placeholder}` substitution against the job's
//! parameters; only declared parameter keys are substituted, so JSON braces
//! inside the templates survive untouched. Prior stages' structured outputs
//! are appended as a context section, since later stages build on earlier
//! decisions.

use std::collections::HashMap;

use serde_json::Value;

use crate::domain::job::JobKind;
use crate::domain::stage::StageOutput;

/// How a stage's structured output contributes to the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEmit {
    /// Output is context only.
    Nothing,
    /// Output carries `filename` and `code` fields for a single file.
    File,
    /// Output carries a `files` array of `{filename, code}` objects.
    FileSet,
}

/// Declaration of one prompt/response step.
#[derive(Debug, Clone)]
pub struct StageSpec {
    pub name: &'static str,
    pub prompt_template: &'static str,
    pub expected_fields: &'static [&'static str],
    pub emit: StageEmit,
}

impl StageSpec {
    /// Render the stage prompt: substitute job parameters into the template
    /// and append the structured outputs of all prior stages.
    pub fn render_prompt(&self, params: &HashMap<String, Value>, prior: &[StageOutput]) -> String {
        let mut prompt = self.prompt_template.to_string();
        for (key, value) in params {
            prompt = prompt.replace(&format!("{{{key}}}"), &render_value(value));
        }

        let context: Vec<(&str, &Value)> = prior
            .iter()
            .filter_map(|s| s.structured_value.as_ref().map(|v| (s.name.as_str(), v)))
            .collect();
        if !context.is_empty() {
            prompt.push_str("\n\nContext from earlier stages:\n");
            for (name, value) in context {
                let pretty =
                    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
                prompt.push_str(&format!("\n## {name}\n```json\n{pretty}\n```\n"));
            }
        }

        prompt
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Build the stage list for a job kind.
pub fn pipeline_for(kind: JobKind) -> Vec<StageSpec> {
    match kind {
        JobKind::UiBundle => ui_pipeline(),
        JobKind::AgentBundle => agent_pipeline(),
    }
}

/// File names a finished bundle of this kind must contain.
pub fn required_files(kind: JobKind) -> &'static [&'static str] {
    match kind {
        JobKind::UiBundle => &["index.html", "styles.css", "app.js"],
        JobKind::AgentBundle => {
            &["main.py", "agents.py", "tasks.py", "crew.py", "README.md", "requirements.txt"]
        }
    }
}

/// Framework symbols expected somewhere in the bundle (advisory).
pub fn required_symbols(kind: JobKind) -> &'static [&'static str] {
    match kind {
        JobKind::UiBundle => &["<link rel=\"stylesheet\"", "<script src="],
        JobKind::AgentBundle => &["from crewai import", "Agent(", "Task(", "Crew("],
    }
}

/// Analyze -> design -> html -> css -> js. The last three stages each emit
/// one file.
fn ui_pipeline() -> Vec<StageSpec> {
    vec![
        StageSpec {
            name: "analyze-agent",
            prompt_template: "You are an expert analyst of AI agents and their interaction patterns.\n\
                Analyze this AI agent and determine the optimal UI/UX approach.\n\
                Agent description: {agent_description}\n\
                Agent capabilities: {agent_capabilities}\n\
                API integrations: {agent_api}\n\n\
                Return ONLY a JSON object with this exact shape:\n\
                {\"agent_type\": \"...\", \"key_capabilities\": [\"...\"], \"user_interaction_patterns\": [\"...\"], \"recommended_design_system\": \"...\"}",
            expected_fields: &[
                "agent_type",
                "key_capabilities",
                "user_interaction_patterns",
                "recommended_design_system",
            ],
            emit: StageEmit::Nothing,
        },
        StageSpec {
            name: "design-components",
            prompt_template: "You are a UI/UX designer for AI interfaces.\n\
                Design the interface for the agent analyzed above.\n\
                User preferences: {user_preferences}\n\
                If a custom_design preference is present, prioritize it over standard theme options.\n\n\
                Return ONLY a JSON object with this exact shape:\n\
                {\"components\": [\"...\"], \"layout_structure\": \"...\", \"interaction_model\": \"...\", \"design_tokens\": {\"colors\": {}, \"typography\": {}, \"spacing\": {}}}",
            expected_fields: &["components", "layout_structure", "interaction_model", "design_tokens"],
            emit: StageEmit::Nothing,
        },
        StageSpec {
            name: "generate-html",
            prompt_template: "You are a frontend developer. Create the HTML structure for the\n\
                interface designed above. The HTML must be semantic and accessible.\n\
                In <head>, include: <link rel=\"stylesheet\" href=\"styles.css\">\n\
                Before </body>, include: <script src=\"app.js\"></script>\n\
                Do not comment these tags out.\n\n\
                Return ONLY a JSON object: {\"filename\": \"index.html\", \"code\": \"...\", \"description\": \"...\"}\n\
                The code field must contain the complete HTML, properly escaped.",
            expected_fields: &["filename", "code"],
            emit: StageEmit::File,
        },
        StageSpec {
            name: "generate-css",
            prompt_template: "You are a frontend developer. Create the CSS for the interface,\n\
                implementing the design tokens (colors, typography, spacing) from the design stage.\n\
                Styles must be responsive and accessible.\n\n\
                Return ONLY a JSON object: {\"filename\": \"styles.css\", \"code\": \"...\", \"description\": \"...\"}\n\
                The code field must contain the complete CSS, properly escaped.",
            expected_fields: &["filename", "code"],
            emit: StageEmit::File,
        },
        StageSpec {
            name: "generate-js",
            prompt_template: "You are a frontend developer. Create the JavaScript implementing the\n\
                interaction model from the design stage, including user input handling and\n\
                rendering of agent responses.\n\n\
                Return ONLY a JSON object: {\"filename\": \"app.js\", \"code\": \"...\", \"description\": \"...\"}\n\
                The code field must contain the complete JavaScript, properly escaped.",
            expected_fields: &["filename", "code"],
            emit: StageEmit::File,
        },
    ]
}

/// Specify -> generate-files. The second stage emits the whole bundle as a
/// `files` array (source modules plus README.md and requirements.txt).
fn agent_pipeline() -> Vec<StageSpec> {
    vec![
        StageSpec {
            name: "specify-agent",
            prompt_template: "You are an AI agent architect.\n\
                Turn this idea into a concrete agent specification.\n\
                Idea: {idea}\n\
                Preferred name: {agent_name}\n\
                Goals: {goals}\n\
                Constraints: {constraints}\n\n\
                Return ONLY a JSON object with this exact shape:\n\
                {\"name\": \"...\", \"purpose\": \"...\", \"capabilities\": [\"...\"], \"inputs\": [\"...\"], \"outputs\": [\"...\"]}",
            expected_fields: &["name", "purpose", "capabilities", "inputs", "outputs"],
            emit: StageEmit::Nothing,
        },
        StageSpec {
            name: "generate-files",
            prompt_template: "You are a senior Python developer building a crewai agent from the\n\
                specification above. Generate every file of the bundle: main.py, agents.py,\n\
                tasks.py, crew.py, README.md and requirements.txt.\n\
                Use 'from crewai import Agent, Task, Crew' and define Agent(...), Task(...) and\n\
                Crew(...) instances.\n\n\
                Return ONLY a JSON object:\n\
                {\"files\": [{\"filename\": \"main.py\", \"code\": \"...\", \"description\": \"...\"}, ...]}\n\
                Every file goes in the files array; code fields must be complete and properly escaped.",
            expected_fields: &["files"],
            emit: StageEmit::FileSet,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stage::Strategy;
    use serde_json::json;

    fn params(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_ui_pipeline_shape() {
        let stages = pipeline_for(JobKind::UiBundle);
        assert_eq!(stages.len(), 5);
        assert_eq!(stages.iter().filter(|s| s.emit == StageEmit::File).count(), 3);
        assert_eq!(stages[0].name, "analyze-agent");
        assert_eq!(stages[4].name, "generate-js");
    }

    #[test]
    fn test_agent_pipeline_shape() {
        let stages = pipeline_for(JobKind::AgentBundle);
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[1].emit, StageEmit::FileSet);
        assert_eq!(stages[1].expected_fields, ["files"]);
    }

    #[test]
    fn test_render_substitutes_only_known_params() {
        let stage = &pipeline_for(JobKind::UiBundle)[0];
        let prompt = stage.render_prompt(
            &params(&[
                ("agent_description", json!("a travel planner")),
                ("agent_capabilities", json!(["booking", "search"])),
                ("agent_api", json!("none")),
            ]),
            &[],
        );
        assert!(prompt.contains("a travel planner"));
        assert!(prompt.contains("[\"booking\",\"search\"]"));
        // JSON braces in the schema example survive substitution.
        assert!(prompt.contains("{\"agent_type\""));
        assert!(!prompt.contains("{agent_description}"));
    }

    #[test]
    fn test_render_appends_prior_stage_context() {
        let stage = &pipeline_for(JobKind::UiBundle)[2];
        let prior = vec![StageOutput {
            stage_index: 0,
            name: "analyze-agent".to_string(),
            raw_text: String::new(),
            strategy: Strategy::DirectJson,
            structured_value: Some(json!({"agent_type": "travel"})),
        }];
        let prompt = stage.render_prompt(&HashMap::new(), &prior);
        assert!(prompt.contains("Context from earlier stages"));
        assert!(prompt.contains("## analyze-agent"));
        assert!(prompt.contains("\"agent_type\": \"travel\""));
    }

    #[test]
    fn test_failed_prior_stages_not_included_in_context() {
        let stage = &pipeline_for(JobKind::UiBundle)[1];
        let prior = vec![StageOutput {
            stage_index: 0,
            name: "analyze-agent".to_string(),
            raw_text: "garbage".to_string(),
            strategy: Strategy::None,
            structured_value: None,
        }];
        let prompt = stage.render_prompt(&HashMap::new(), &prior);
        assert!(!prompt.contains("Context from earlier stages"));
    }

    #[test]
    fn test_required_files_per_kind() {
        assert!(required_files(JobKind::UiBundle).contains(&"index.html"));
        assert!(required_files(JobKind::AgentBundle).contains(&"requirements.txt"));
        assert!(required_symbols(JobKind::AgentBundle).contains(&"Crew("));
    }
}
