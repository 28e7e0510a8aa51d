//! Prompt construction for both generation flows.
//!
//! Pure string composition over the static catalogs: the same inputs always
//! produce byte-identical prompts.

use crate::catalog::SPLIT_RULE_TITLE;
use crate::models::{Priority, Risk, Stage, MAX_ESTIMATE, MIN_ESTIMATE};

/// A system prompt paired with the user turn that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Build the prompts asking for a single task for `goal` in `stage`.
///
/// The system prompt carries the stage goal, the Split Rule bound on
/// `estimate`, and the closed risk and priority sets. Input validation is
/// the caller's job; see [`crate::models::GenerationRequest`].
pub fn build_task_prompt(goal: &str, stage: Stage) -> Prompt {
    let mut system = String::with_capacity(1024);

    system.push_str(
        "You are a specialized methodology assistant. Your task is to generate a single, \
         concrete, and actionable development task based on the user's high-level goal, \
         ensuring it strictly adheres to the methodology principles.\n\n",
    );

    system.push_str("1. The generated task must fit the goal of the current stage.\n");
    system.push_str(&format!(
        "2. The task's estimate MUST be a number between {MIN_ESTIMATE} and {MAX_ESTIMATE}, \
         strictly respecting the '{SPLIT_RULE_TITLE}' (a task longer than {MAX_ESTIMATE} days \
         must be split into subtasks).\n"
    ));
    system.push_str("3. The output MUST be a valid JSON object matching the provided schema.\n\n");

    system.push_str(&format!(
        "Current Methodology Stage: {} ({})\n",
        stage.as_str(),
        stage.title()
    ));
    system.push_str(&format!("Stage Goal: {}\n\n", stage.goal()));

    let risks: Vec<&str> = Risk::ALL.iter().map(Risk::as_str).collect();
    system.push_str(&format!("Output Risk should be one of: {}.\n", risks.join(", ")));

    let priorities: Vec<String> = Priority::ALL
        .iter()
        .map(|p| format!("{} ({})", p.as_str(), p.label()))
        .collect();
    system.push_str(&format!(
        "Output Priority should be one of: {}. Use the bare code (e.g. \"P1\") in the output.",
        priorities.join(", ")
    ));

    let user = format!(
        "The current stage is \"{}\". I need a concrete, actionable task for the following \
         high-level objective: \"{}\". Generate the task details.",
        stage.as_str(),
        goal
    );

    Prompt { system, user }
}

/// Build the prompts asking for a natural-language explanation of a rule.
pub fn build_explanation_prompt(rule_title: &str, rule_text: &str) -> Prompt {
    let system = "You are a methodology expert. Your task is to provide a clear, concise \
                  explanation of why an adaptive rule is important in a professional working \
                  methodology. Explain the business value, technical implications, and how it \
                  helps teams maintain quality and velocity."
        .to_string();

    let user = format!(
        "Explain the following methodology rule and why it's important:\n\n\
         Rule: {rule_title}\n\
         Description: {rule_text}\n\n\
         Provide a 2-3 paragraph explanation with practical examples."
    );

    Prompt { system, user }
}
