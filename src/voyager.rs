//! Fixed-plan task executor.
//!
//! A task description is turned into a plan of subtasks. Each subtask runs a
//! bounded loop: snapshot the page, pick the next action by keyword rules,
//! perform it, record it. The loop ends early once an `extract` action runs.

use std::ops::Index;
use std::path::Path;
use std::time::Duration;

use chrono::Local;
use serde::{Deserialize, Serialize, Serializer};

use crate::action::{self, Action, ActionKind, ActionRecord, HistoryEntry};
use crate::automation::Automation;
use crate::error::{Error, Result};
use crate::snapshot::PageContent;

/// Lower bound on iterations per subtask, whatever its estimate.
pub const MIN_ACTIONS_PER_SUBTASK: u32 = 5;

const OUTLOOK_SIGNUP_URL: &str = "https://signup.live.com/";
const FALLBACK_URL: &str = "https://example.com/";
const EMAIL_INPUT: &str = "input[name='email']";

fn default_estimate() -> u32 {
    MIN_ACTIONS_PER_SUBTASK
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: u32,
    pub description: String,
    #[serde(default = "default_estimate")]
    pub estimated_browser_actions: u32,
}

impl Subtask {
    pub fn new(id: u32, description: impl Into<String>, estimated_browser_actions: u32) -> Self {
        Self {
            id,
            description: description.into(),
            estimated_browser_actions,
        }
    }

    /// Iteration bound for this subtask.
    pub fn max_actions(&self) -> u32 {
        self.estimated_browser_actions.max(MIN_ACTIONS_PER_SUBTASK)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPlan {
    pub task: String,
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub reasoning: String,
}

impl TaskPlan {
    /// The four-step navigate / fill / submit / extract plan.
    pub fn fixed(task: &str) -> Self {
        Self {
            task: task.to_string(),
            subtasks: vec![
                Subtask::new(1, format!("Navigate to the website related to {task}"), 1),
                Subtask::new(2, "Find and fill out registration form", 3),
                Subtask::new(3, "Submit form and handle confirmation", 2),
                Subtask::new(4, "Extract confirmation details or account info", 1),
            ],
            reasoning: format!(
                "To complete the task '{task}', we need to navigate to the relevant website, \
                 find and fill out forms, submit them, and extract any confirmation details."
            ),
        }
    }

    /// Parse a plan given inline (starting with `{`) or as a path to a JSON file.
    pub async fn load(source: &str) -> Result<Self> {
        let text = if source.trim_start().starts_with('{') {
            source.to_string()
        } else {
            tokio::fs::read_to_string(Path::new(source)).await?
        };
        let plan: TaskPlan = serde_json::from_str(&text)?;
        Ok(plan)
    }

    /// Upper bound on the history a run of this plan can produce.
    pub fn action_budget(&self) -> u32 {
        self.subtasks.iter().map(Subtask::max_actions).sum()
    }
}

/// Keyword rules standing in for a real planner.
///
/// Checked in order: `Navigate`, `Submit`, `Extract`, then `form`. The
/// `form` check must stay last since "confirmation" contains it. The rules
/// only look at the descriptions; `page` is there for a smarter selector.
pub fn select_next_action(task: &str, subtask: &str, _page: &PageContent) -> ActionRecord {
    if subtask.contains("Navigate") {
        return if task.to_lowercase().contains("outlook") {
            ActionRecord::new(
                Action::Navigate {
                    url: OUTLOOK_SIGNUP_URL.to_string(),
                },
                "Navigating to Outlook signup page",
            )
        } else {
            ActionRecord::new(
                Action::Navigate {
                    url: FALLBACK_URL.to_string(),
                },
                "Navigating to example page",
            )
        };
    }

    if subtask.contains("Submit") {
        return ActionRecord::new(
            Action::Submit {
                selector: "button[type='submit']".to_string(),
            },
            "Submitting the form",
        );
    }

    if subtask.contains("Extract") {
        return ActionRecord::new(
            Action::Extract {
                selector: ".confirmation-message".to_string(),
            },
            "Extracting confirmation message",
        );
    }

    if subtask.to_lowercase().contains("form") {
        return if subtask.contains("Find") {
            ActionRecord::new(
                Action::Click {
                    selector: EMAIL_INPUT.to_string(),
                },
                "Clicking on email input field",
            )
        } else {
            ActionRecord::new(
                Action::Type {
                    selector: EMAIL_INPUT.to_string(),
                    value: format!("test_user_{}@example.com", Local::now().format("%Y%m%d%H%M%S")),
                },
                "Typing email in the form",
            )
        };
    }

    ActionRecord::new(
        Action::Wait {
            selector: "body".to_string(),
        },
        "Waiting for page to load fully",
    )
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub action: ActionRecord,
    pub result: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtaskReport {
    pub description: String,
    pub actions_executed: u32,
    pub results: Vec<StepResult>,
}

/// Subtask reports keyed `subtask_<id>`, kept in the order they ran.
#[derive(Debug, Clone, Default)]
pub struct SubtaskReports(Vec<(String, SubtaskReport)>);

impl SubtaskReports {
    pub fn insert(&mut self, key: String, report: SubtaskReport) {
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = report,
            None => self.0.push((key, report)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&SubtaskReport> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Index<&str> for SubtaskReports {
    type Output = SubtaskReport;

    fn index(&self, key: &str) -> &SubtaskReport {
        match self.get(key) {
            Some(report) => report,
            None => panic!("no report for {key}"),
        }
    }
}

impl Serialize for SubtaskReports {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskReport {
    pub success: bool,
    pub message: String,
    pub data: SubtaskReports,
    pub history: Vec<HistoryEntry>,
}

/// Runs a [`TaskPlan`] against a page.
pub struct TaskExecutor<'a> {
    page: &'a dyn Automation,
    task: String,
    pause: Duration,
    history: Vec<HistoryEntry>,
}

impl<'a> TaskExecutor<'a> {
    pub fn new(page: &'a dyn Automation, task: impl Into<String>) -> Self {
        Self {
            page,
            task: task.into(),
            pause: Duration::from_secs(1),
            history: Vec::new(),
        }
    }

    /// Pause between iterations of a subtask (default: 1s).
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Build the fixed plan for the executor's task and run it.
    pub async fn execute_task(self) -> TaskReport {
        let plan = TaskPlan::fixed(&self.task);
        self.execute(plan).await
    }

    /// Run `plan` for the plan's own task. Failures end up in the report,
    /// never as a panic or `Err`.
    pub async fn execute(mut self, plan: TaskPlan) -> TaskReport {
        if !plan.task.is_empty() {
            self.task = plan.task.clone();
        }
        let mut report = TaskReport::default();

        match self.run(&plan, &mut report.data).await {
            Ok(()) => {
                report.success = true;
                report.message = format!("Successfully completed task: {}", self.task);
            }
            Err(e) => {
                tracing::error!("task failed: {e}");
                report.success = false;
                report.message = format!("Failed to complete task: {e}");
            }
        }

        report.history = self.history;
        report
    }

    async fn run(
        &mut self,
        plan: &TaskPlan,
        data: &mut SubtaskReports,
    ) -> Result<()> {
        if plan.subtasks.is_empty() {
            return Err(Error::InvalidTask("plan has no subtasks".to_string()));
        }

        tracing::info!(
            subtasks = plan.subtasks.len(),
            budget = plan.action_budget(),
            "created plan for task: {}",
            plan.task
        );

        for subtask in &plan.subtasks {
            tracing::info!("executing subtask {}: {}", subtask.id, subtask.description);

            let max_actions = subtask.max_actions();
            let mut actions_executed = 0;
            let mut results = Vec::new();

            while actions_executed < max_actions {
                let content = self.page_content().await;
                let next = select_next_action(&self.task, &subtask.description, &content);

                tracing::debug!(?next, "executing action");
                let entry = action::execute(self.page, &next).await;
                tracing::info!("action result: {}", entry.result);

                results.push(StepResult {
                    action: next.clone(),
                    result: entry.result.clone(),
                });
                self.history.push(entry);
                actions_executed += 1;

                if next.kind() == ActionKind::Extract {
                    break;
                }

                tokio::time::sleep(self.pause).await;
            }

            tracing::info!(
                "completed subtask {} after {} actions",
                subtask.id,
                actions_executed
            );
            data.insert(
                format!("subtask_{}", subtask.id),
                SubtaskReport {
                    description: subtask.description.clone(),
                    actions_executed,
                    results,
                },
            );
        }

        Ok(())
    }

    async fn page_content(&self) -> PageContent {
        match self.page.snapshot().await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("error getting page content: {e}");
                PageContent::unavailable(e)
            }
        }
    }
}
