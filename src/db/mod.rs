mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::cache::ExplanationStore;
use crate::models::*;

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "methodology-assistant")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(dirs.data_dir().join("methodology.db"))
    }

    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Rule explanation operations
    // ============================================================

    pub fn get_rule_explanation(&self, rule_title: &str) -> Result<Option<RuleExplanation>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let explanation = conn
            .query_row(
                "SELECT rule_title, rule_description, explanation, created_at
                 FROM rule_explanations WHERE rule_title = ?",
                [rule_title],
                |row| {
                    Ok(RuleExplanation {
                        rule_title: row.get(0)?,
                        rule_description: row.get(1)?,
                        explanation: row.get(2)?,
                        created_at: parse_datetime(row.get::<_, String>(3)?),
                    })
                },
            )
            .optional()?;

        Ok(explanation)
    }

    /// Insert an explanation, replacing any existing one for the same title.
    ///
    /// Last write wins. `created_at` of an existing row is kept.
    pub fn put_rule_explanation(
        &self,
        rule_title: &str,
        rule_description: &str,
        explanation: &str,
    ) -> Result<RuleExplanation> {
        {
            let conn = self.conn.lock().expect("database lock poisoned");
            let now = Utc::now().to_rfc3339();

            conn.execute(
                "INSERT INTO rule_explanations (rule_title, rule_description, explanation, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)
                 ON CONFLICT(rule_title) DO UPDATE SET
                     rule_description = excluded.rule_description,
                     explanation = excluded.explanation,
                     updated_at = excluded.updated_at",
                (rule_title, rule_description, explanation, &now),
            )?;
        }

        self.get_rule_explanation(rule_title)?
            .ok_or_else(|| anyhow::anyhow!("Rule explanation vanished after write"))
    }

    pub fn list_rule_explanations(&self) -> Result<Vec<RuleExplanation>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT rule_title, rule_description, explanation, created_at
             FROM rule_explanations ORDER BY rule_title",
        )?;

        let explanations = stmt
            .query_map([], |row| {
                Ok(RuleExplanation {
                    rule_title: row.get(0)?,
                    rule_description: row.get(1)?,
                    explanation: row.get(2)?,
                    created_at: parse_datetime(row.get::<_, String>(3)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(explanations)
    }

    // ============================================================
    // Generated task history
    // ============================================================

    pub fn record_generated_task(
        &self,
        stage: Stage,
        user_goal: &str,
        task: &GeneratedTask,
    ) -> Result<GeneratedTaskRecord> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO generated_tasks (id, stage, user_goal, title, description, estimate, risk, priority, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                stage.as_str(),
                user_goal,
                &task.title,
                &task.description,
                task.estimate,
                task.risk.as_str(),
                task.priority.as_str(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(GeneratedTaskRecord {
            id,
            stage,
            user_goal: user_goal.to_string(),
            task: task.clone(),
            created_at: now,
        })
    }

    /// Most recent first, optionally filtered by stage.
    pub fn list_generated_tasks(
        &self,
        stage: Option<Stage>,
        limit: Option<u32>,
    ) -> Result<Vec<GeneratedTaskRecord>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, stage, user_goal, title, description, estimate, risk, priority, created_at
             FROM generated_tasks
             WHERE (?1 IS NULL OR stage = ?1)
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2",
        )?;

        // SQLite treats a negative LIMIT as "no limit".
        let limit = limit.map(i64::from).unwrap_or(-1);

        let rows = stmt
            .query_map((stage.map(|s| s.as_str()), limit), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, i64>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                    row.get::<_, String>(8)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(
                |(id, stage, user_goal, title, description, estimate, risk, priority, created_at)|
                 -> Result<GeneratedTaskRecord> {
                    Ok(GeneratedTaskRecord {
                        id: parse_uuid(id),
                        stage: Stage::from_str(&stage)
                            .ok_or_else(|| anyhow::anyhow!("Unknown stage in history: {}", stage))?,
                        user_goal,
                        task: GeneratedTask {
                            title,
                            description,
                            estimate,
                            risk: Risk::from_str(&risk)
                                .ok_or_else(|| anyhow::anyhow!("Unknown risk in history: {}", risk))?,
                            priority: Priority::from_str(&priority).ok_or_else(|| {
                                anyhow::anyhow!("Unknown priority in history: {}", priority)
                            })?,
                        },
                        created_at: parse_datetime(created_at),
                    })
                },
            )
            .collect()
    }
}

impl ExplanationStore for Database {
    fn get_explanation(&self, rule_title: &str) -> Result<Option<RuleExplanation>> {
        self.get_rule_explanation(rule_title)
    }

    fn put_explanation(
        &self,
        rule_title: &str,
        rule_description: &str,
        explanation: &str,
    ) -> Result<RuleExplanation> {
        self.put_rule_explanation(rule_title, rule_description, explanation)
    }
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
