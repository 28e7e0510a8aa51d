mod common;

use common::sample_task;
use methodology_assistant::cache::ExplanationStore;
use methodology_assistant::db::Database;
use methodology_assistant::models::*;
use speculate2::speculate;

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "migrations" {
        it "can run twice" {
            db.migrate().expect("Second migration run failed");
            assert!(db.list_rule_explanations().unwrap().is_empty());
        }
    }

    describe "rule explanations" {
        describe "get_rule_explanation" {
            it "returns None for an unknown title" {
                let result = db.get_rule_explanation("No Such Rule").expect("Query failed");
                assert!(result.is_none());
            }

            it "returns what was stored" {
                db.put_rule_explanation("SLO Breach Rule", "Pause features.", "Reliability first.")
                    .expect("Failed to store");

                let found = db.get_rule_explanation("SLO Breach Rule")
                    .expect("Query failed")
                    .expect("Explanation should exist");

                assert_eq!(found.rule_description, "Pause features.");
                assert_eq!(found.explanation, "Reliability first.");
            }
        }

        describe "put_rule_explanation" {
            it "keeps one row per title" {
                db.put_rule_explanation("SLO Breach Rule", "v1", "first").unwrap();
                db.put_rule_explanation("SLO Breach Rule", "v2", "second").unwrap();

                let all = db.list_rule_explanations().unwrap();
                assert_eq!(all.len(), 1);
                assert_eq!(all[0].explanation, "second");
                assert_eq!(all[0].rule_description, "v2");
            }

            it "keeps the original created_at on overwrite" {
                let first = db.put_rule_explanation("SLO Breach Rule", "v1", "first").unwrap();
                let second = db.put_rule_explanation("SLO Breach Rule", "v2", "second").unwrap();

                assert_eq!(first.created_at, second.created_at);
            }

            it "treats titles as case-sensitive keys" {
                db.put_rule_explanation("Split Rule", "d", "upper").unwrap();
                db.put_rule_explanation("split rule", "d", "lower").unwrap();

                assert_eq!(db.list_rule_explanations().unwrap().len(), 2);
            }
        }

        describe "list_rule_explanations" {
            it "orders by title" {
                db.put_rule_explanation("SLO Breach Rule", "d", "e").unwrap();
                db.put_rule_explanation("Escalation Rule (P0 Blocked > 24h)", "d", "e").unwrap();
                db.put_rule_explanation("Split Rule (Task > 5 days)", "d", "e").unwrap();

                let titles: Vec<String> = db.list_rule_explanations()
                    .unwrap()
                    .into_iter()
                    .map(|e| e.rule_title)
                    .collect();

                assert_eq!(titles, vec![
                    "Escalation Rule (P0 Blocked > 24h)",
                    "SLO Breach Rule",
                    "Split Rule (Task > 5 days)",
                ]);
            }
        }

        describe "as an explanation store" {
            it "round-trips through the store trait" {
                let store: &dyn ExplanationStore = &db;
                store.put_explanation("SLO Breach Rule", "Pause features.", "Because.").unwrap();

                let found = store.get_explanation("SLO Breach Rule").unwrap().unwrap();
                assert_eq!(found.explanation, "Because.");
            }
        }
    }

    describe "generated task history" {
        describe "record_generated_task" {
            it "returns the stored record" {
                let record = db.record_generated_task(Stage::Plan, "Plan the release", &sample_task(3))
                    .expect("Failed to record");

                assert_eq!(record.stage, Stage::Plan);
                assert_eq!(record.user_goal, "Plan the release");
                assert_eq!(record.task, sample_task(3));
            }
        }

        describe "list_generated_tasks" {
            it "returns an empty list on a fresh database" {
                assert!(db.list_generated_tasks(None, None).unwrap().is_empty());
            }

            it "returns the newest record first" {
                let first = db.record_generated_task(Stage::Plan, "first", &sample_task(1)).unwrap();
                let second = db.record_generated_task(Stage::Plan, "second", &sample_task(2)).unwrap();

                let records = db.list_generated_tasks(None, None).unwrap();

                assert_eq!(records.len(), 2);
                assert_eq!(records[0].id, second.id);
                assert_eq!(records[1].id, first.id);
            }

            it "filters by stage" {
                db.record_generated_task(Stage::Plan, "a", &sample_task(1)).unwrap();
                db.record_generated_task(Stage::Verify, "b", &sample_task(2)).unwrap();
                db.record_generated_task(Stage::Plan, "c", &sample_task(3)).unwrap();

                let records = db.list_generated_tasks(Some(Stage::Plan), None).unwrap();

                assert_eq!(records.len(), 2);
                assert!(records.iter().all(|r| r.stage == Stage::Plan));
            }

            it "applies the limit" {
                for estimate in 1..=4 {
                    db.record_generated_task(Stage::Implement, "goal", &sample_task(estimate)).unwrap();
                }

                let records = db.list_generated_tasks(None, Some(2)).unwrap();

                assert_eq!(records.len(), 2);
                assert_eq!(records[0].task.estimate, 4);
            }

            it "preserves risk and priority" {
                let mut task = sample_task(2);
                task.risk = Risk::High;
                task.priority = Priority::P0;
                db.record_generated_task(Stage::Operate, "incident", &task).unwrap();

                let records = db.list_generated_tasks(None, None).unwrap();

                assert_eq!(records[0].task.risk, Risk::High);
                assert_eq!(records[0].task.priority, Priority::P0);
            }
        }
    }

    describe "on disk" {
        it "persists across reopen" {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("nested").join("methodology.db");

            {
                let disk = Database::open(path.clone()).unwrap();
                disk.migrate().unwrap();
                disk.put_rule_explanation("SLO Breach Rule", "d", "kept").unwrap();
            }

            let reopened = Database::open(path).unwrap();
            reopened.migrate().unwrap();
            let found = reopened.get_rule_explanation("SLO Breach Rule").unwrap().unwrap();
            assert_eq!(found.explanation, "kept");
        }
    }
}
