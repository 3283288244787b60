//! XP gamification.
//!
//! A challenge awards its `xp` once its proof is approved. Levels are every
//! [`XP_PER_LEVEL`] points, starting at level 1.

use crate::entities::{Application, ClassConfig, LearningChallenge};
use crate::responses::ProgressReport;

pub const XP_PER_LEVEL: u32 = 100;

#[must_use]
pub const fn level_for(xp: u32) -> u32 {
    xp / XP_PER_LEVEL + 1
}

/// Challenges open to this student: their quest set's, or every quest set's
/// when they applied to the default class.
fn visible_challenges<'a>(
    config: &'a ClassConfig,
    app: &Application,
) -> Vec<&'a LearningChallenge> {
    match app.quest_set_id.as_deref().and_then(|id| config.quest_set(id)) {
        Some(quest) => quest
            .modules
            .iter()
            .flat_map(|m| m.challenges.iter())
            .collect(),
        None => config.challenges().collect(),
    }
}

#[must_use]
pub fn progress_for(config: &ClassConfig, app: &Application) -> ProgressReport {
    let challenges = visible_challenges(config, app);

    let mut xp = 0u32;
    let mut approved = 0u32;
    let mut pending_review = Vec::new();
    for challenge in &challenges {
        if app.is_proof_approved(&challenge.id) {
            xp = xp.saturating_add(challenge.xp);
            approved += 1;
        } else if app.task_proofs.contains_key(&challenge.id) {
            pending_review.push(challenge.id.clone());
        }
    }

    ProgressReport {
        application_id: app.id.clone(),
        xp,
        level: level_for(xp),
        approved_challenges: approved,
        total_challenges: u32::try_from(challenges.len()).unwrap_or(u32::MAX),
        pending_review,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{LearningModule, ProofValue, QuestSet};
    use crate::enums::{ApplicationStatus, ProofStatus, ProofType};
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn challenge(id: &str, xp: u32) -> LearningChallenge {
        LearningChallenge {
            id: id.into(),
            title: id.into(),
            description: String::new(),
            xp,
            proof_type: ProofType::Text,
        }
    }

    fn config() -> ClassConfig {
        ClassConfig {
            quest_sets: vec![
                QuestSet {
                    id: "q1".into(),
                    title: "One".into(),
                    description: String::new(),
                    tasks: Vec::new(),
                    sessions: Vec::new(),
                    resources: Vec::new(),
                    modules: vec![LearningModule {
                        id: "m1".into(),
                        title: "M1".into(),
                        description: String::new(),
                        challenges: vec![challenge("c1", 60), challenge("c2", 70)],
                    }],
                },
                QuestSet {
                    id: "q2".into(),
                    title: "Two".into(),
                    description: String::new(),
                    tasks: Vec::new(),
                    sessions: Vec::new(),
                    resources: Vec::new(),
                    modules: vec![LearningModule {
                        id: "m2".into(),
                        title: "M2".into(),
                        description: String::new(),
                        challenges: vec![challenge("c3", 5)],
                    }],
                },
            ],
            ..ClassConfig::default()
        }
    }

    fn student(quest: Option<&str>) -> Application {
        Application {
            id: "stu000001".into(),
            email: "s@example.com".into(),
            full_name: "Student".into(),
            why_join: "xp".into(),
            task_proofs: BTreeMap::from([
                ("c1".into(), ProofValue::Text("done".into())),
                ("c2".into(), ProofValue::Text("done".into())),
            ]),
            status: ApplicationStatus::Approved,
            submitted_at: Utc::now(),
            admin_note: None,
            wave: 1,
            quest_set_id: quest.map(String::from),
            proof_statuses: BTreeMap::from([("c1".into(), ProofStatus::Approved)]),
        }
    }

    #[test]
    fn level_boundaries() {
        assert_eq!(level_for(0), 1);
        assert_eq!(level_for(99), 1);
        assert_eq!(level_for(100), 2);
        assert_eq!(level_for(250), 3);
    }

    #[test]
    fn only_approved_proofs_award_xp() {
        let report = progress_for(&config(), &student(Some("q1")));
        assert_eq!(report.xp, 60);
        assert_eq!(report.level, 1);
        assert_eq!(report.approved_challenges, 1);
        assert_eq!(report.total_challenges, 2);
        assert_eq!(report.pending_review, vec!["c2".to_string()]);
    }

    #[test]
    fn default_class_sees_every_challenge() {
        let report = progress_for(&config(), &student(None));
        assert_eq!(report.total_challenges, 3);
    }
}
