use crate::store::Bracket;
use crate::ContainerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The serialized picks: one entry per matchup in every container, `None`
/// where no winner is picked, plus the champion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    #[serde(flatten)]
    pub picks: BTreeMap<ContainerId, Vec<Option<String>>>,
    pub champion: Option<String>,
}

impl SubmissionPayload {
    pub fn from_bracket(bracket: &Bracket) -> Self {
        let picks = ContainerId::matchup_containers()
            .map(|id| {
                let names = bracket
                    .container(id)
                    .iter()
                    .map(|m| m.winning_team().map(|t| t.name.clone()))
                    .collect();
                (id, names)
            })
            .collect();
        Self { picks, champion: bracket.champion().name().map(str::to_string) }
    }

    pub fn pick_count(&self) -> usize {
        let picks = self.picks.values().flatten().filter(|p| p.is_some()).count();
        picks + usize::from(self.champion.is_some())
    }
}

/// Body of `POST /submit_bracket`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub user_id: Option<String>,
    pub bracket: SubmissionPayload,
}

/// Warnings shown before submitting an incomplete bracket, grouped per
/// container. Empty when every reached matchup and the champion are picked.
pub fn completeness_warnings(bracket: &Bracket) -> Vec<String> {
    let mut warnings: Vec<String> = bracket
        .missing_by_container()
        .into_iter()
        .map(|(id, count)| format!("{count} pick(s) missing in: {}", id.label()))
        .collect();
    if bracket.champion().team.is_none() {
        warnings.push("No National Champion selected.".to_string());
    }
    warnings
}
