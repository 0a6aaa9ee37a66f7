use tracing::{debug, error};

use crate::{
    giveaway::rewards::RewardReport,
    models::{error::GiveawayError, giveaway::GiveawayId},
};

/// Writes the outcome of a reward run to the operator logs. Failures are
/// never surfaced to users.
pub fn log_reward_report(id: &GiveawayId, report: &RewardReport) {
    let failures = report.failures();

    for (winner, step, reason) in &failures {
        let err = GiveawayError::Reward {
            id: id.clone(),
            step: *step,
            reason: (*reason).to_string(),
        };
        match winner {
            Some(winner) => error!("{} (winner {})", err, winner),
            None => error!("{}", err),
        }
    }

    debug!(
        "Rewarded {} winner(s) of giveaway {} with {} failed step(s)",
        report.winners.len(),
        id,
        failures.len()
    );
}
