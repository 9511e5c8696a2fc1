use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::api::{ApiError, MatchApi};
use crate::state::{Delta, PredictionSlot, ProviderCommand, RequestId};

pub const FIXTURES_ERROR: &str = "Failed to load fixtures. Please try again later.";
pub const RESULTS_ERROR: &str = "Failed to load results. Please try again later.";
pub const MATCH_ERROR: &str = "Failed to load match details. Please try again later.";
pub const PREDICTION_ERROR: &str = "Failed to load prediction for this match.";

/// Run `api` on a worker thread. Only the newest queued command is served:
/// the screen keeps a single pending request, so anything queued before it is
/// already stale. The thread exits when either channel closes.
pub fn spawn_provider<A>(api: A, tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) -> JoinHandle<()>
where
    A: MatchApi + 'static,
{
    thread::spawn(move || {
        while let Ok(first) = cmd_rx.recv() {
            let mut cmd = first;
            let mut skipped = 0usize;
            for newer in cmd_rx.try_iter() {
                cmd = newer;
                skipped += 1;
            }
            if skipped > 0 {
                tracing::debug!(skipped, "superseded commands dropped");
            }
            for delta in run_command(&api, cmd) {
                if tx.send(delta).is_err() {
                    tracing::debug!("ui gone, provider stopping");
                    return;
                }
            }
        }
    })
}

pub fn run_command(api: &dyn MatchApi, cmd: ProviderCommand) -> Vec<Delta> {
    match cmd {
        ProviderCommand::FetchFixtures { request, matchday } => {
            match api.fetch_upcoming_fixtures(matchday) {
                Ok(batch) => vec![
                    Delta::Log(format!("[INFO] {} fixtures loaded", batch.fixtures.len())),
                    Delta::SetFixtures { request, batch },
                ],
                Err(err) => vec![
                    Delta::Log(format!("[WARN] Fixtures fetch error: {err}")),
                    Delta::RequestFailed {
                        request,
                        message: FIXTURES_ERROR.to_string(),
                    },
                ],
            }
        }
        ProviderCommand::FetchResults {
            request,
            offset,
            limit,
        } => match api.fetch_results(offset, limit) {
            Ok(batch) => vec![
                Delta::Log(format!(
                    "[INFO] Results {}..{} of {}",
                    offset,
                    offset as usize + batch.results.len(),
                    batch.total
                )),
                Delta::SetResults { request, batch },
            ],
            Err(err) => vec![
                Delta::Log(format!("[WARN] Results fetch error: {err}")),
                Delta::RequestFailed {
                    request,
                    message: RESULTS_ERROR.to_string(),
                },
            ],
        },
        ProviderCommand::FetchMatch { request, match_id } => fetch_match(api, request, &match_id),
    }
}

// Match first, then the prediction for its team pair; one delta covers both.
fn fetch_match(api: &dyn MatchApi, request: RequestId, match_id: &str) -> Vec<Delta> {
    let card = match api.fetch_match(match_id) {
        Ok(card) => card,
        Err(ApiError::NotFound(_)) => {
            return vec![
                Delta::Log(format!("[INFO] Match {match_id} not found")),
                Delta::MatchNotFound { request },
            ];
        }
        Err(err) => {
            return vec![
                Delta::Log(format!("[WARN] Match fetch error: {err}")),
                Delta::RequestFailed {
                    request,
                    message: MATCH_ERROR.to_string(),
                },
            ];
        }
    };

    let mut deltas = Vec::with_capacity(2);
    let prediction = match api.fetch_prediction(card.home.id, card.away.id) {
        Ok(prediction) => PredictionSlot::Ready(prediction),
        Err(err) => {
            deltas.push(Delta::Log(format!("[WARN] Prediction fetch error: {err}")));
            PredictionSlot::Failed(PREDICTION_ERROR.to_string())
        }
    };
    deltas.push(Delta::SetMatch {
        request,
        card,
        prediction,
    });
    deltas
}
