use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use fb_controls::{Evaluator, SimulationRequest, SimulationResult};

struct EvalJob {
    generation: u64,
    request: SimulationRequest,
}

#[derive(Debug, Clone)]
pub enum WorkerMessage {
    Complete {
        generation: u64,
        result: SimulationResult,
        elapsed_s: f64,
    },
    Error {
        generation: u64,
        message: String,
    },
}

impl WorkerMessage {
    pub fn generation(&self) -> u64 {
        match self {
            WorkerMessage::Complete { generation, .. }
            | WorkerMessage::Error { generation, .. } => *generation,
        }
    }
}

/// Long-lived evaluation thread. Jobs queued while an evaluation is running
/// are coalesced: only the newest is evaluated next.
pub struct RunWorker {
    job_tx: Sender<EvalJob>,
    pub result_rx: Receiver<WorkerMessage>,
    _handle: JoinHandle<()>,
}

impl RunWorker {
    /// `notify` runs after every message sent, typically a repaint request.
    pub fn start(evaluator: Arc<dyn Evaluator>, notify: impl Fn() + Send + 'static) -> Self {
        let (job_tx, job_rx) = channel::<EvalJob>();
        let (tx, rx) = channel();

        let handle = thread::spawn(move || {
            while let Ok(mut job) = job_rx.recv() {
                while let Ok(newer) = job_rx.try_recv() {
                    job = newer;
                }

                let started = Instant::now();
                let msg = match evaluator.evaluate(&job.request) {
                    Ok(result) => WorkerMessage::Complete {
                        generation: job.generation,
                        result,
                        elapsed_s: started.elapsed().as_secs_f64(),
                    },
                    Err(e) => WorkerMessage::Error {
                        generation: job.generation,
                        message: e.to_string(),
                    },
                };

                if tx.send(msg).is_err() {
                    break;
                }
                notify();
            }
            tracing::debug!("evaluation worker stopped");
        });

        Self {
            job_tx,
            result_rx: rx,
            _handle: handle,
        }
    }

    pub fn submit(&self, generation: u64, request: SimulationRequest) {
        if self
            .job_tx
            .send(EvalJob {
                generation,
                request,
            })
            .is_err()
        {
            tracing::warn!(generation, "evaluation worker is gone, request dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fb_controls::{FeedbackEvaluator, FeedbackParams, ParamKind};
    use std::time::Duration;

    #[test]
    fn last_submitted_generation_is_always_answered() {
        let worker = RunWorker::start(Arc::new(FeedbackEvaluator::default()), || {});
        for generation in 1..=5 {
            let params = FeedbackParams::default().with(ParamKind::Gain, generation as f64);
            worker.submit(generation, SimulationRequest::default().with_params(params));
        }

        let mut last = None;
        while last != Some(5) {
            let msg = worker
                .result_rx
                .recv_timeout(Duration::from_secs(10))
                .unwrap();
            assert!(last.is_none_or(|l| msg.generation() > l));
            last = Some(msg.generation());
        }
    }

    #[test]
    fn invalid_request_comes_back_as_error() {
        let worker = RunWorker::start(Arc::new(FeedbackEvaluator::default()), || {});
        worker.submit(1, SimulationRequest::new(0.0, 100, FeedbackParams::default()));

        let msg = worker
            .result_rx
            .recv_timeout(Duration::from_secs(10))
            .unwrap();
        assert!(matches!(msg, WorkerMessage::Error { generation: 1, .. }));
    }
}
