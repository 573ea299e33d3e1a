use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::JoinHandle;

use crate::backend::{Backend, Completion, Request};

/// Spawns the backend worker. Requests run one at a time in arrival order on
/// a dedicated thread, so the input loop never blocks on the filesystem; the
/// thread exits once every request sender is dropped.
pub fn spawn(
    backend: Box<dyn Backend>,
) -> (Sender<Request>, Receiver<Completion>, JoinHandle<()>) {
    let (request_tx, request_rx) = channel::<Request>();
    let (completion_tx, completion_rx) = channel::<Completion>();

    let handle = std::thread::spawn(move || {
        while let Ok(request) = request_rx.recv() {
            let completion = serve(backend.as_ref(), request);
            if completion_tx.send(completion).is_err() {
                // Receiver gone means the app is shutting down.
                break;
            }
        }
        tracing::debug!("backend worker stopped");
    });

    (request_tx, completion_rx, handle)
}

fn serve(backend: &dyn Backend, request: Request) -> Completion {
    match request {
        Request::Listing { token, path, limit } => {
            let result = backend.list_directory(&path, limit);
            Completion::Listing {
                token,
                path,
                result,
            }
        }
        Request::Volumes { token } => Completion::Volumes {
            token,
            result: backend.list_volumes(),
        },
        Request::Mutate { id, done, ops } => {
            let mut result = Ok(());
            for op in &ops {
                if let Err(err) = op.run(backend) {
                    // Stop at the first failure; later ops never run.
                    result = Err(err);
                    break;
                }
            }
            Completion::Mutate { id, done, result }
        }
        Request::Launch { op } => Completion::Launch {
            result: op.run(backend),
        },
    }
}
