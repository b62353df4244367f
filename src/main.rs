use std::io::{self, BufRead, Write};
use std::time::Instant;

use env_logger::Env;

use kinderreportd::ipc::{self, AppState, Request};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let mut state = AppState::new();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id; ignore.
                let _ = writeln!(
                    stdout,
                    "{{\"ok\":false,\"error\":{{\"code\":\"bad_json\",\"message\":\"{}\"}}}}",
                    e
                );
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req).await;
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();

        // The debounce slot is an explicit deadline, not an ambient timer:
        // it fires here once its window has elapsed, and the host can force
        // it early with sync.flush.
        if let Some(ctrl) = state.ctrl.as_mut() {
            if let Err(e) = ctrl.poll_pending(Instant::now()).await {
                log::warn!("deferred remote write failed: {}", e);
            }
        }
    }
}
