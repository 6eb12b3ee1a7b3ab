//! Shared fixtures for unit tests: a sample export and a local export server.

use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::broadcast::{error::TryRecvError, Receiver};

use crate::api::logs::LogEntry;

pub(crate) const EXPORT_HEADER: &str = "User ID,First Name,Last Name,Middle Name,Class ID,Course ID,Title,Start Date/Time,End Date/Time,Venue,Instructor First Name,Instructor Last Name";

/// Four rows: two students in C1 on Sunday 2024-07-14, one in C2 on Monday,
/// one with an unparseable start time.
pub(crate) fn sample_export() -> String {
    format!(
        "{EXPORT_HEADER}\n\
         U1,Ada,Lovelace,,C1,CS101,Intro,7/14/2024 09:00:00 GMT/BST,7/14/2024 10:00:00 GMT/BST,Room 1,Alan,Turing\n\
         U2,Grace,Hopper,B,C1,CS101,Intro,7/14/2024 09:00:00 GMT/BST,7/14/2024 10:00:00 GMT/BST,Room 1,Alan,Turing\n\
         U3,Edsger,Dijkstra,W,C2,CS201,Algorithms,7/15/2024 13:00:00 EST/EDT,7/15/2024 14:30:00 EST/EDT,Lab 2,Barbara,Liskov\n\
         U4,Linus,Torvalds,,C3,CS301,Kernels,TBD,TBD,Lab 3,Ken,Thompson\n"
    )
}

/// Bind a router on an ephemeral local port and serve it in the background.
pub(crate) async fn spawn_router(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Serve `body` at `/export.csv` and a never-in-time response at `/slow.csv`.
/// Any other path answers 404. Returns the base URL.
pub(crate) async fn serve_export(body: String) -> String {
    let router = Router::new()
        .route("/export.csv", get(move || async move { body }))
        .route(
            "/slow.csv",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "too late"
            }),
        );

    format!("http://{}", spawn_router(router).await)
}

/// Everything currently buffered on a log subscription, skipping over lag.
pub(crate) fn drain_logs(rx: &mut Receiver<LogEntry>) -> Vec<LogEntry> {
    let mut entries = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(entry) => entries.push(entry),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => return entries,
        }
    }
}
