use std::sync::Arc;

use log::{debug, info, warn};

use crate::error::{ErrorCode, PushError};
use crate::pushrelay::backend::BackendService;
use crate::pushrelay::net::connection::{Session, SessionView};
use crate::pushrelay::net::protocol::{Request, Response};
use crate::pushrelay::service::WebPushService;

pub const REPORT_READY_TITLE: &str = "Message from your push relay";
pub const REPORT_READY_BODY: &str = "Heavy Work is ready, so please come back!";

/// Dispatches control requests to the push service and the backend
pub struct CommandHandler {
    pub push: Arc<WebPushService>,
    pub backend: Arc<BackendService>,
}

impl CommandHandler {
    pub fn new(push: Arc<WebPushService>, backend: Arc<BackendService>) -> Self {
        Self { push, backend }
    }

    /// Called for every non-empty line a session sends
    pub async fn handle_line(&self, session: &Session, line: &str) {
        let response = match Request::parse(line) {
            Ok(request) => self.handle(session, request).await,
            Err(e) => {
                let reason = e.code().map(|code| code.description()).unwrap_or("unparseable request");
                warn!("Rejected request from session {} ({}): {}", session.id(), reason, e);
                Some(Response::from_error(&e))
            }
        };
        if let Some(response) = response {
            session.send(response);
        }
    }

    /// Returns the immediate response, if any; late results go through the
    /// session's UI executor
    pub async fn handle(&self, session: &Session, request: Request) -> Option<Response> {
        match request {
            Request::Subscribe { subscription } => Some(match self.push.store(subscription) {
                Ok(()) => Response::Ok,
                Err(e) => Response::from_error(&e),
            }),
            Request::Unsubscribe { subscription } => {
                self.push.remove(&subscription);
                Some(Response::Ok)
            }
            Request::Restore { subscription } => Some(match self.push.restore(subscription) {
                Ok(stored) => Response::Restored { stored },
                Err(e) => Response::from_error(&e),
            }),
            Request::Status => Some(Response::Status {
                subscriptions: self.push.registry().len(),
                empty: self.push.is_empty(),
            }),
            Request::Fetch => {
                self.start_fetch(session);
                Some(Response::pending("fetch"))
            }
            Request::Report { notify } => {
                self.start_report(session, notify);
                None
            }
            Request::Notify { title, body, url, data } => {
                let report = match url {
                    Some(url) => self.push.notify_all_with_url(&title, &body, &url).await,
                    None => self.push.notify_all(&title, &body, data).await,
                };
                Some(Response::Broadcast(report))
            }
        }
    }

    fn start_fetch(&self, session: &Session) {
        debug!("Session {} starts slow fetch", session.id());
        let session_id = session.id();
        let done = self.backend.fetch_slowly().then_accept(session.ui(), |result, view: &mut SessionView| {
            match result {
                Ok(text) => view.send(Response::Fetched { text }),
                Err(e) => view.send(Response::from_error(&e)),
            }
        });
        tokio::spawn(async move {
            match done.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => info!("Session {} closed before its fetch was ready: {}", session_id, e),
                Err(e) => warn!("Fetch continuation for session {} failed: {}", session_id, e),
            }
        });
    }

    /// Generates the report and, once it is ready, notifies every
    /// subscriber before showing the result in the session
    fn start_report(&self, session: &Session, notify: bool) {
        let backend = self.backend.clone();
        let push = self.push.clone();
        let ui = session.ui().clone();

        let queued = session.ui().access(move |view: &mut SessionView| {
            if view.busy {
                view.send(Response::from_error(&PushError::new(
                    ErrorCode::Busy,
                    "A report is already being generated",
                )));
                return;
            }
            view.busy = true;
            view.send(Response::pending("report"));

            let completion = backend.generate_sales_report();
            let session_id = view.id;
            tokio::spawn(async move {
                let result = completion.wait().await;
                let broadcast = match (&result, notify) {
                    (Ok(_), true) => Some(
                        push.notify_all_with_url(REPORT_READY_TITLE, REPORT_READY_BODY, push.default_url())
                            .await,
                    ),
                    _ => None,
                };

                let delivered = ui.access(move |view: &mut SessionView| {
                    view.busy = false;
                    match result {
                        Ok(records) => view.send(Response::Report { records, broadcast }),
                        Err(e) => view.send(Response::from_error(&e)),
                    }
                });
                if delivered.is_err() {
                    info!("Session {} closed before its report was ready", session_id);
                }
            });
        });

        if let Err(e) = queued {
            warn!("Could not start report for session {}: {}", session.id(), e);
        }
    }
}
