//! The palette refresh pipeline:
//!
//! ```text
//! FETCH → TRANSFORM → WRITE_REMOTE → NOTIFY → DONE
//! ```
//!
//! Strictly sequential. The first failing stage ends the run and becomes a
//! [`StageFailure`]; nothing is retried. Running twice writes twice.

use crate::color_api::{ColorModelRequest, ColormindClient, PaletteSource};
use crate::config::{Config, NotifyConfig, NotifyPolicy};
use crate::env::Env;
use crate::error::{PaletteError, Result};
use crate::notify::{Notifier, TwilioNotifier};
use crate::palette::{transform, Palette};
use crate::response::InvocationResponse;
use crate::writer::{self, RemoteContentWriter, WriteReceipt};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Stage / outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Fetch,
    Transform,
    WriteRemote,
    Notify,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::Transform => "transform",
            Stage::WriteRemote => "write_remote",
            Stage::Notify => "notify",
        }
    }
}

/// The stage that ended a run, and whatever the run had produced by then.
#[derive(Debug)]
pub struct StageFailure {
    pub stage: Stage,
    pub error: PaletteError,
    pub palette: Option<Palette>,
    /// Set when the write landed but a later stage failed.
    pub receipt: Option<WriteReceipt>,
}

#[derive(Debug)]
pub enum RefreshOutcome {
    Completed {
        palette: Palette,
        receipt: WriteReceipt,
        notified: bool,
    },
    Failed(StageFailure),
}

impl RefreshOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RefreshOutcome::Completed { .. })
    }

    pub fn response(&self) -> InvocationResponse {
        match self {
            RefreshOutcome::Completed { .. } => InvocationResponse::success(),
            RefreshOutcome::Failed(StageFailure {
                stage: Stage::Fetch,
                error:
                    PaletteError::Upstream {
                        status,
                        status_text,
                    },
                ..
            }) => InvocationResponse::upstream(*status, status_text),
            RefreshOutcome::Failed(failure) => {
                InvocationResponse::failure(&failure.error.to_string(), Some(failure.stage.as_str()))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Refresher
// ---------------------------------------------------------------------------

pub struct Refresher {
    source: Box<dyn PaletteSource>,
    writer: Box<dyn RemoteContentWriter>,
    request: ColorModelRequest,
    notifier: Option<Box<dyn Notifier>>,
    policy: NotifyPolicy,
    success_message: String,
    failure_message: String,
}

impl Refresher {
    /// A pipeline with a default colour request and no notifications.
    pub fn new(source: Box<dyn PaletteSource>, writer: Box<dyn RemoteContentWriter>) -> Self {
        let messages = NotifyConfig::default();
        Self {
            source,
            writer,
            request: ColorModelRequest::default(),
            notifier: None,
            policy: NotifyPolicy::Never,
            success_message: messages.success_message,
            failure_message: messages.failure_message,
        }
    }

    pub fn with_request(mut self, request: ColorModelRequest) -> Self {
        self.request = request;
        self
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>, config: &NotifyConfig) -> Self {
        self.notifier = Some(notifier);
        self.policy = config.policy;
        self.success_message = config.success_message.clone();
        self.failure_message = config.failure_message.clone();
        self
    }

    /// Wire the whole pipeline from config. The config is validated and every
    /// credential resolved here, so bad or missing settings fail before any
    /// network call.
    pub fn from_config(config: &Config, env: &Env) -> Result<Self> {
        config.ensure_valid()?;
        let writer = writer::build(config, env)?;
        Self::from_config_with_writer(config, env, writer)
    }

    /// Same as [`Refresher::from_config`] with a caller-supplied writer.
    pub fn from_config_with_writer(
        config: &Config,
        env: &Env,
        writer: Box<dyn RemoteContentWriter>,
    ) -> Result<Self> {
        config.ensure_valid()?;
        let source = Box::new(ColormindClient::new(config.color_api.url.clone()));
        let mut refresher = Self::new(source, writer).with_request(config.color_api.request());
        if config.notify.policy != NotifyPolicy::Never {
            let notifier = TwilioNotifier::from_config(&config.notify, env)?;
            refresher = refresher.with_notifier(Box::new(notifier), &config.notify);
        }
        Ok(refresher)
    }

    pub fn run(&self) -> RefreshOutcome {
        tracing::info!("fetching color model");
        let response = match self.source.fetch(&self.request) {
            Ok(r) => r,
            Err(e) => return fail(Stage::Fetch, e, None, None),
        };

        let palette = match transform(&response) {
            Ok(p) => p,
            Err(e) => return fail(Stage::Transform, e, None, None),
        };

        tracing::info!(target = %self.writer.target(), "attempting to write new palette to remote");
        let receipt = match self.writer.write(&palette) {
            Ok(r) => r,
            Err(e) => {
                self.report_failure(&e);
                return fail(Stage::WriteRemote, e, Some(palette), None);
            }
        };

        let mut notified = false;
        if let Some(notifier) = self.notifier.as_deref().filter(|_| self.policy.on_success()) {
            if let Err(e) = notifier.notify(&self.success_message) {
                return fail(Stage::Notify, e, Some(palette), Some(receipt));
            }
            notified = true;
        }

        tracing::info!(commit = ?receipt.commit, notified, "palette refresh complete");
        RefreshOutcome::Completed {
            palette,
            receipt,
            notified,
        }
    }

    /// Best-effort failure ping; its own failure is logged and dropped so the
    /// write error stays the reported outcome.
    fn report_failure(&self, error: &PaletteError) {
        let Some(notifier) = self.notifier.as_deref().filter(|_| self.policy.on_failure()) else {
            return;
        };
        let message = format!("{}: {error}", self.failure_message);
        if let Err(e) = notifier.notify(&message) {
            tracing::warn!(error = %e, "failed to send failure notification");
        }
    }
}

fn fail(
    stage: Stage,
    error: PaletteError,
    palette: Option<Palette>,
    receipt: Option<WriteReceipt>,
) -> RefreshOutcome {
    tracing::error!(stage = stage.as_str(), %error, "palette refresh failed");
    RefreshOutcome::Failed(StageFailure {
        stage,
        error,
        palette,
        receipt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GitStage;
    use crate::notify::MessageReceipt;
    use crate::palette::ColorModelResponse;
    use std::cell::RefCell;
    use std::rc::Rc;

    // -----------------------------------------------------------------------
    // Stubs
    // -----------------------------------------------------------------------

    struct StubSource {
        status: Option<u16>,
        colors: usize,
        calls: Rc<RefCell<usize>>,
    }

    impl PaletteSource for StubSource {
        fn fetch(&self, _request: &ColorModelRequest) -> Result<ColorModelResponse> {
            *self.calls.borrow_mut() += 1;
            if let Some(status) = self.status {
                return Err(PaletteError::Upstream {
                    status,
                    status_text: "Service Unavailable".into(),
                });
            }
            let triple = vec![serde_json::Number::from(1); 3];
            Ok(ColorModelResponse {
                result: vec![triple; self.colors],
            })
        }
    }

    struct StubWriter {
        fail: bool,
        writes: Rc<RefCell<Vec<Palette>>>,
    }

    impl RemoteContentWriter for StubWriter {
        fn write(&self, palette: &Palette) -> Result<WriteReceipt> {
            self.writes.borrow_mut().push(palette.clone());
            if self.fail {
                return Err(PaletteError::Git {
                    stage: GitStage::Push,
                    source: git2::Error::from_str("rejected"),
                });
            }
            Ok(WriteReceipt::new("stub", "palette.ts", Some("c0ffee".into())))
        }

        fn target(&self) -> String {
            "stub".into()
        }
    }

    struct StubNotifier {
        fail: bool,
        messages: Rc<RefCell<Vec<String>>>,
    }

    impl Notifier for StubNotifier {
        fn notify(&self, message: &str) -> Result<MessageReceipt> {
            self.messages.borrow_mut().push(message.to_string());
            if self.fail {
                return Err(PaletteError::Notify("401: Authenticate".into()));
            }
            Ok(MessageReceipt { sid: "SM1".into() })
        }
    }

    #[derive(Default)]
    struct Harness {
        fetches: Rc<RefCell<usize>>,
        writes: Rc<RefCell<Vec<Palette>>>,
        messages: Rc<RefCell<Vec<String>>>,
    }

    impl Harness {
        fn refresher(
            &self,
            status: Option<u16>,
            colors: usize,
            write_fails: bool,
            notify_fails: bool,
            policy: NotifyPolicy,
        ) -> Refresher {
            let source = StubSource {
                status,
                colors,
                calls: self.fetches.clone(),
            };
            let writer = StubWriter {
                fail: write_fails,
                writes: self.writes.clone(),
            };
            let notifier = StubNotifier {
                fail: notify_fails,
                messages: self.messages.clone(),
            };
            let config = NotifyConfig {
                policy,
                ..NotifyConfig::default()
            };
            Refresher::new(Box::new(source), Box::new(writer))
                .with_notifier(Box::new(notifier), &config)
        }
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[test]
    fn success_writes_once_and_notifies_once() {
        let h = Harness::default();
        let outcome = h
            .refresher(None, 5, false, false, NotifyPolicy::OnSuccess)
            .run();

        assert_eq!(outcome.response(), InvocationResponse::success());
        assert_eq!(h.writes.borrow().len(), 1);
        assert_eq!(*h.messages.borrow(), vec!["Palette refresh successful"]);
        match outcome {
            RefreshOutcome::Completed {
                palette, notified, ..
            } => {
                assert!(notified);
                assert_eq!(palette.main_brand, "1,1,1");
            }
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[test]
    fn upstream_status_passes_through_without_writing() {
        let h = Harness::default();
        let outcome = h
            .refresher(Some(503), 5, false, false, NotifyPolicy::Always)
            .run();

        let response = outcome.response();
        assert_eq!(response.status_code, 503);
        assert!(response.body.contains("Service Unavailable"));
        assert!(h.writes.borrow().is_empty());
        assert!(h.messages.borrow().is_empty());
    }

    #[test]
    fn transform_failure_short_circuits() {
        let h = Harness::default();
        let outcome = h
            .refresher(None, 4, false, false, NotifyPolicy::Always)
            .run();

        let response = outcome.response();
        assert_eq!(response.status_code, 500);
        assert!(response.body.contains("palette must have 5 colors, got 4"));
        assert!(response.body.contains("\"stage\":\"transform\""));
        assert!(h.writes.borrow().is_empty());
        assert!(h.messages.borrow().is_empty());
    }

    #[test]
    fn write_failure_pings_when_policy_asks() {
        let h = Harness::default();
        let outcome = h
            .refresher(None, 5, true, false, NotifyPolicy::OnFailure)
            .run();

        let response = outcome.response();
        assert_eq!(response.status_code, 500);
        assert!(response.body.contains("write_remote"));
        assert!(response.body.contains("git push failed: rejected"));

        let messages = h.messages.borrow();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Palette refresh failed"));
    }

    #[test]
    fn write_failure_is_silent_under_on_success() {
        let h = Harness::default();
        let outcome = h
            .refresher(None, 5, true, false, NotifyPolicy::OnSuccess)
            .run();

        assert_eq!(outcome.response().status_code, 500);
        assert_eq!(h.writes.borrow().len(), 1);
        assert!(h.messages.borrow().is_empty());
    }

    #[test]
    fn failed_failure_ping_keeps_write_error() {
        let h = Harness::default();
        let outcome = h
            .refresher(None, 5, true, true, NotifyPolicy::Always)
            .run();

        match outcome {
            RefreshOutcome::Failed(f) => assert_eq!(f.stage, Stage::WriteRemote),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(h.messages.borrow().len(), 1);
    }

    #[test]
    fn notify_failure_after_write_keeps_receipt() {
        let h = Harness::default();
        let outcome = h
            .refresher(None, 5, false, true, NotifyPolicy::OnSuccess)
            .run();

        let response = outcome.response();
        assert_eq!(response.status_code, 500);
        assert!(response.body.contains("\"stage\":\"notify\""));
        match outcome {
            RefreshOutcome::Failed(f) => {
                assert_eq!(f.stage, Stage::Notify);
                assert_eq!(f.receipt.unwrap().commit.as_deref(), Some("c0ffee"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn never_policy_skips_notification() {
        let h = Harness::default();
        let outcome = h.refresher(None, 5, false, false, NotifyPolicy::Never).run();

        assert!(outcome.is_success());
        assert!(h.messages.borrow().is_empty());
    }

    #[test]
    fn reruns_write_again() {
        let h = Harness::default();
        let refresher = h.refresher(None, 5, false, false, NotifyPolicy::Never);
        refresher.run();
        refresher.run();
        assert_eq!(*h.fetches.borrow(), 2);
        assert_eq!(h.writes.borrow().len(), 2);
    }

    #[test]
    fn from_config_fails_before_network_on_missing_env() {
        let mut server = mockito::Server::new();
        let color = server.mock("POST", "/").expect(0).create();
        let mut config = Config::default();
        config.color_api.url = format!("{}/", server.url());

        let err = Refresher::from_config(&config, &Env::default()).err().unwrap();

        color.assert();
        assert!(matches!(err, PaletteError::MissingConfig(_)));
    }

    #[test]
    fn from_config_requires_phone_numbers_unless_never() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();

        let writer = writer::dry_run(&config, dir.path());
        let err = Refresher::from_config_with_writer(&config, &Env::default(), writer)
            .err()
            .unwrap();
        assert!(err.to_string().contains("phone number"));

        config.notify.policy = NotifyPolicy::Never;
        let writer = writer::dry_run(&config, dir.path());
        assert!(Refresher::from_config_with_writer(&config, &Env::default(), writer).is_ok());
    }

    #[test]
    fn escaping_target_path_is_refused_before_running() {
        let root = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.target.path = "../escaped.ts".into();
        config.notify.policy = NotifyPolicy::Never;

        let writer = writer::dry_run(&config, root.path().join("inner"));
        let err = Refresher::from_config_with_writer(&config, &Env::default(), writer)
            .err()
            .unwrap();

        assert!(matches!(err, PaletteError::Config(_)));
        assert!(!root.path().join("escaped.ts").exists());
    }
}
