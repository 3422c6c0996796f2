//! View state coordinator
//!
//! [`Viewer`] owns every piece of mutable view state (active document, extracted
//! text, zoom, language, question, answer, loading flag) and exposes each user or
//! I/O event as an explicit method.

use crate::chat::{ChatBackend, ChatError, HttpChatClient};
use crate::error::{Error, Result};
use crate::locale::{Language, UiText};
use crate::pdf::{self, LoadedPdf, PageRenderer, PdfEngine, PdfiumEngine, RenderedPage, Zoom};
use crate::source::{resolve_default, resolve_path, DocumentSource, ResolvedPdf, SourceId};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Chat endpoint used when none is configured
pub const DEFAULT_CHAT_ENDPOINT: &str = "https://api.yuchenhsu.com/api/chat";

/// Resume shown on startup, resolved against the working directory
pub const DEFAULT_RESUME: &str = "assets/resume.pdf";

/// Header details shown above the document
#[derive(Debug, Clone)]
pub struct Profile {
    pub designer: String,
    pub email: String,
    pub phone: String,
    /// Model name shown next to "Current Model"
    pub model: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            designer: String::new(),
            email: String::new(),
            phone: String::new(),
            model: "GPT-3.5-turbo".to_string(),
        }
    }
}

/// Viewer configuration
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Resume loaded on startup (path or URL); `None` starts on the upload prompt
    pub default_resume: Option<String>,
    /// Chat-completion endpoint
    pub chat_endpoint: String,
    /// Initial display language (default: zh)
    pub language: Language,
    /// Initial zoom (default: 0.9)
    pub zoom: Zoom,
    /// Maximum download size in bytes for a URL default resume (default: 50MB)
    pub max_download_bytes: u64,
    /// Maximum number of cached page surfaces (default: 64)
    pub render_cache_entries: usize,
    /// Maximum total bytes of cached page surfaces (default: 128MB)
    pub render_cache_bytes: usize,
    pub profile: Profile,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            default_resume: Some(DEFAULT_RESUME.to_string()),
            chat_endpoint: DEFAULT_CHAT_ENDPOINT.to_string(),
            language: Language::default(),
            zoom: Zoom::default(),
            max_download_bytes: 50 * 1024 * 1024, // 50MB
            render_cache_entries: 64,
            render_cache_bytes: 128 * 1024 * 1024, // 128MB
            profile: Profile::default(),
        }
    }
}

impl ViewerConfig {
    /// Parse and check the chat endpoint
    pub fn chat_url(&self) -> Result<url::Url> {
        let url = url::Url::parse(&self.chat_endpoint).map_err(|e| Error::Config {
            reason: format!("chat endpoint {:?}: {}", self.chat_endpoint, e),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(Error::Config {
                reason: format!("chat endpoint must be http(s), got {}", other),
            }),
        }
    }
}

/// Why a submission was refused. No request is sent in any of these cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("no resume text has been extracted yet")]
    NoText,
    #[error("the question is empty")]
    BlankQuestion,
    #[error("a question is already being answered")]
    InFlight,
}

/// What an Enter key press does in the question box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterAction {
    /// Shift+Enter: a newline was added to the question
    NewLine,
    /// Plain Enter: the caller should submit
    Submit,
}

/// A submitted question waiting for its answer.
///
/// Owns everything the request needs, so it can run while the viewer keeps
/// handling zoom and language events.
pub struct PendingTurn {
    chat: Arc<dyn ChatBackend>,
    language: Language,
    source: SourceId,
    resume_text: String,
    question: String,
}

impl PendingTurn {
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Send the single chat request for this turn
    pub async fn run(self) -> CompletedTurn {
        let result = self
            .chat
            .ask(
                self.language.system_prompt(),
                &self.resume_text,
                &self.question,
            )
            .await;

        CompletedTurn {
            language: self.language,
            source: self.source,
            result,
        }
    }
}

/// Outcome of a [`PendingTurn`]
pub struct CompletedTurn {
    language: Language,
    source: SourceId,
    result: std::result::Result<String, ChatError>,
}

/// Snapshot of everything the view displays
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub title: &'static str,
    pub disclaimer: &'static str,
    /// Language toggle label ("ZH" / "EN")
    pub language_badge: String,
    /// Header lines: (label, value)
    pub header: Vec<(String, String)>,
    /// `Some(prompt)` when there is no document and the upload area is shown
    pub upload_prompt: Option<&'static str>,
    pub source_name: Option<String>,
    pub page_count: u32,
    pub zoom_percent: u32,
    pub scroll_hint: &'static str,
    pub question: String,
    pub question_placeholder: &'static str,
    pub submit_label: &'static str,
    pub submit_enabled: bool,
    pub loading: bool,
    /// (heading, answer), present only when there is an answer
    pub answer: Option<(&'static str, String)>,
    /// Load or extraction failure to show the user
    pub notice: Option<String>,
}

/// Owns the view state and wires user actions to the engine and chat client
pub struct Viewer {
    config: ViewerConfig,
    engine: Arc<dyn PdfEngine>,
    chat: Arc<dyn ChatBackend>,
    renderer: PageRenderer,
    source: Option<ResolvedPdf>,
    document: Option<Arc<dyn LoadedPdf>>,
    page_count: u32,
    pdf_text: String,
    zoom: Zoom,
    language: Language,
    question: String,
    answer: String,
    loading: bool,
    notice: Option<String>,
}

impl Viewer {
    pub fn new(
        config: ViewerConfig,
        engine: Arc<dyn PdfEngine>,
        chat: Arc<dyn ChatBackend>,
    ) -> Self {
        let renderer = PageRenderer::new(config.render_cache_entries, config.render_cache_bytes);
        Self {
            zoom: config.zoom,
            language: config.language,
            config,
            engine,
            chat,
            renderer,
            source: None,
            document: None,
            page_count: 0,
            pdf_text: String::new(),
            question: String::new(),
            answer: String::new(),
            loading: false,
            notice: None,
        }
    }

    /// Viewer backed by PDFium and the HTTP chat client
    pub fn with_defaults(config: ViewerConfig) -> Result<Self> {
        let chat = HttpChatClient::new(config.chat_url()?);
        tracing::info!(endpoint = %chat.endpoint(), "chat endpoint configured");
        Ok(Self::new(
            config,
            Arc::new(PdfiumEngine::new()),
            Arc::new(chat),
        ))
    }

    /// Activate the default resume, if one is configured, and load it
    pub async fn start(&mut self) -> Result<()> {
        let Some(location) = self.config.default_resume.clone() else {
            return Ok(());
        };

        let resolved = resolve_default(&location, self.config.max_download_bytes)
            .await
            .map_err(|e| self.record_failure("resolve default resume", e))?;
        self.install(resolved);
        self.open_active().await
    }

    /// Make a user-selected file the active document.
    ///
    /// Extracted text and any answer are cleared before this returns; the new
    /// document is not loaded until [`Viewer::load_document`].
    pub fn select_file<P: AsRef<Path>>(&mut self, path: P) -> Result<SourceId> {
        let resolved =
            resolve_path(path).map_err(|e| self.record_failure("resolve selected file", e))?;
        let id = resolved.id;
        self.install(resolved);
        Ok(id)
    }

    fn install(&mut self, resolved: ResolvedPdf) {
        if let Some(previous) = self.source.take() {
            self.renderer.release(previous.id);
        }
        self.document = None;
        self.page_count = 0;
        self.pdf_text.clear();
        self.answer.clear();
        self.notice = None;

        tracing::info!(source = %resolved.source_name(), id = %resolved.id, "document source selected");
        self.source = Some(resolved);
    }

    fn record_failure(&mut self, action: &str, err: Error) -> Error {
        tracing::warn!(error = %err, "{} failed", action);
        self.notice = Some(err.client_message());
        err
    }

    /// Open the active source. Returns the page count, which is only discovered
    /// once per source.
    pub async fn load_document(&mut self) -> Result<u32> {
        if self.document.is_some() {
            return Ok(self.page_count);
        }
        let Some(source) = self.source.as_ref() else {
            return Err(Error::NoDocument);
        };

        let opened = self.engine.open(source).await;
        let document = opened.map_err(|e| self.record_failure("load document", e))?;

        self.page_count = document.page_count();
        self.document = Some(document);
        Ok(self.page_count)
    }

    /// Extract the full text of the loaded document.
    ///
    /// On failure the extracted text stays empty.
    pub async fn extract_text(&mut self) -> Result<()> {
        let Some(document) = self.document.clone() else {
            return Err(Error::NoDocument);
        };

        let text = pdf::extract_text(document.as_ref())
            .await
            .map_err(|e| self.record_failure("extract text", e))?;

        tracing::info!(pages = self.page_count, chars = text.len(), "resume text ready");
        self.pdf_text = text;
        Ok(())
    }

    /// Load the active document and extract its text
    pub async fn open_active(&mut self) -> Result<()> {
        self.load_document().await?;
        self.extract_text().await
    }

    pub fn set_question(&mut self, question: impl Into<String>) {
        self.question = question.into();
    }

    /// Handle Enter in the question box. Shift+Enter inserts a newline.
    pub fn on_enter(&mut self, shift: bool) -> EnterAction {
        if shift {
            self.question.push('\n');
            EnterAction::NewLine
        } else {
            EnterAction::Submit
        }
    }

    fn check_submit(&self) -> std::result::Result<(), SubmitRejected> {
        if self.loading {
            return Err(SubmitRejected::InFlight);
        }
        if self.pdf_text.is_empty() {
            return Err(SubmitRejected::NoText);
        }
        if self.question.trim().is_empty() {
            return Err(SubmitRejected::BlankQuestion);
        }
        Ok(())
    }

    pub fn can_submit(&self) -> bool {
        self.check_submit().is_ok()
    }

    /// Enter the submitting state and hand back the request to run
    pub fn begin_submit(&mut self) -> std::result::Result<PendingTurn, SubmitRejected> {
        self.check_submit()?;

        let source = self.source.as_ref().map(|s| s.id).unwrap_or_default();
        self.loading = true;

        Ok(PendingTurn {
            chat: self.chat.clone(),
            language: self.language,
            source,
            resume_text: self.pdf_text.clone(),
            question: self.question.clone(),
        })
    }

    /// Store the outcome of a turn and return to idle.
    ///
    /// The question is kept. An answer for a document that has since been
    /// replaced is dropped.
    pub fn complete_submit(&mut self, completed: CompletedTurn) {
        self.loading = false;

        let current = self.source.as_ref().map(|s| s.id);
        if current != Some(completed.source) {
            tracing::debug!("discarding answer for a replaced document");
            return;
        }

        self.answer = match completed.result {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "chat request failed");
                completed.language.text(UiText::Error).to_string()
            }
        };
    }

    /// Leave the submitting state for a turn that never produced an outcome
    pub fn abandon_submit(&mut self) {
        self.loading = false;
        self.answer = self.language.text(UiText::Error).to_string();
    }

    /// Submit the current question and wait for the answer
    pub async fn submit(&mut self) -> std::result::Result<(), SubmitRejected> {
        let pending = self.begin_submit()?;
        let completed = pending.run().await;
        self.complete_submit(completed);
        Ok(())
    }

    pub fn toggle_language(&mut self) -> Language {
        self.language = self.language.toggle();
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn zoom_in(&mut self) -> Zoom {
        self.zoom = self.zoom.zoom_in();
        self.zoom
    }

    pub fn zoom_out(&mut self) -> Zoom {
        self.zoom = self.zoom.zoom_out();
        self.zoom
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    /// Surface for one page of the loaded document at the current zoom
    pub async fn render_page(&self, page: u32) -> Result<RenderedPage> {
        let (Some(source), Some(document)) = (self.source.as_ref(), self.document.as_ref()) else {
            return Err(Error::NoDocument);
        };
        self.renderer
            .surface(source.id, document.as_ref(), page, self.zoom)
            .await
    }

    pub fn source(&self) -> Option<&DocumentSource> {
        self.source.as_ref().map(|s| &s.source)
    }

    pub fn source_id(&self) -> Option<SourceId> {
        self.source.as_ref().map(|s| s.id)
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn pdf_text(&self) -> &str {
        &self.pdf_text
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Everything the view shows, in the current language
    pub fn view(&self) -> ViewState {
        let lang = self.language;
        let profile = &self.config.profile;

        let mut header = Vec::new();
        if !profile.designer.is_empty() {
            header.push((lang.text(UiText::Designer).to_string(), profile.designer.clone()));
        }
        if !profile.email.is_empty() {
            header.push(("Email".to_string(), profile.email.clone()));
        }
        if !profile.phone.is_empty() {
            header.push(("Phone".to_string(), profile.phone.clone()));
        }
        header.push((lang.text(UiText::CurrentModel).to_string(), profile.model.clone()));

        ViewState {
            title: lang.text(UiText::Title),
            disclaimer: lang.text(UiText::Disclaimer),
            language_badge: lang.to_string(),
            header,
            upload_prompt: self.source.is_none().then(|| lang.text(UiText::Upload)),
            source_name: self.source.as_ref().map(|s| s.source_name()),
            page_count: self.page_count,
            zoom_percent: self.zoom.percent(),
            scroll_hint: lang.text(UiText::ScrollHint),
            question: self.question.clone(),
            question_placeholder: lang.text(UiText::QuestionPlaceholder),
            submit_label: if self.loading {
                lang.text(UiText::Processing)
            } else {
                lang.text(UiText::AskQuestion)
            },
            submit_enabled: self.can_submit(),
            loading: self.loading,
            answer: (!self.answer.is_empty())
                .then(|| (lang.text(UiText::Answer), self.answer.clone())),
            notice: self.notice.clone(),
        }
    }
}
