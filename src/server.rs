use axum::{
    Form, Json, Router,
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{Html, IntoResponse},
    routing::{get, post},
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::AppState;
use crate::chat::Transcript;
use crate::config::AppConfig;
use crate::contact::{ContactForm, FormField, FormState, Submission};
use crate::error::AppError;
use crate::page;
use crate::scheduler::TokioScheduler;
use crate::visitor::{Visitor, VisitorStore};

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let scheduler = Arc::new(TokioScheduler::try_current()?);
    let state = AppState::new(Arc::clone(&config), scheduler);

    spawn_visitor_sweeper(
        state.visitors.clone(),
        config.sessions.idle_timeout(),
        config.sessions.sweep_interval(),
    );

    let app = router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        reply_delay_ms = config.chat.reply_delay_ms,
        "Server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(name: "server.stopped", "Server stopped");
    Ok(())
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    // A very long timeout stands in for "disabled" so the layer stack keeps
    // one type either way.
    let timeout_duration = if state.config.resilience.timeout_disabled {
        Duration::from_secs(365 * 24 * 60 * 60) // 1 year
    } else {
        Duration::from_secs(30)
    };

    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(move |req: Request, next: Next| {
            let duration = timeout_duration;
            async move {
                match tokio::time::timeout(duration, next.run(req)).await {
                    Ok(res) => res,
                    Err(_) => (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response(),
                }
            }
        }));

    Router::new()
        // HTML page
        .route("/", get(index_handler))
        // HTMX fragments
        .route("/contact", post(contact_handler))
        .route("/contact/field", post(contact_field_handler))
        .route("/chat/open", post(chat_open_handler))
        .route("/chat/close", post(chat_close_handler))
        .route("/chat/messages", post(chat_message_handler))
        .route("/chat/transcript", get(chat_transcript_handler))
        .route("/theme", post(theme_handler))
        .route("/heartbeat", post(heartbeat_handler))
        // JSON API
        .route("/api/sessions/{id}/messages", get(api_get_messages))
        .route("/health", get(health_handler))
        // Static assets
        .nest_service("/static", ServeDir::new(&state.config.site.static_dir))
        .layer(middleware)
        .with_state(state)
}

/// Periodically drop visitors that have gone idle.
fn spawn_visitor_sweeper(visitors: VisitorStore, idle_timeout: Duration, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = visitors.cleanup_expired_with_timeout(idle_timeout);
            if removed > 0 {
                info!(
                    name: "visitor.swept",
                    removed,
                    remaining = visitors.len(),
                    "Swept idle visitors"
                );
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

/// Visitor for a request coming from a rendered page.
///
/// A page left open past the idle timeout gets its visitor back under the
/// same ID, so its next post is handled instead of failing.
fn resume_visitor(state: &AppState, id: &str) -> Result<Visitor, AppError> {
    state
        .visitors
        .resume(id)
        .ok_or_else(|| AppError::SessionNotFound(id.to_string()))
}

/// Copy any contact inputs present in a form body into the component.
fn apply_posted_fields(contact: &ContactForm, values: &HashMap<String, String>) {
    for field in FormField::ALL {
        if let Some(value) = values.get(field.as_str()) {
            contact.set_field(field, value.as_str());
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET / - Render the landing page for a new visitor.
async fn index_handler(State(state): State<AppState>) -> Html<String> {
    let visitor = state.visitors.create();
    info!(
        name: "visitor.created",
        session_id = %visitor.id(),
        live = state.visitors.len(),
        "Visitor created"
    );
    Html(page::render_page(&visitor))
}

/// Form body or query naming the visitor.
#[derive(Debug, Deserialize)]
struct SessionParams {
    session_id: String,
}

/// Contact form post. Missing inputs arrive as empty strings.
#[derive(Debug, Deserialize)]
struct ContactSubmission {
    session_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    company: String,
    #[serde(default)]
    license_type: String,
    #[serde(default)]
    message: String,
}

impl ContactSubmission {
    fn into_parts(self) -> (String, FormState) {
        let form = FormState {
            name: self.name,
            email: self.email,
            company: self.company,
            license_type: self.license_type,
            message: self.message,
        };
        (self.session_id, form)
    }
}

/// POST /contact - Store the posted values, submit, and re-render the form.
async fn contact_handler(
    State(state): State<AppState>,
    Form(body): Form<ContactSubmission>,
) -> Result<Html<String>, AppError> {
    let (session_id, form) = body.into_parts();
    let visitor = resume_visitor(&state, &session_id)?;
    let contact = visitor.contact();

    contact.set_form(form);
    match contact.submit() {
        Ok(Submission::Accepted) => {
            info!(
                name: "contact.submitted",
                session_id = %session_id,
                license_type = %contact.state().form.license_type,
                "Contact form submitted"
            );
        }
        Ok(Submission::AlreadySubmitted) => {
            debug!(name: "contact.resubmitted", session_id = %session_id, "Contact form already submitted");
        }
        Err(err) => {
            info!(
                name: "contact.rejected",
                session_id = %session_id,
                missing = ?contact.state().form.missing_fields(),
                error = %err,
                "Contact form rejected"
            );
        }
    }

    Ok(Html(page::contact_form(visitor.id(), &contact.state())))
}

/// One contact input changed. The enclosing form's values come along, and
/// `field` names the input that fired.
#[derive(Debug, Deserialize)]
struct FieldUpdate {
    session_id: String,
    field: String,
    #[serde(flatten)]
    values: HashMap<String, String>,
}

/// POST /contact/field - Store a single field as the visitor types.
async fn contact_field_handler(
    State(state): State<AppState>,
    Form(body): Form<FieldUpdate>,
) -> Result<StatusCode, AppError> {
    let field: FormField = body.field.parse()?;
    let visitor = resume_visitor(&state, &body.session_id)?;
    let value = body
        .values
        .get(field.as_str())
        .map(String::as_str)
        .unwrap_or_default();
    visitor.contact().set_field(field, value);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /chat/open - Show the chat panel.
async fn chat_open_handler(
    State(state): State<AppState>,
    Form(params): Form<SessionParams>,
) -> Result<Html<String>, AppError> {
    let visitor = resume_visitor(&state, &params.session_id)?;
    visitor.chat().open();
    Ok(Html(page::chat_widget(visitor.id(), &visitor.chat().state())))
}

/// POST /chat/close - Collapse the chat panel back to its launcher.
async fn chat_close_handler(
    State(state): State<AppState>,
    Form(params): Form<SessionParams>,
) -> Result<Html<String>, AppError> {
    let visitor = resume_visitor(&state, &params.session_id)?;
    visitor.chat().close();
    Ok(Html(page::chat_widget(visitor.id(), &visitor.chat().state())))
}

/// Chat input post.
#[derive(Debug, Deserialize)]
struct ChatSubmission {
    session_id: String,
    #[serde(default)]
    text: String,
}

/// POST /chat/messages - Append the user message and schedule the reply.
async fn chat_message_handler(
    State(state): State<AppState>,
    Form(body): Form<ChatSubmission>,
) -> Result<Html<String>, AppError> {
    let visitor = resume_visitor(&state, &body.session_id)?;
    let chat = visitor.chat();

    if chat.send(&body.text) {
        info!(
            name: "chat.message.received",
            session_id = %visitor.id(),
            length = body.text.len(),
            "Chat message received"
        );
    }

    Ok(Html(page::chat_transcript(visitor.id(), &chat.transcript())))
}

/// GET /chat/transcript - Current transcript, polled while the panel is open.
async fn chat_transcript_handler(
    State(state): State<AppState>,
    Query(params): Query<SessionParams>,
) -> Result<Html<String>, AppError> {
    let visitor = resume_visitor(&state, &params.session_id)?;
    Ok(Html(page::chat_transcript(
        visitor.id(),
        &visitor.chat().transcript(),
    )))
}

/// Theme toggle post. Carries whatever is typed in the contact inputs and
/// the chat box, so the re-rendered page keeps it.
#[derive(Debug, Deserialize)]
struct ThemeToggle {
    session_id: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(flatten)]
    values: HashMap<String, String>,
}

/// POST /theme - Toggle light/dark and re-render the page body.
async fn theme_handler(
    State(state): State<AppState>,
    Form(body): Form<ThemeToggle>,
) -> Result<Html<String>, AppError> {
    let visitor = resume_visitor(&state, &body.session_id)?;
    apply_posted_fields(visitor.contact(), &body.values);
    if let Some(draft) = body.text {
        visitor.chat().set_draft(draft);
    }
    let theme = visitor.toggle_theme();
    debug!(name: "theme.toggled", session_id = %visitor.id(), theme = ?theme, "Theme toggled");
    Ok(Html(page::page_root(&visitor)))
}

/// POST /heartbeat - Keep the visitor alive while its page is open.
async fn heartbeat_handler(
    State(state): State<AppState>,
    Form(params): Form<SessionParams>,
) -> Result<StatusCode, AppError> {
    resume_visitor(&state, &params.session_id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/sessions/:id/messages - Transcript as JSON.
async fn api_get_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Transcript>, AppError> {
    let visitor = state
        .visitors
        .get(&id)
        .ok_or_else(|| AppError::SessionNotFound(id.clone()))?;
    Ok(Json(visitor.chat().transcript()))
}

/// GET /health - Liveness probe.
async fn health_handler() -> &'static str {
    "ok"
}
