//! HTML rendering for the full page and its HTMX fragments.
//!
//! Fragments carry their own stable `id` so a handler can return one and
//! HTMX swaps it in place (`hx-swap="outerHTML"`).

use std::fmt::Write as _;

use super::content::{
    BRAND, CONTACT_CONFIRMATION, FEATURES, FOOTER, HERO_CTA, HERO_SUBTITLE, HERO_TITLE,
    InfoCard, METADATA, STEPS, TESTIMONIALS,
};
use crate::chat::{ChatState, EXAMPLE_QUESTIONS, Sender, Transcript};
use crate::contact::{ContactFormState, FormField, LICENSE_TYPES};
use crate::visitor::{HEARTBEAT_INTERVAL, Theme, Visitor};

/// Escape text for HTML element content and quoted attribute values.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Full HTML document for a visitor.
#[must_use]
pub fn render_page(visitor: &Visitor) -> String {
    html_shell(&page_root(visitor))
}

/// Wrap body content in the document shell.
fn html_shell(content: &str) -> String {
    let title = escape_html(METADATA.title);
    let description = escape_html(METADATA.description);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="{description}">
    <title>{title}</title>
    <link rel="icon" href="/static/logo.svg">

    <script src="https://unpkg.com/htmx.org@2.0.8"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <script>tailwind.config = {{ darkMode: 'class' }}</script>
    <style>
        @keyframes fade-in {{ from {{ opacity: 0; }} to {{ opacity: 1; }} }}
        .fade-in {{ animation: fade-in 0.6s ease-out both; }}
    </style>
</head>
<body>
{content}
</body>
</html>"#
    )
}

/// Everything inside `<body>`. Returned on its own when the theme toggles.
#[must_use]
pub fn page_root(visitor: &Visitor) -> String {
    let id = visitor.id();
    let theme = visitor.theme();
    let root_class = match theme {
        Theme::Dark => "dark bg-gray-900 text-white",
        Theme::Light => "bg-white text-gray-900",
    };
    let contact = contact_form(id, &visitor.contact().state());
    let chat = chat_widget(id, &visitor.chat().state());

    format!(
        r#"<div id="page-root" class="{root_class}" data-session-id="{id}" data-theme="{theme_name}">
{header}
{hero}
{how_it_works}
{why_choose_us}
{testimonials}
    <section class="py-16" id="contact">
        <h2 class="text-3xl font-bold text-center mb-10">Contact Us</h2>
{contact}
    </section>
{chat}
    <footer class="p-4 text-center text-gray-500">{footer}</footer>
    <div hidden hx-post="/heartbeat" hx-trigger="every {heartbeat}s" hx-vals='{{"session_id": "{id}"}}' hx-swap="none"></div>
</div>"#,
        heartbeat = HEARTBEAT_INTERVAL.as_secs(),
        theme_name = match theme {
            Theme::Dark => "dark",
            Theme::Light => "light",
        },
        header = header(id, theme),
        hero = hero(),
        how_it_works = card_section("How It Works", "py-16 bg-gray-50 dark:bg-gray-800", &STEPS),
        why_choose_us = card_section("Why Choose Us", "py-16", &FEATURES),
        testimonials = testimonials(),
        footer = escape_html(FOOTER),
    )
}

fn header(id: &str, theme: Theme) -> String {
    let icon = match theme {
        Theme::Dark => "🌙",
        Theme::Light => "☀️",
    };
    format!(
        r##"    <header class="flex justify-between items-center p-6">
        <div class="flex items-center gap-2">
            <img src="/static/logo.svg" alt="{BRAND} Logo" class="w-8 h-8">
            <span class="font-bold text-2xl">{BRAND}</span>
        </div>
        <button class="rounded-full p-2 border" aria-label="Toggle theme"
                hx-post="/theme" hx-vals='{{"session_id": "{id}"}}' hx-include=".contact-field, #chat-draft"
                hx-target="#page-root" hx-swap="outerHTML">{icon}</button>
    </header>"##
    )
}

fn hero() -> String {
    format!(
        r##"    <section class="fade-in py-24 text-center bg-gradient-to-b from-blue-50 to-white dark:from-gray-800 dark:to-gray-900">
        <h1 class="text-5xl font-bold mb-4">{HERO_TITLE}</h1>
        <p class="text-xl mb-8">{HERO_SUBTITLE}</p>
        <a href="#contact" class="inline-block bg-blue-600 text-white px-8 py-3 rounded-lg hover:bg-blue-700 transition">{HERO_CTA}</a>
    </section>"##
    )
}

fn card_section(heading: &str, section_class: &str, cards: &[InfoCard]) -> String {
    let mut items = String::new();
    for card in cards {
        let _ = write!(
            items,
            r#"
            <div class="bg-white dark:bg-gray-700 p-6 rounded-xl shadow w-72 text-center">
                <div class="text-4xl mb-3">{icon}</div>
                <h3 class="font-semibold text-xl mb-2">{title}</h3>
                <p class="text-gray-500 dark:text-gray-300">{description}</p>
            </div>"#,
            icon = card.icon,
            title = escape_html(card.title),
            description = escape_html(card.description),
        );
    }
    format!(
        r#"    <section class="{section_class}">
        <h2 class="text-3xl font-bold text-center mb-10">{heading}</h2>
        <div class="flex flex-col md:flex-row flex-wrap gap-8 justify-center items-center">{items}
        </div>
    </section>"#
    )
}

fn testimonials() -> String {
    let mut items = String::new();
    for review in &TESTIMONIALS {
        let _ = write!(
            items,
            r#"
            <div class="bg-white dark:bg-gray-700 p-6 rounded-xl shadow w-80">
                <p class="mb-4 italic">&quot;{text}&quot;</p>
                <div class="font-semibold">{name}</div>
                <div class="text-sm text-gray-500">{role}, {company}</div>
            </div>"#,
            text = escape_html(review.text),
            name = escape_html(review.name),
            role = escape_html(review.role),
            company = escape_html(review.company),
        );
    }
    format!(
        r#"    <section class="py-16 bg-gray-50 dark:bg-gray-800">
        <h2 class="text-3xl font-bold text-center mb-10">Customer Testimonials</h2>
        <div class="flex flex-col md:flex-row gap-8 justify-center items-center">{items}
        </div>
    </section>"#
    )
}

/// The contact form, or the form with its confirmation once submitted.
///
/// Every control posts itself to `/contact/field` as it changes, so the
/// server copy of the form stays current between submits.
#[must_use]
pub fn contact_form(session_id: &str, state: &ContactFormState) -> String {
    let input_class = "contact-field w-full border rounded p-3 text-gray-900";
    let mut fields = String::new();

    for field in FormField::ALL {
        let name = field.as_str();
        let value = escape_html(state.form.get(field));
        let placeholder = field.placeholder();
        let trigger = match field {
            FormField::LicenseType => "change",
            _ => "input changed delay:300ms",
        };
        let sync = format!(
            r#"hx-post="/contact/field" hx-trigger="{trigger}" hx-vals='{{"field": "{name}"}}' hx-swap="none""#
        );
        let control = match field {
            FormField::LicenseType => license_select(input_class, state.form.get(field), &sync),
            FormField::Message => format!(
                r#"<textarea class="{input_class}" name="{name}" placeholder="{placeholder}" {sync}>{value}</textarea>"#
            ),
            FormField::Email => format!(
                r#"<input class="{input_class}" type="email" name="{name}" placeholder="{placeholder}" value="{value}" {sync}>"#
            ),
            FormField::Name | FormField::Company => format!(
                r#"<input class="{input_class}" type="text" name="{name}" placeholder="{placeholder}" value="{value}" {sync}>"#
            ),
        };
        let _ = write!(fields, "\n            <div class=\"mb-4\">{control}</div>");
    }

    let error = state
        .error
        .as_deref()
        .map(|message| {
            format!(
                "\n            <div class=\"text-red-500 mb-2\" role=\"alert\">{}</div>",
                escape_html(message)
            )
        })
        .unwrap_or_default();

    let action = if state.is_submitted() {
        format!(
            r#"<div class="text-green-600 font-semibold">{}</div>"#,
            escape_html(CONTACT_CONFIRMATION)
        )
    } else {
        r#"<button class="bg-blue-600 text-white px-6 py-3 rounded hover:bg-blue-700 transition" type="submit">Send Message</button>"#
            .to_string()
    };

    format!(
        r#"        <form id="contact-form" class="max-w-xl mx-auto bg-white dark:bg-gray-800 p-8 rounded-xl shadow"
              hx-post="/contact" hx-swap="outerHTML">
            <input type="hidden" name="session_id" value="{session_id}">{fields}{error}
            {action}
        </form>"#
    )
}

fn license_select(class: &str, selected: &str, sync: &str) -> String {
    let mut options = format!(
        r#"<option value=""{}>{}</option>"#,
        if selected.is_empty() { " selected" } else { "" },
        FormField::LicenseType.placeholder()
    );
    for license in LICENSE_TYPES {
        let marker = if license == selected { " selected" } else { "" };
        let _ = write!(options, r#"<option value="{license}"{marker}>{license}</option>"#);
    }
    format!(r#"<select class="{class}" name="license_type" {sync}>{options}</select>"#)
}

/// The chat launcher button, or the open chat panel.
#[must_use]
pub fn chat_widget(session_id: &str, state: &ChatState) -> String {
    let vals = format!(r#"hx-vals='{{"session_id": "{session_id}"}}'"#);

    if !state.is_open() {
        return format!(
            r##"    <div id="chat-widget" class="fixed bottom-4 right-4 z-50">
        <button class="bg-blue-600 text-white p-4 rounded-full shadow-lg" aria-label="Open chat"
                hx-post="/chat/open" {vals} hx-target="#chat-widget" hx-swap="outerHTML">💬</button>
    </div>"##
        );
    }

    let transcript = chat_transcript(session_id, &state.transcript);
    let examples = EXAMPLE_QUESTIONS.join(" / ");
    format!(
        r##"    <div id="chat-widget" class="fixed bottom-4 right-4 z-50">
        <div class="w-80 bg-white dark:bg-gray-800 rounded-xl shadow-lg flex flex-col">
            <div class="p-3 border-b flex justify-between items-center">
                <span class="font-bold">{BRAND} Chat</span>
                <button aria-label="Close chat"
                        hx-post="/chat/close" {vals} hx-target="#chat-widget" hx-swap="outerHTML">✖️</button>
            </div>
{transcript}
            <div class="p-3 border-t">
                <form hx-post="/chat/messages" hx-target="#chat-transcript" hx-swap="outerHTML"
                      hx-on::after-request="this.elements.text.value = ''">
                    <input type="hidden" name="session_id" value="{session_id}">
                    <input id="chat-draft" class="w-full border rounded p-2 text-gray-900" name="text"
                           value="{draft}" placeholder="Type your question..." autocomplete="off">
                </form>
                <div class="mt-2 text-xs text-gray-500">Try: {examples}</div>
            </div>
        </div>
    </div>"##,
        examples = escape_html(&examples),
        draft = escape_html(&state.draft),
    )
}

/// Transcript list. Polls itself so delayed replies show up.
#[must_use]
pub fn chat_transcript(session_id: &str, transcript: &Transcript) -> String {
    let mut lines = String::new();
    for message in transcript {
        let (align, bubble) = match message.sender {
            Sender::User => ("text-right", "bg-blue-100 dark:bg-blue-900"),
            Sender::Bot => ("text-left", "bg-gray-200 dark:bg-gray-700"),
        };
        let sender = match message.sender {
            Sender::User => "user",
            Sender::Bot => "bot",
        };
        let _ = write!(
            lines,
            r#"
                <div class="mb-2 {align}" data-sender="{sender}"><span class="inline-block px-3 py-1 rounded-lg {bubble}">{text}</span></div>"#,
            text = escape_html(&message.text),
        );
    }
    format!(
        r#"            <div id="chat-transcript" class="flex-1 p-3 overflow-y-auto" style="max-height: 240px"
                 data-count="{count}"
                 hx-get="/chat/transcript?session_id={session_id}" hx-trigger="every 1s" hx-swap="outerHTML">{lines}
            </div>"#,
        count = transcript.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatMessage;
    use crate::contact::FormPhase;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_contact_form_keeps_values_and_shows_error() {
        let mut state = ContactFormState::default();
        state.form.name = "Jane <Doe>".into();
        state.form.license_type = "Adobe".into();
        state.error = Some("Please fill all fields.".into());

        let html = contact_form("abc", &state);
        assert!(html.contains(r#"value="Jane &lt;Doe&gt;""#));
        assert!(html.contains(r#"<option value="Adobe" selected>Adobe</option>"#));
        assert!(html.contains("Please fill all fields."));
        assert!(html.contains("Send Message"));
        assert!(!html.contains(CONTACT_CONFIRMATION.replace('\'', "&#39;").as_str()));
    }

    #[test]
    fn test_submitted_form_shows_confirmation_instead_of_button() {
        let state = ContactFormState {
            phase: FormPhase::Submitted,
            ..ContactFormState::default()
        };
        let html = contact_form("abc", &state);
        assert!(html.contains("Thank you! We&#39;ll get back to you soon."));
        assert!(!html.contains("Send Message"));
    }

    #[test]
    fn test_controls_sync_field_by_field() {
        let html = contact_form("abc", &ContactFormState::default());
        assert_eq!(html.matches(r#"hx-post="/contact/field""#).count(), 5);
        assert_eq!(html.matches("contact-field ").count(), 5);
        assert!(html.contains(r#"hx-vals='{"field": "license_type"}'"#));
        assert!(html.contains(r#"hx-trigger="change""#));
    }

    #[test]
    fn test_open_chat_keeps_draft() {
        let mut state = ChatState {
            visibility: crate::chat::Visibility::Open,
            ..ChatState::default()
        };
        state.draft = "is it \"safe\"".into();
        let html = chat_widget("abc", &state);
        assert!(html.contains(r#"id="chat-draft""#));
        assert!(html.contains(r#"value="is it &quot;safe&quot;""#));
    }

    #[test]
    fn test_closed_chat_renders_launcher_only() {
        let html = chat_widget("abc", &ChatState::default());
        assert!(html.contains(r#"hx-post="/chat/open""#));
        assert!(!html.contains("chat-transcript"));
    }

    #[test]
    fn test_transcript_escapes_and_aligns() {
        let mut transcript = Transcript::seeded();
        transcript.push(ChatMessage::user("<script>"));
        let html = chat_transcript("abc", &transcript);

        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains(r#"data-count="2""#));
        assert_eq!(html.matches(r#"data-sender="bot""#).count(), 1);
        assert_eq!(html.matches(r#"data-sender="user""#).count(), 1);
    }
}
