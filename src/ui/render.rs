use std::fmt::Write;

use crate::analysis::pii::PiiStatus;
use crate::ui::state::{Background, UiState};

const TITLE: &str = "PrivAlert: Privacy-Focused Document Analysis";

const STYLE: &str = r#"
body { margin: 0; font-family: "Roboto", "Helvetica", "Arial", sans-serif; background: #f5f5f5; }
header { background: #1976d2; color: #fff; padding: 16px 24px; font-weight: 600; font-size: 1.25rem; }
main { display: grid; grid-template-columns: 1fr 3fr; gap: 24px; max-width: 1200px; margin: 32px auto; padding: 0 16px; }
@media (max-width: 600px) { main { grid-template-columns: 1fr; } }
.paper { background: rgba(255,255,255,0.9); border-radius: 12px; padding: 24px; margin-bottom: 24px; box-shadow: 0 4px 6px rgba(0,0,0,0.1); }
h2 { font-size: 1.1rem; margin-top: 0; }
button { border: 0; border-radius: 8px; padding: 10px 16px; background: #1976d2; color: #fff; cursor: pointer; }
button.outlined { background: transparent; color: #1976d2; border: 1px solid #1976d2; width: 100%; }
button[disabled] { opacity: 0.6; cursor: progress; }
.submit { width: 100%; font-size: 1rem; padding: 14px; }
textarea { width: 100%; box-sizing: border-box; min-height: 96px; }
img.preview { max-width: 100%; max-height: 300px; object-fit: contain; border-radius: 8px; margin-top: 16px; }
.notice { max-width: 1200px; margin: 16px auto 0; padding: 12px 16px; border-radius: 8px; }
.notice.info { background: #e3f2fd; } .notice.success { background: #e8f5e9; }
.notice.warning { background: #fff8e1; } .notice.error { background: #ffebee; }
.result { padding: 16px; border-radius: 4px; margin-top: 16px; }
.result.detected { background: rgba(255,0,0,0.1); border: 1px solid #d32f2f; }
.result.clear { background: rgba(0,255,0,0.1); border: 1px solid #2e7d32; }
.verdict.detected { color: #d32f2f; } .verdict.clear { color: #2e7d32; }
"#;

/// Minimal HTML escaping for text and attribute values.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn body_style(background: &Background) -> String {
    match background {
        Background::Default => String::new(),
        Background::Color(color) => format!("background-color: {};", escape(color)),
        Background::Image(url) => format!(
            "background-image: url('{}'); background-size: cover; background-attachment: fixed;",
            escape(url)
        ),
    }
}

fn checked(cond: bool) -> &'static str {
    if cond {
        " checked"
    } else {
        ""
    }
}

/// Render the whole page for one state snapshot.
pub fn page(state: &UiState) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{title}</title><style>{style}</style></head>\
         <body style=\"{body}\"><header>&#128274; {title}</header>",
        title = TITLE,
        style = STYLE,
        body = body_style(&state.background)
    );

    if let Some(notice) = &state.notice {
        let _ = write!(
            html,
            "<div class=\"notice {}\" role=\"status\">{}</div>",
            notice.severity.as_str(),
            escape(&notice.message)
        );
    }

    html.push_str("<main>");
    settings(&mut html, state);
    html.push_str("<section>");
    input_form(&mut html, state);
    results(&mut html, state);
    html.push_str("</section></main></body></html>");
    html
}

fn settings(html: &mut String, state: &UiState) {
    let (color, image) = match &state.background {
        Background::Color(c) => (c.as_str(), ""),
        Background::Image(u) => ("#f5f5f5", u.as_str()),
        Background::Default => ("#f5f5f5", ""),
    };
    let _ = write!(
        html,
        "<aside class=\"paper\"><h2>Settings</h2>\
         <form method=\"post\" action=\"/background\">\
         <label><input type=\"radio\" name=\"mode\" value=\"default\"{}> Default</label><br>\
         <label><input type=\"radio\" name=\"mode\" value=\"color\"{}> Color</label> \
         <input type=\"color\" name=\"color\" value=\"{}\"><br>\
         <label><input type=\"radio\" name=\"mode\" value=\"image\"{}> Image</label> \
         <input type=\"url\" name=\"image_url\" placeholder=\"Image URL\" value=\"{}\"><br><br>\
         <button type=\"submit\" class=\"outlined\">Apply</button></form><br>\
         <form method=\"post\" action=\"/clear\">\
         <button type=\"submit\" class=\"outlined\">Clear Inputs</button></form></aside>",
        checked(state.background == Background::Default),
        checked(matches!(state.background, Background::Color(_))),
        escape(color),
        checked(matches!(state.background, Background::Image(_))),
        escape(image),
    );
}

fn input_form(html: &mut String, state: &UiState) {
    html.push_str(
        "<form method=\"post\" action=\"/analyze\" enctype=\"multipart/form-data\">\
         <div class=\"paper\"><h2>Image Input</h2>\
         <input type=\"file\" name=\"image\" accept=\"image/*\">",
    );
    if let Some(preview) = &state.preview {
        let _ = write!(
            html,
            "<br><img class=\"preview\" src=\"{}\" alt=\"Uploaded image preview\">",
            escape(preview)
        );
    }
    if let Some(image) = &state.image {
        let _ = write!(html, "<p>File: {}</p>", escape(&image.file_name));
    }
    let (disabled, label) = if state.is_loading() {
        (" disabled", "Processing...")
    } else {
        ("", "Analyze Image")
    };
    let _ = write!(
        html,
        "</div><div class=\"paper\"><h2>Text Prompt</h2>\
         <textarea name=\"prompt\" rows=\"4\" \
         placeholder=\"Enter your prompt (e.g., Describe this image)\">{}</textarea></div>\
         <button type=\"submit\" class=\"submit\"{disabled}>{label}</button></form><br>",
        escape(&state.prompt)
    );
}

fn results(html: &mut String, state: &UiState) {
    if !state.description.is_empty() {
        let _ = write!(
            html,
            "<div class=\"paper\"><h2>Image Description</h2><p>{}</p></div>",
            escape(&state.description)
        );
    }
    if let Some(status) = state.pii_status() {
        let class = match status {
            PiiStatus::Detected => "detected",
            PiiStatus::Clear => "clear",
        };
        let _ = write!(
            html,
            "<div class=\"paper\"><h2>Privacy Analysis</h2>\
             <div class=\"result {class}\"><h3 class=\"verdict {class}\">{}</h3><p>{}</p></div></div>",
            status.label(),
            escape(&state.analysis)
        );
    }
}
