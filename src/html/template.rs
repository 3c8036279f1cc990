//! Static parts of the HTML module: stylesheet, header, gate, quiz markup.

use super::text::{escape_html, linkify, TagKeys};
use crate::model::{DocumentMetadata, Quiz};
use crate::pdf::PdfTheme;

/// Stylesheet with the theme colours as custom properties.
pub fn stylesheet(theme: &PdfTheme) -> String {
    format!(
        ":root{{--primary:{primary};--accent:{accent};--text:{text};--muted:{muted};\
--surface:{surface};--bg:#f3f4f6;--card:#ffffff;--border:#e5e7eb}}\n\
[data-theme=dark]{{--text:#e5e7eb;--muted:#9ca3af;--surface:#1f2937;--bg:#111827;\
--card:#1f2937;--border:#374151}}\n{rest}",
        primary = theme.primary,
        accent = theme.accent,
        text = theme.text,
        muted = theme.muted,
        surface = theme.surface,
        rest = BASE_CSS,
    )
}

const BASE_CSS: &str = r#"*{box-sizing:border-box}
body{margin:0;font:16px/1.55 -apple-system,BlinkMacSystemFont,"Segoe UI",Helvetica,Arial,sans-serif;background:var(--bg);color:var(--text)}
a{color:var(--accent)}
.module-header{display:flex;align-items:center;gap:20px;padding:24px 32px;background:var(--primary);color:#fff}
.module-header h1{margin:0;font-size:28px}
.module-header .topic{margin:4px 0 0;opacity:.9}
.module-header .meta{margin:4px 0 0;font-size:14px;opacity:.75}
.module-header .logo{max-width:120px;max-height:60px}
.module-header .titles{flex:1}
#theme-toggle{border:1px solid rgba(255,255,255,.6);background:transparent;color:#fff;border-radius:999px;padding:6px 14px;cursor:pointer}
main{max-width:960px;margin:0 auto;padding:24px 16px 64px}
.progress{display:flex;align-items:center;gap:12px;margin-bottom:20px}
.progress-bar{flex:1;height:8px;border-radius:4px;background:var(--border);overflow:hidden}
#progress-bar-fill{height:100%;width:0;background:var(--accent);transition:width .3s}
#progress-label{font-size:14px;color:var(--muted)}
.tag-index{display:flex;flex-wrap:wrap;gap:8px;margin-bottom:24px}
.steps{list-style:none;margin:0;padding:0}
.step{background:var(--card);border:1px solid var(--border);border-radius:12px;padding:20px;margin-bottom:24px;transition:box-shadow .2s,border-color .2s;scroll-margin-top:16px}
.step.is-highlighted{border-color:var(--accent);box-shadow:0 0 0 3px var(--accent)}
.step.is-complete .step-number{background:#16a34a}
.step-header{display:flex;align-items:center;gap:12px;margin-bottom:12px}
.step-number{background:var(--primary);color:#fff;border-radius:999px;padding:4px 12px;font-weight:700;font-size:14px;white-space:nowrap}
.step-title{flex:1;margin:0;font-size:20px}
.step-done{font-size:14px;color:var(--muted);white-space:nowrap;cursor:pointer}
.screenshot{margin:16px 0}
.screenshot-frame{position:relative;display:inline-block;max-width:100%}
.screenshot-frame img{display:block;max-width:100%;height:auto;border-radius:6px}
.screenshot figcaption{font-size:13px;color:var(--muted);margin-top:6px}
.hotspots{position:absolute}
.callout{position:absolute}
.reveal-hotspot{border:0;background:transparent;cursor:pointer;border-radius:50%;padding:0}
.reveal-hotspot:focus{outline:2px solid var(--callout-color,var(--accent));outline-offset:2px}
.reveal-hotspot .callout-label{position:absolute;width:1px;height:1px;overflow:hidden;clip:rect(0 0 0 0)}
.reveal-popover{position:absolute;z-index:10;max-width:260px;background:var(--card);color:var(--text);border:1px solid var(--border);border-radius:8px;padding:8px 12px;font-size:14px;box-shadow:0 6px 20px rgba(0,0,0,.18);transform:translateY(8px)}
.note{border-left:4px solid var(--accent);background:var(--surface);padding:8px 12px;margin:12px 0;font-size:15px}
.tags{display:flex;flex-wrap:wrap;gap:6px;margin-top:12px}
.tag{border:1px solid var(--accent);color:var(--accent);background:transparent;border-radius:999px;padding:2px 10px;font-size:13px;cursor:pointer}
.tag.is-active{background:var(--accent);color:#fff}
.resources{margin:12px 0 0;padding-left:20px;font-size:15px}
.quiz{margin-top:16px;padding:12px 16px;border:1px dashed var(--border);border-radius:8px}
.quiz-question{font-weight:600;margin:0 0 8px}
.quiz-option{display:block;width:100%;text-align:left;margin:4px 0;padding:8px 12px;border:1px solid var(--border);border-radius:6px;background:var(--card);color:var(--text);cursor:pointer}
.quiz-option.is-correct{border-color:#16a34a;background:rgba(22,163,74,.12)}
.quiz-option.is-wrong{border-color:#dc2626;background:rgba(220,38,38,.12)}
.quiz-feedback{margin-top:8px;font-size:15px}
#password-gate{max-width:360px;margin:80px auto;padding:24px;background:var(--card);border:1px solid var(--border);border-radius:12px;text-align:center}
#password-gate input{width:100%;padding:8px;margin:12px 0;border:1px solid var(--border);border-radius:6px}
#password-gate button{padding:8px 20px;border:0;border-radius:6px;background:var(--primary);color:#fff;cursor:pointer}
#password-error{color:#dc2626;font-size:14px}
@media print{.module-header button,.step-done,.progress,.tag-index{display:none}.step{break-inside:avoid}}
"#;

/// Module header: logo, title, topic, date and company, theme toggle.
pub fn header(meta: &DocumentMetadata, logo_src: Option<&str>) -> String {
    let mut html = String::from("<header class=\"module-header\">");
    if let Some(src) = logo_src {
        html.push_str(&format!(
            "<img class=\"logo\" src=\"{}\" alt=\"\">",
            escape_html(src)
        ));
    }
    html.push_str("<div class=\"titles\">");
    html.push_str(&format!("<h1>{}</h1>", escape_html(&meta.title)));
    if let Some(topic) = meta.topic.as_deref().filter(|t| !t.trim().is_empty()) {
        html.push_str(&format!("<p class=\"topic\">{}</p>", escape_html(topic)));
    }
    let extras: Vec<String> = [meta.date.as_deref(), meta.company.as_deref()]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .map(escape_html)
        .collect();
    if !extras.is_empty() {
        html.push_str(&format!("<p class=\"meta\">{}</p>", extras.join(" &middot; ")));
    }
    html.push_str("</div>");
    html.push_str(
        "<button type=\"button\" id=\"theme-toggle\" aria-pressed=\"false\">Light / Dark</button>",
    );
    html.push_str("</header>");
    html
}

/// Password form shown before the content.
pub fn password_gate() -> &'static str {
    "<section id=\"password-gate\"><h2>Protected module</h2>\
     <form id=\"password-form\"><label for=\"password-input\">Enter the password to continue</label>\
     <input type=\"password\" id=\"password-input\" autocomplete=\"current-password\" required>\
     <p id=\"password-error\" hidden>Incorrect password.</p>\
     <button type=\"submit\">Unlock</button></form></section>"
}

/// Progress bar filled in by the viewer script.
pub fn progress_bar() -> &'static str {
    "<div class=\"progress\"><div class=\"progress-bar\"><div id=\"progress-bar-fill\"></div></div>\
     <span id=\"progress-label\"></span></div>"
}

/// Tag buttons for a list of tags. Blank tags get no button.
pub fn tag_buttons(tags: &[&str], keys: &TagKeys) -> String {
    tags.iter()
        .filter_map(|tag| {
            let key = keys.key(tag)?;
            Some(format!(
                "<button type=\"button\" class=\"tag\" data-tag=\"{}\">#{}</button>",
                key,
                escape_html(tag.trim())
            ))
        })
        .collect()
}

/// Quiz markup for one step. Quizzes whose answer is out of range are
/// dropped with a warning.
pub fn quiz(quiz: &Quiz, step_number: usize) -> Option<String> {
    if quiz.options.is_empty() || quiz.answer_index >= quiz.options.len() {
        log::warn!(
            "Step {}: quiz answer {} outside {} options, omitting quiz",
            step_number,
            quiz.answer_index,
            quiz.options.len()
        );
        return None;
    }
    let mut html = format!(
        "<div class=\"quiz\" data-answer=\"{}\"><p class=\"quiz-question\">{}</p>",
        quiz.answer_index,
        escape_html(&quiz.question)
    );
    for (i, option) in quiz.options.iter().enumerate() {
        html.push_str(&format!(
            "<button type=\"button\" class=\"quiz-option\" data-index=\"{}\">{}</button>",
            i,
            escape_html(option)
        ));
    }
    html.push_str("<div class=\"quiz-feedback\" hidden><strong class=\"quiz-verdict\"></strong>");
    if let Some(explanation) = quiz.explanation.as_deref().filter(|e| !e.trim().is_empty()) {
        html.push_str(&format!("<p>{}</p>", linkify(explanation)));
    }
    html.push_str("</div></div>");
    Some(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stylesheet_uses_theme() {
        let css = stylesheet(&PdfTheme::by_name("modern"));
        assert!(css.starts_with(":root{--primary:#0f766e;"));
        assert!(css.contains("[data-theme=dark]"));
    }

    #[test]
    fn test_header_escapes() {
        let meta = DocumentMetadata {
            title: "A <b> title".to_string(),
            company: Some("Acme & Co".to_string()),
            ..Default::default()
        };
        let html = header(&meta, None);
        assert!(html.contains("<h1>A &lt;b&gt; title</h1>"));
        assert!(html.contains("Acme &amp; Co"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_quiz_markup() {
        let q = Quiz {
            question: "Pick one".to_string(),
            options: vec!["a".to_string(), "b".to_string()],
            answer_index: 1,
            explanation: Some("Because".to_string()),
        };
        let html = quiz(&q, 1).unwrap();
        assert!(html.contains("data-answer=\"1\""));
        assert_eq!(html.matches("quiz-option").count(), 2);
        assert!(html.contains("<p>Because</p>"));

        let bad = Quiz {
            answer_index: 5,
            ..q
        };
        assert!(quiz(&bad, 1).is_none());
    }

    #[test]
    fn test_tag_buttons() {
        let tags = ["Billing Setup", "  "];
        let html = tag_buttons(&tags, &TagKeys::new(tags));
        assert_eq!(
            html,
            "<button type=\"button\" class=\"tag\" data-tag=\"tag-1\">#Billing Setup</button>"
        );
    }
}
