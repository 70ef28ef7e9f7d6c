//! HTML rendering of the prediction page
//!
//! Plain string templates: one dropdown, the two-column numeric fields of
//! the selected disease, the predict button and the result banner.

use std::fmt::Write;

use crate::core::form::{FormSession, FIELD_STEP};
use crate::core::registry::ModelRegistry;
use crate::models::types::{Disease, FeatureField};

const PAGE_TITLE: &str = "Disease Prediction";

const STYLE: &str = r#"
body { font-family: sans-serif; background: #1d2b24; color: #f4f4f4; margin: 0; }
main { max-width: 960px; margin: 2rem auto; padding: 1.5rem; background: rgba(0,0,0,0.6); border-radius: 15px; }
h1 { text-align: center; background: linear-gradient(45deg, #28a745, #218838); padding: 1rem; border-radius: 15px; }
.columns { display: grid; grid-template-columns: 1fr 1fr; gap: 0 2rem; }
label { display: block; margin: 0.6rem 0 0.2rem; }
input[type=number], select { width: 100%; padding: 0.4rem; box-sizing: border-box; }
button { margin-top: 1.2rem; padding: 0.6rem 1.2rem; }
.banner { margin-top: 1.2rem; padding: 0.8rem; border-radius: 8px; }
.success { background: #1e5631; }
.failure { background: #7a1f1f; }
.notice { background: #6b5a12; }
"#;

/// Escape text for HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// Render the page for a session that has a selection
pub fn render_page(form: &FormSession, registry: &ModelRegistry) -> String {
    let selected = form.disease().unwrap_or_default();
    let mut html = String::with_capacity(8 * 1024);

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{style}</style>\n</head>\n<body>\n<main>\n\
         <h1>🏥 Disease Prediction System</h1>\n",
        title = PAGE_TITLE,
        style = STYLE,
    );

    render_selector(&mut html, selected, registry);

    if let Some(err) = registry.load_error(selected) {
        let _ = writeln!(
            html,
            "<div class=\"banner notice\">{} model is not available: {}</div>",
            escape_html(selected.label()),
            escape_html(err.code_str()),
        );
    }

    let _ = writeln!(
        html,
        "<form method=\"post\" action=\"/predict\" novalidate>\n\
         <input type=\"hidden\" name=\"disease\" value=\"{}\">",
        selected.slug()
    );
    let (left, right) = form.spec().map(|s| s.columns()).unwrap_or((&[], &[]));
    html.push_str("<div class=\"columns\">\n");
    render_column(&mut html, left, form);
    render_column(&mut html, right, form);
    html.push_str("</div>\n");
    let _ = writeln!(
        html,
        "<button type=\"submit\">Predict {}</button>\n</form>",
        escape_html(selected.label())
    );

    if let Some(displayed) = form.displayed() {
        let class = if displayed.is_failure() { "failure" } else { "success" };
        let _ = writeln!(
            html,
            "<div class=\"banner {}\" id=\"result\">{}</div>",
            class,
            escape_html(&displayed.message())
        );
    }

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn render_selector(html: &mut String, selected: Disease, registry: &ModelRegistry) {
    html.push_str(
        "<form method=\"post\" action=\"/select\">\n\
         <label for=\"disease\">Select Disease to Predict</label>\n\
         <select id=\"disease\" name=\"disease\" onchange=\"this.form.submit()\">\n",
    );
    for disease in Disease::ALL {
        let _ = writeln!(
            html,
            "<option value=\"{}\"{}>{}{}</option>",
            disease.slug(),
            if disease == selected { " selected" } else { "" },
            escape_html(disease.label()),
            if registry.is_available(disease) { "" } else { " (unavailable)" },
        );
    }
    html.push_str("</select>\n<noscript><button type=\"submit\">Select</button></noscript>\n</form>\n");
}

fn render_column(html: &mut String, fields: &[FeatureField], form: &FormSession) {
    html.push_str("<div>\n");
    for field in fields {
        let value = form.value(field.key).unwrap_or_default();
        let _ = writeln!(
            html,
            "<label for=\"f-{key}\">{label}</label>\n\
             <input type=\"number\" id=\"f-{key}\" name=\"{key}\" value=\"{value}\" step=\"{step}\">",
            key = escape_html(field.key),
            label = escape_html(field.label),
            value = value,
            step = FIELD_STEP,
        );
    }
    html.push_str("</div>\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("Fasting Blood Sugar > 120 & \"x\""),
            "Fasting Blood Sugar &gt; 120 &amp; &quot;x&quot;"
        );
    }

    #[test]
    fn test_page_lists_fields_in_order() {
        let registry = ModelRegistry::builder().build();
        let mut form = FormSession::new();
        form.select(Disease::HypoThyroid, &registry);
        form.set_value("TSH", 2.5);

        let html = render_page(&form, &registry);
        assert!(html.contains("Predict 🔬 Hypo-Thyroid"));
        assert!(html.contains("value=\"2.5\""));
        assert!(html.contains("<option value=\"hypothyroid\" selected>"));
        let positions: Vec<usize> = ["name=\"Age\"", "name=\"Sex\"", "name=\"TSH\"", "name=\"FTI\""]
            .iter()
            .map(|needle| html.find(needle).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        // unregistered model shows a notice
        assert!(html.contains("MODEL_UNAVAILABLE"));
    }
}
