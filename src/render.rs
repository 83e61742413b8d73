//! Markup builders for the structured assistant messages.
//!
//! Everything user-facing that is not a plain-text notice is assembled here:
//! the detected-ingredients list, the rendered recipe, and the chat answer.
//! Step text may carry lightweight markdown and is converted to display
//! markup before concatenation; item lists are emitted verbatim.

use pulldown_cmark::{html, Options, Parser};

use crate::types::{Recipe, SectionBody};

/// Convert one markdown-bearing step into display markup.
pub fn markdown_to_markup(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let parser = Parser::new_ext(text, options);
    let mut markup = String::new();
    html::push_html(&mut markup, parser);
    markup
}

/// The message appended after every successful detection, empty set included.
pub fn detected_ingredients_message(names: &[String]) -> String {
    let rows: String = names
        .iter()
        .map(|name| format!("<li>{}</li>", name))
        .collect();
    format!("<h4>Detected Ingredients:</h4><ul>{}</ul>", rows)
}

/// The message appended after a successful generation: a banner, then each
/// section's heading and body in response order, no separators in between.
pub fn recipe_message(recipe: &Recipe) -> String {
    let mut markup = String::from("<h4>Generated Recipe:</h4>");

    for section in &recipe.sections {
        markup.push_str(&format!("<h5>{}</h5>", section.heading));
        match &section.body {
            SectionBody::Items(items) => {
                markup.push_str("<ul>");
                for item in items {
                    markup.push_str(&format!("<li>{}</li>", item));
                }
                markup.push_str("</ul>");
            }
            SectionBody::Steps(steps) => {
                for step in steps {
                    markup.push_str(&markdown_to_markup(step));
                }
            }
        }
    }

    markup
}

/// The message appended after a successful chat query.
pub fn answer_message(lines: &[String]) -> String {
    format!("<h4>Response:</h4>{}", lines.join("<br/>"))
}
