//! Placeholder image served when neither cache nor network can answer

use crate::request::Response;

/// Content type of the placeholder response
pub const FALLBACK_CONTENT_TYPE: &str = "image/svg+xml";

/// Render the warning-triangle placeholder with `title` as its caption
pub fn render_svg(title: &str) -> String {
    format!(
        r##"
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 400 400" stroke-linejoin="round">
	<title>{}</title>
	<path stroke="#ddd" stroke-width="25" d="M199 128L115 272h168z" />
	<path fill="#fff" stroke="#eee" stroke-width="17" d="M199 128L115 272h168z" />
	<g fill="#aaa">
		<path d="M191 180a9 9 0 0118 0l-5 50a4 4 0 01-8 0z" />
		<circle cx="200" cy="248" r="9" />
	</g>
</svg>
"##,
        escape_xml(title)
    )
}

/// Synthetic 200 response carrying the placeholder image
pub fn response(title: &str) -> Response {
    Response::new(200, render_svg(title)).with_header("Content-Type", FALLBACK_CONTENT_TYPE)
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
