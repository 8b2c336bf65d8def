use std::path::Path;

const FALLBACK: &str = r#"<!DOCTYPE html>
<html><head><meta charset="UTF-8"><title>riskscan</title></head>
<body>
<h2>riskscan</h2>
<p>No front-end found. Set STATIC_DIR or place index.html in ./static/.</p>
<p>API: <code>POST /sessions</code>, then <code>POST /sessions/{id}/analyze</code> with <code>{"text": "..."}</code>.</p>
</body></html>"#;

/// The front-end page from `static_dir`, then `./static`, else a stub page.
pub fn render(static_dir: Option<&Path>) -> String {
    static_dir
        .into_iter()
        .chain(std::iter::once(Path::new("./static")))
        .find_map(|dir| std::fs::read_to_string(dir.join("index.html")).ok())
        .unwrap_or_else(|| FALLBACK.to_string())
}
