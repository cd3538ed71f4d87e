//! Server-rendered pages: home, the add-school form and the gallery.

pub mod gallery;
pub mod home;
pub mod school_form;

const STYLES: &str = r#"
* { box-sizing: border-box; margin: 0; padding: 0; }
body { font-family: system-ui, -apple-system, "Segoe UI", Roboto, sans-serif; background: #f8fafc; color: #1e293b; }
.navbar { background: #1e40af; color: #fff; padding: 1rem 0; }
.nav-container, .container { max-width: 1100px; margin: 0 auto; padding: 0 1.5rem; }
.nav-container { display: flex; justify-content: space-between; align-items: center; }
.nav-brand { color: #fff; font-weight: 700; font-size: 1.25rem; text-decoration: none; }
.nav-links { display: flex; gap: 1.5rem; list-style: none; }
.nav-links a { color: #e0e7ff; text-decoration: none; }
main { padding: 2rem 0; }
.hero-section { text-align: center; padding: 4rem 0; }
.hero-title, .page-title, .form-title { font-size: 2rem; margin-bottom: 1rem; text-align: center; }
.hero-description { max-width: 640px; margin: 0 auto 2rem; color: #475569; }
.hero-buttons { display: flex; gap: 1rem; justify-content: center; }
.btn { display: inline-block; background: #2563eb; color: #fff; border: none; border-radius: 8px; padding: 0.75rem 1.5rem; font-size: 1rem; cursor: pointer; text-decoration: none; }
.form-container { max-width: 640px; margin: 0 auto; background: #fff; padding: 2rem; border-radius: 12px; box-shadow: 0 1px 3px rgba(0,0,0,0.1); }
.form-group { margin-bottom: 1.25rem; }
.form-label { display: block; font-weight: 600; margin-bottom: 0.5rem; }
.form-input { width: 100%; padding: 0.65rem; border: 1px solid #cbd5e1; border-radius: 6px; font-size: 1rem; }
.form-hint { color: #64748b; font-size: 0.875rem; margin-top: 0.25rem; display: block; }
.success-message { background: #dcfce7; color: #166534; padding: 0.75rem 1rem; border-radius: 6px; margin-bottom: 1rem; }
.error-message { background: #fee2e2; color: #991b1b; padding: 0.75rem 1rem; border-radius: 6px; margin-bottom: 1rem; }
.schools-count { text-align: center; margin-bottom: 2rem; color: #64748b; font-size: 1.1rem; }
.schools-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(260px, 1fr)); gap: 1.5rem; }
.school-card { background: #fff; border-radius: 12px; overflow: hidden; box-shadow: 0 1px 3px rgba(0,0,0,0.1); }
.school-image { width: 100%; height: 180px; object-fit: cover; background: #e2e8f0; }
.school-info { padding: 1rem; }
.school-name { font-size: 1.1rem; margin-bottom: 0.5rem; }
.school-address, .school-city { color: #475569; font-size: 0.95rem; }
.no-schools { text-align: center; color: #64748b; padding: 3rem 0; }
"#;

/// Escape text for use in HTML element content and quoted attribute values
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Wrap page content in the shared document shell and navigation bar
pub fn layout(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | School Management System</title>
<style>{STYLES}</style>
</head>
<body>
<nav class="navbar">
  <div class="nav-container">
    <a href="/" class="nav-brand">🏫 School Management</a>
    <ul class="nav-links">
      <li><a href="/">Home</a></li>
      <li><a href="/addSchool">Add School</a></li>
      <li><a href="/showSchools">View Schools</a></li>
    </ul>
  </div>
</nav>
<main>{content}</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_and_quotes() {
        assert_eq!(
            escape(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;"
        );
        assert_eq!(escape("Springfield"), "Springfield");
    }

    #[test]
    fn layout_includes_navigation() {
        let page = layout("Home", "<p>hello</p>");
        assert!(page.contains("<title>Home | School Management System</title>"));
        assert!(page.contains(r#"href="/addSchool""#));
        assert!(page.contains(r#"href="/showSchools""#));
        assert!(page.contains("<p>hello</p>"));
    }
}
