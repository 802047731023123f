//! HTML rendering for the admin page.

use keygate_activation::Bindings;
use std::fmt::Write;

/// Renders all bindings as a table with one delete form per row.
pub fn render_admin_page(bindings: &Bindings) -> String {
    let mut rows = String::new();
    for (key, identifier) in bindings {
        let _ = write!(
            rows,
            r#"
      <tr>
        <td><code>{key}</code></td>
        <td><code>{identifier}</code></td>
        <td>
          <form method="post" action="/remove_key/{action}" onsubmit="return removeKey(this);">
            <button type="submit">Delete</button>
          </form>
        </td>
      </tr>"#,
            key = escape_html(key),
            identifier = escape_html(identifier),
            action = escape_html(&urlencoding::encode(key)),
        );
    }

    if bindings.is_empty() {
        rows.push_str(
            r#"
      <tr><td colspan="3"><em>No keys have been activated.</em></td></tr>"#,
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Keygate Admin</title>
  <style>
    body {{ font-family: sans-serif; margin: 2rem; }}
    table {{ border-collapse: collapse; }}
    th, td {{ border: 1px solid #ccc; padding: 0.4rem 0.8rem; text-align: left; }}
  </style>
  <script>
    function removeKey(form) {{
      fetch(form.action, {{ method: "POST" }}).then(function () {{ location.reload(); }});
      return false;
    }}
  </script>
</head>
<body>
  <h1>Activated Keys</h1>
  <p>{count} binding(s)</p>
  <table>
    <thead>
      <tr><th>Key</th><th>UUID</th><th></th></tr>
    </thead>
    <tbody>{rows}
    </tbody>
  </table>
</body>
</html>
"#,
        count = bindings.len(),
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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
