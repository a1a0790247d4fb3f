use super::{DisplayContext, Tabular};

/// Delay before the print dialog opens, giving the page time to lay out
pub const PRINT_DELAY_MS: u64 = 300;

const STYLE: &str = r#"<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Helvetica, Arial, sans-serif; padding: 16px; }
  h1 { font-size: 18px; margin: 0 0 12px; }
  p.meta { font-size: 11px; color: #666; margin: 0 0 12px; }
  table { width: 100%; border-collapse: collapse; font-size: 12px; }
  th, td { border: 1px solid #ddd; padding: 6px 8px; text-align: left; }
  th { background: #f5f5f5; }
  td.num { text-align: right; }
  td.empty { text-align: center; color: #888; }
</style>"#;

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Standalone document that prints itself once loaded
pub fn printable_html<R: Tabular>(
    title: &str,
    subtitle: Option<&str>,
    rows: &[R],
    ctx: &DisplayContext,
) -> String {
    let mut html = String::new();
    html.push_str("<!doctype html><html><head><meta charset=\"utf-8\">");
    html.push_str(&format!("<title>{}</title>", escape_html(title)));
    html.push_str(STYLE);
    html.push_str("</head><body>");
    html.push_str(&format!("<h1>{}</h1>", escape_html(title)));
    if let Some(sub) = subtitle {
        html.push_str(&format!("<p class=\"meta\">{}</p>", escape_html(sub)));
    }

    html.push_str("<table><thead><tr>");
    for header in R::headers() {
        html.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    html.push_str("</tr></thead><tbody>");

    if rows.is_empty() {
        html.push_str(&format!(
            "<tr><td class=\"empty\" colspan=\"{}\">No records found</td></tr>",
            R::headers().len()
        ));
    }
    for row in rows {
        html.push_str("<tr>");
        for cell in row.cells(ctx) {
            let class = if cell.is_numeric() { " class=\"num\"" } else { "" };
            html.push_str(&format!("<td{}>{}</td>", class, escape_html(cell.display())));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");

    html.push_str(&format!(
        "<script>window.addEventListener('load', function () {{ setTimeout(function () {{ window.print(); }}, {}); }});</script>",
        PRINT_DELAY_MS
    ));
    html.push_str("</body></html>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SupplyRecord;

    #[test]
    fn escapes_markup_in_values() {
        assert_eq!(
            escape_html(r#"<b>"x" & 'y'</b>"#),
            "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn document_has_rows_numeric_alignment_and_print_hook() {
        let rows = vec![SupplyRecord {
            product_name: Some("Arroz <5kg>".into()),
            quantity: 12.0,
            total_cost: 1500.0,
            ..Default::default()
        }];
        let html = printable_html("Supply history", None, &rows, &DisplayContext::default());
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("<th>Product</th>"));
        assert!(html.contains("Arroz &lt;5kg&gt;"));
        assert!(html.contains("<td class=\"num\">1,500.00</td>"));
        assert!(html.contains("window.print()"));
        assert!(html.contains("300"));
    }

    #[test]
    fn empty_list_renders_placeholder_row() {
        let html = printable_html::<SupplyRecord>("Supply history", Some("Page 1"), &[], &DisplayContext::default());
        assert!(html.contains("No records found"));
        assert!(html.contains("colspan=\"8\""));
        assert!(html.contains("Page 1"));
    }
}
