use crate::lookup::{Attribute, DamageType, EffectKey, ScalingGrade, WeaponCategory};
use crate::model::InfusedWeapon;
use crate::write_output_file;
use anyhow::Result;
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::path::Path;

pub struct HtmlReportPaths<'a> {
    pub(crate) json: &'a Path,
    pub(crate) csv: Option<&'a Path>,
}

pub struct HtmlReportContext<'a> {
    pub(crate) weapon_count: usize,
    pub(crate) run_started_at: &'a DateTime<Local>,
    pub(crate) rows: &'a [InfusedWeapon],
    pub(crate) paths: HtmlReportPaths<'a>,
    pub(crate) output_path: &'a Path,
}

pub async fn save_html_report(output_path: &Path, context: &HtmlReportContext<'_>) -> Result<()> {
    let html = render_html_report(context);
    write_output_file(output_path, html.as_bytes()).await
}

fn render_html_report(context: &HtmlReportContext<'_>) -> String {
    let generated_at = context
        .run_started_at
        .format("%Y-%m-%d %H:%M:%S %Z")
        .to_string();
    let title = format!(
        "Weapon Table - {}",
        context.run_started_at.format("%Y-%m-%d")
    );
    let groups = group_by_category(context.rows);

    let mut html = String::new();
    html.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(&title)));
    html.push_str("<style>\n");
    html.push_str(REPORT_STYLE);
    html.push_str("\n</style>\n</head>\n<body>\n");
    html.push_str("<div class=\"page\">\n");
    html.push_str("<header class=\"hero\">\n");
    html.push_str(&format!(
        "<div class=\"pill\">erdtable v{}</div>\n",
        env!("CARGO_PKG_VERSION")
    ));
    html.push_str("<h1>Weapon Table</h1>\n");
    html.push_str("<div class=\"meta\">\n");
    html.push_str(&format!(
        "<div><span class=\"label\">Generated</span><span class=\"value mono\">{}</span></div>\n",
        escape_html(&generated_at)
    ));
    html.push_str(&format!(
        "<div><span class=\"label\">Weapons</span><span class=\"value mono\">{}</span></div>\n",
        context.weapon_count
    ));
    html.push_str(&format!(
        "<div><span class=\"label\">Rows</span><span class=\"value mono\">{}</span></div>\n",
        context.rows.len()
    ));
    html.push_str("</div>\n</header>\n");

    if groups.is_empty() {
        html.push_str("<p class=\"hint\">No weapons to show.</p>\n");
    }
    for (category, rows) in &groups {
        html.push_str("<section class=\"table-section\">\n");
        html.push_str(&format!(
            "<h2>{} <span class=\"count\">{}</span></h2>\n",
            escape_html(category.name()),
            rows.len()
        ));
        html.push_str("<div class=\"table-wrap\">\n<table>\n");
        html.push_str(&render_table_header());
        html.push_str("<tbody>\n");
        for row in rows {
            html.push_str(&render_table_row(row));
        }
        html.push_str("</tbody>\n</table>\n</div>\n</section>\n");
    }

    html.push_str(&render_downloads(context));
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn group_by_category(rows: &[InfusedWeapon]) -> BTreeMap<WeaponCategory, Vec<&InfusedWeapon>> {
    let mut groups: BTreeMap<WeaponCategory, Vec<&InfusedWeapon>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.profile.category).or_default().push(row);
    }
    groups
}

fn render_table_header() -> String {
    let mut header = String::new();
    header.push_str("<thead><tr>");
    header.push_str("<th>Weapon</th><th>Infusion</th><th>Lvl</th>");
    for damage in DamageType::ALL {
        header.push_str(&format!("<th>{}</th>", damage.code()));
    }
    for attribute in Attribute::ALL {
        header.push_str(&format!("<th>{}</th>", attribute.code()));
    }
    header.push_str("<th>Effects</th><th>Crit</th><th>Wgt</th>");
    header.push_str("</tr></thead>\n");
    header
}

fn render_table_row(row: &InfusedWeapon) -> String {
    let mut line = String::new();
    line.push_str("<tr>");
    line.push_str(&format!(
        "<td class=\"name\"><a href=\"{}\">{}</a></td>",
        escape_html(&row.profile.wiki_url),
        escape_html(&row.profile.name)
    ));
    line.push_str(&format!("<td>{}</td>", escape_html(row.infusion.wiki_name())));
    line.push_str(&format!("<td class=\"mono\">+{}</td>", row.level));
    for damage in DamageType::ALL {
        line.push_str(&format!(
            "<td class=\"mono\">{}</td>",
            format_number(*row.stats.attack.get(damage))
        ));
    }
    for attribute in Attribute::ALL {
        line.push_str(&format!(
            "<td class=\"mono\">{}</td>",
            format_grade(*row.stats.scaling.get(attribute))
        ));
    }
    line.push_str(&format!(
        "<td>{}</td>",
        escape_html(&format_effects(row))
    ));
    line.push_str(&format!(
        "<td class=\"mono\">{}</td>",
        format_number(row.profile.critical)
    ));
    line.push_str(&format!(
        "<td class=\"mono\">{}</td>",
        format_number(row.profile.weight)
    ));
    line.push_str("</tr>\n");
    line
}

fn render_downloads(context: &HtmlReportContext<'_>) -> String {
    let mut section = String::new();
    section.push_str("<section class=\"downloads\">\n<h2>Data</h2>\n<ul>\n");
    let entries = [("JSON", Some(context.paths.json)), ("CSV", context.paths.csv)];
    for (label, path) in entries {
        let Some(path) = path else {
            continue;
        };
        let display = path.display().to_string();
        match relative_link(context.output_path, path) {
            Some(rel) => section.push_str(&format!(
                "<li><span class=\"label\">{}</span> <a href=\"{}\">{}</a></li>\n",
                escape_html(label),
                escape_html(&rel),
                escape_html(&display)
            )),
            None => section.push_str(&format!(
                "<li><span class=\"label\">{}</span> <span class=\"mono\">{}</span></li>\n",
                escape_html(label),
                escape_html(&display)
            )),
        }
    }
    section.push_str("</ul>\n</section>\n");
    section
}

fn relative_link(html_path: &Path, target: &Path) -> Option<String> {
    let html_dir = html_path.parent()?;
    let target_dir = target.parent()?;
    if html_dir == target_dir {
        target
            .file_name()
            .and_then(|name| name.to_str())
            .map(std::string::ToString::to_string)
    } else {
        None
    }
}

fn format_number(value: f64) -> String {
    if value == 0.0 {
        "-".to_string()
    } else if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

fn format_grade(value: f64) -> String {
    ScalingGrade::from_value(value).map_or_else(|| "-".to_string(), |grade| grade.letter().to_string())
}

fn format_effects(row: &InfusedWeapon) -> String {
    let parts: Vec<String> = EffectKey::ALL
        .into_iter()
        .filter_map(|effect| {
            let value = *row.stats.effects.get(effect);
            (value > 0.0).then(|| format!("{} {}", effect.short_name(), format_number(value)))
        })
        .collect();
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(", ")
    }
}

fn escape_html(input: &str) -> String {
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

const REPORT_STYLE: &str = r#"
:root {
  color-scheme: dark;
  --bg: #15130f;
  --panel: #1f1c17;
  --ink: #e9e1cf;
  --muted: #9a8f78;
  --gold: #c9a44c;
  --border: #3a342a;
}

* {
  box-sizing: border-box;
}

body {
  margin: 0;
  background: var(--bg);
  color: var(--ink);
  font-family: Georgia, "Times New Roman", serif;
}

.page {
  max-width: 1200px;
  margin: 0 auto;
  padding: 32px 20px 64px;
}

.hero h1 {
  margin: 8px 0 12px;
  color: var(--gold);
  font-weight: 600;
}

.pill {
  display: inline-block;
  padding: 2px 10px;
  border: 1px solid var(--gold);
  border-radius: 999px;
  font-size: 12px;
  color: var(--gold);
}

.meta {
  display: flex;
  gap: 24px;
  color: var(--muted);
}

.meta .label,
.downloads .label {
  margin-right: 6px;
  text-transform: uppercase;
  font-size: 11px;
  letter-spacing: 0.08em;
}

.mono {
  font-family: "JetBrains Mono", Menlo, monospace;
}

.table-section h2 .count {
  color: var(--muted);
  font-size: 14px;
}

.table-wrap {
  overflow-x: auto;
  background: var(--panel);
  border: 1px solid var(--border);
  border-radius: 8px;
}

table {
  width: 100%;
  border-collapse: collapse;
  font-size: 13px;
}

th,
td {
  padding: 6px 10px;
  border-bottom: 1px solid var(--border);
  text-align: right;
  white-space: nowrap;
}

th:first-child,
td.name {
  text-align: left;
}

th {
  color: var(--gold);
  font-weight: 600;
}

a {
  color: var(--ink);
}

.hint {
  color: var(--muted);
}
"#;
