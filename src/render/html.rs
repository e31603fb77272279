use crate::availability::AvailabilityReport;

/// Render a self-contained availability page (data embedded as JSON).
///
/// The template is filled with `replace` rather than `format!()` because the
/// HTML contains many `{}` from CSS and JS template literals.
pub fn render_availability_html(report: &AvailabilityReport) -> anyhow::Result<String> {
    // `</` inside a string would end the script element early.
    let json = serde_json::to_string(report)?.replace("</", "<\\/");

    const TEMPLATE: &str = r##"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="keywords" content="__SERVER__ HAPI Heliophysics Data Availability">
<meta name="description" content="HAPI Server Availability for __SERVER__; https://github.com/hapi-server/servers">
<title>__SERVER__</title>
<style>
  body { font-family: "Times New Roman", serif; margin: 0; padding: 8px 12px; }
  header { padding-bottom: 8px; border-bottom: 1px solid #ddd; }
  .muted { color: #777; font-size: 12px; }
  .axis, .row { position: relative; height: 16px; margin-left: 0; }
  .axis { height: 18px; border-bottom: 1px solid #999; margin-bottom: 4px; }
  .tick { position: absolute; top: 0; font-size: 11px; transform: translateX(-50%); }
  .grid { position: absolute; top: 0; bottom: 0; border-left: 1px solid #eee; }
  .bar { position: absolute; top: 3px; height: 10px; min-width: 2px; border-radius: 1px; }
  .label { position: absolute; top: 0; font-size: 12px; white-space: nowrap; padding-left: 4px; }
  .label a { color: inherit; text-decoration: none; }
  .label a:hover { text-decoration: underline; }
  #rows { position: relative; }
</style>
</head>
<body>
<header>
  Time range of datasets available from the
  <a href="https://hapi-server.org/servers/#server=__SERVER__" target="_blank">__SERVER__</a> HAPI server.
  <a href="__SERVER__.csv" target="_blank">Time range data</a>
  <div class="muted" id="title"></div>
  <div style="margin-top: 6px;">
    <b>Search:</b>
    <input id="search" placeholder="dataset id..." style="padding: 3px 6px; border: 1px solid #ddd; border-radius: 4px;">
    <span class="muted">Click a dataset name for its information, a bar for plots of its parameters.</span>
  </div>
</header>

<div class="axis" id="axis"></div>
<div id="rows"></div>
<div class="muted" id="skipped"></div>

<script>
const DATA = __DATA__;
const COLORS = ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf"];

const state = { search: "" };

function escapeHtml(s) {
  return String(s)
    .replaceAll("&", "&amp;")
    .replaceAll("<", "&lt;")
    .replaceAll(">", "&gt;")
    .replaceAll('"', "&quot;")
    .replaceAll("'", "&#39;");
}

function renderAxis() {
  const axis = document.getElementById("axis");
  axis.innerHTML = DATA.ticks
    .map(t => `<span class="tick" style="left:${t.pct}%">${escapeHtml(t.label)}</span>`)
    .join("");
}

function renderRows() {
  const rows = document.getElementById("rows");
  rows.innerHTML = "";
  const s = state.search.toLowerCase();
  DATA.bars.forEach((bar, n) => {
    if (s && !bar.dataset.toLowerCase().includes(s)) return;
    const color = COLORS[n % COLORS.length];
    const row = document.createElement("div");
    row.className = "row";
    const grid = DATA.ticks.map(t => `<span class="grid" style="left:${t.pct}%"></span>`).join("");
    const left = bar.clipped_start ? "&larr;" : "";
    const right = bar.clipped_stop ? "&rarr; " : "";
    row.innerHTML = `${grid}
      <a href="${escapeHtml(bar.plot_link)}" target="_blank"
         title="${escapeHtml(bar.start)} to ${escapeHtml(bar.stop)}">
        <span class="bar" style="left:${bar.left}%; width:${bar.width}%; background:${color}"></span>
      </a>
      <span class="label" style="left:${bar.left + bar.width}%; color:${color}">
        ${left}${right}<a href="${escapeHtml(bar.info_link)}" target="_blank">${escapeHtml(bar.dataset)}</a>
      </span>`;
    rows.appendChild(row);
  });
}

document.getElementById("title").textContent = DATA.title;
if (DATA.skipped.length) {
  document.getElementById("skipped").textContent =
    `${DATA.skipped.length} datasets without a valid time range: ` + DATA.skipped.join(", ");
}
document.getElementById("search").addEventListener("input", (e) => {
  state.search = e.target.value || "";
  renderRows();
});

renderAxis();
renderRows();
</script>
</body>
</html>
"##;

    Ok(TEMPLATE
        .replace("__SERVER__", &html_escape(&report.server))
        .replace("__DATA__", &json))
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
