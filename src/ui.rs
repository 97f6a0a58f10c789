pub fn render_dashboard(username: &str) -> String {
    DASHBOARD_HTML
        .replace("{{STYLE}}", STYLE)
        .replace("{{USER}}", &escape_html(username))
}

pub fn render_login(current: Option<&str>) -> String {
    LOGIN_HTML
        .replace("{{STYLE}}", STYLE)
        .replace("{{CURRENT}}", &escape_html(current.unwrap_or("")))
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

const STYLE: &str = r#"
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #10141c;
      --bg-2: #3a1216;
      --ink: #f4f1ec;
      --muted: #9a948c;
      --accent: #ef4444;
      --good: #4ade80;
      --card: rgba(255, 255, 255, 0.06);
      --shadow: 0 24px 60px rgba(0, 0, 0, 0.35);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #1a1f2b 60%, #0d1016 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(980px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      justify-content: space-between;
      align-items: flex-end;
      gap: 16px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    h1 span {
      color: var(--accent);
    }

    .subtitle {
      margin: 4px 0 0;
      color: var(--muted);
      font-size: 0.95rem;
    }

    .subtitle a {
      color: var(--ink);
    }

    .controls {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
      align-items: flex-end;
    }

    .controls label {
      display: grid;
      gap: 4px;
      font-size: 0.75rem;
      color: var(--muted);
    }

    input {
      background: rgba(0, 0, 0, 0.35);
      border: 1px solid rgba(255, 255, 255, 0.12);
      border-radius: 10px;
      color: var(--ink);
      padding: 8px 10px;
      width: 90px;
      font: inherit;
    }

    .tabs {
      display: flex;
      gap: 4px;
      padding: 4px;
      background: rgba(0, 0, 0, 0.35);
      border-radius: 999px;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 8px 14px;
      font: inherit;
      font-weight: 600;
      cursor: pointer;
      background: transparent;
      color: var(--muted);
    }

    .tab.active,
    .primary {
      background: var(--accent);
      color: white;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(190px, 1fr));
      gap: 16px;
    }

    .stat {
      background: rgba(255, 255, 255, 0.04);
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(255, 255, 255, 0.08);
      display: grid;
      gap: 6px;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: var(--muted);
    }

    .stat .value {
      font-size: 2.2rem;
      font-weight: 600;
    }

    .stat .note {
      font-size: 0.8rem;
      color: var(--muted);
    }

    .chart-card {
      background: rgba(255, 255, 255, 0.04);
      border-radius: 20px;
      padding: 16px;
      border: 1px solid rgba(255, 255, 255, 0.08);
    }

    .chart-header {
      display: flex;
      justify-content: space-between;
      align-items: baseline;
      gap: 12px;
    }

    .chart-header h2 {
      margin: 0;
      font-size: 1rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: var(--muted);
    }

    #chart {
      width: 100%;
      height: 220px;
      display: block;
    }

    .bar-up {
      fill: var(--good);
    }

    .bar-down {
      fill: var(--accent);
    }

    .chart-axis {
      stroke: rgba(255, 255, 255, 0.25);
    }

    .chart-label {
      fill: var(--muted);
      font-size: 11px;
    }

    .status {
      font-size: 0.95rem;
      color: var(--muted);
      min-height: 1.2em;
    }

    .status[data-type="error"] {
      color: #f87171;
    }

    .login {
      width: min(440px, 100%);
    }

    .login form {
      display: grid;
      gap: 14px;
    }

    .login input {
      width: 100%;
      padding: 12px 14px;
    }
"#;

const LOGIN_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Coding Goal Dashboard</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app login">
    <header>
      <div>
        <h1>Coding <span>Goals</span></h1>
        <p class="subtitle">Enter your time-tracking user ID to start.</p>
      </div>
    </header>
    <form method="post" action="/login">
      <input name="username" type="text" placeholder="e.g. U01234567" value="{{CURRENT}}" autofocus required />
      <button class="primary" type="submit">Start tracking</button>
    </form>
  </main>
</body>
</html>
"#;

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Coding Goal Dashboard</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app">
    <header>
      <div>
        <h1>Coding <span>Goals</span></h1>
        <p class="subtitle">Tracking {{USER}} &middot; <a href="/login">change user</a></p>
      </div>
      <div class="controls">
        <div class="tabs" role="tablist">
          <button class="tab" type="button" data-mode="daily">Daily</button>
          <button class="tab" type="button" data-mode="total">Total</button>
        </div>
        <label id="daily-field">Daily goal (h)
          <input id="daily-goal" type="number" min="0" step="0.25" />
        </label>
        <label id="total-field">Year goal (h)
          <input id="target-total" type="number" min="0" step="1" />
        </label>
        <label>Streak min (m)
          <input id="streak-min" type="number" min="0" step="1" />
        </label>
        <button class="primary" id="refresh" type="button">Refresh</button>
      </div>
    </header>

    <section class="panel">
      <div class="stat">
        <span class="label">Time left</span>
        <span class="value" id="days-left">--</span>
        <span class="note">Days until New Year</span>
      </div>
      <div class="stat">
        <span class="label">Today</span>
        <span class="value" id="today-hours">--</span>
        <span class="note" id="today-languages">Hours coded today</span>
      </div>
      <div class="stat">
        <span class="label">Streak</span>
        <span class="value" id="streak">--</span>
        <span class="note" id="streak-note">Days</span>
      </div>
      <div class="stat">
        <span class="label">Total hours</span>
        <span class="value" id="total-hours">--</span>
        <span class="note" id="total-note">Recorded this year</span>
      </div>
      <div class="stat">
        <span class="label" id="goal-label">Daily target</span>
        <span class="value" id="goal-value">--</span>
        <span class="note" id="goal-note"></span>
      </div>
      <div class="stat">
        <span class="label" id="pace-label">Pace</span>
        <span class="value" id="pace-value">--</span>
        <span class="note" id="pace-note"></span>
      </div>
      <div class="stat">
        <span class="label">High score</span>
        <span class="value" id="high-score">--</span>
        <span class="note">Most hours in a single day</span>
      </div>
      <div class="stat">
        <span class="label">Streak avg</span>
        <span class="value" id="streak-avg">--</span>
        <span class="note">Avg hours during current streak</span>
      </div>
    </section>

    <section class="chart-card">
      <div class="chart-header">
        <h2>Last 7 days</h2>
        <span class="note" id="baseline"></span>
      </div>
      <svg id="chart" viewBox="0 0 600 220" aria-label="Deviation from required hours" role="img"></svg>
    </section>

    <div class="status" id="status"></div>
  </main>

  <script>
    const $ = (id) => document.getElementById(id);
    const tabs = Array.from(document.querySelectorAll('.tab'));
    let goal = null;

    const setStatus = (message, type) => {
      $('status').textContent = message;
      $('status').dataset.type = type || '';
    };

    const hours = (value, decimals = 1) =>
      typeof value === 'number' && Number.isFinite(value) ? `${value.toFixed(decimals)}h` : '--';

    const signed = (value) => `${value > 0 ? '+' : ''}${value.toFixed(2)}`;

    const renderChart = (points, required) => {
      const width = 600;
      const height = 220;
      const labelSpace = 24;
      const mid = (height - labelSpace) / 2;
      const slot = width / points.length;
      const maxAbs = Math.max(1, ...points.map((p) => Math.abs(p.deviation)));
      const scale = (mid - 16) / maxAbs;

      const bars = points.map((point, index) => {
        const x = index * slot + slot * 0.3;
        const w = slot * 0.4;
        const h = Math.abs(point.deviation) * scale;
        const up = point.deviation >= 0;
        const y = up ? mid - h : mid;
        return `<rect class="${up ? 'bar-up' : 'bar-down'}" x="${x}" y="${y}" width="${w}" height="${h}" rx="3">` +
          `<title>${point.date}: ${point.hours.toFixed(2)}h (${signed(point.deviation)})</title></rect>` +
          `<text class="chart-label" x="${x + w / 2}" y="${height - 6}" text-anchor="middle">${point.weekday}</text>`;
      }).join('');

      $('chart').innerHTML =
        `<line class="chart-axis" x1="0" y1="${mid}" x2="${width}" y2="${mid}" />${bars}`;
      $('baseline').textContent = `Baseline: ${required.toFixed(2)}h / day`;
    };

    const syncControls = () => {
      tabs.forEach((tab) => tab.classList.toggle('active', tab.dataset.mode === goal.mode));
      $('daily-field').hidden = goal.mode !== 'daily';
      $('total-field').hidden = goal.mode !== 'total';
      $('daily-goal').value = goal.daily_goal_hours;
      $('target-total').value = goal.target_total_hours;
      $('streak-min').value = goal.streak_min_minutes;
    };

    const render = (data) => {
      const m = data.metrics;
      goal = data.goal;
      syncControls();

      $('days-left').textContent = m.days_remaining;
      $('today-hours').textContent = hours(m.today_hours);
      $('today-languages').textContent = data.top_languages.length
        ? data.top_languages.map((l) => l.name).join(', ')
        : 'Hours coded today';
      $('streak').textContent = m.current_streak;
      $('streak-note').textContent = `Days >= ${goal.streak_min_minutes} min`;
      $('total-hours').textContent = m.year_to_date_hours.toFixed(1);
      $('total-note').textContent = m.hours_left_to_target === null
        ? 'Recorded this year'
        : `${m.hours_left_to_target.toFixed(1)}h left to reach ${goal.target_total_hours}h`;
      $('high-score').textContent = hours(m.high_score_hours);
      $('streak-avg').textContent = hours(m.streak_average_hours);

      if (goal.mode === 'daily') {
        $('goal-label').textContent = 'Daily goal';
        $('goal-value').textContent = hours(m.required_daily_hours, 2);
        $('goal-note').textContent = 'Fixed hours per day';
        $('pace-label').textContent = 'Projection';
        $('pace-value').textContent = hours(m.projection_or_deviation, 0);
        $('pace-note').textContent = `Projected total at ${goal.daily_goal_hours}h/day`;
      } else {
        $('goal-label').textContent = 'Daily target';
        $('goal-value').textContent = hours(m.required_daily_hours, 2);
        $('goal-note').textContent = `Required daily to hit ${goal.target_total_hours}h`;
        $('pace-label').textContent = 'Pace';
        $('pace-value').textContent = `${signed(m.projection_or_deviation)}h`;
        $('pace-note').textContent = m.projection_or_deviation >= 0 ? 'Ahead of linear pace' : 'Behind linear pace';
      }

      renderChart(m.last_7_days, m.required_daily_hours);
    };

    const request = async (method, url, body) => {
      const res = await fetch(url, {
        method,
        headers: body ? { 'content-type': 'application/json' } : {},
        body: body ? JSON.stringify(body) : undefined
      });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      return res.json();
    };

    const load = async (method, url) => {
      setStatus('Loading...', 'info');
      render(await request(method, url));
      setStatus('', '');
    };

    const updateGoal = async (patch) => {
      await request('PUT', '/api/config', patch);
      await load('GET', '/api/dashboard');
    };

    const fail = (err) => setStatus(err.message, 'error');

    tabs.forEach((tab) => {
      tab.addEventListener('click', () => updateGoal({ mode: tab.dataset.mode }).catch(fail));
    });
    $('daily-goal').addEventListener('change', (e) =>
      updateGoal({ daily_goal_hours: Number(e.target.value) }).catch(fail));
    $('target-total').addEventListener('change', (e) =>
      updateGoal({ target_total_hours: Number(e.target.value) }).catch(fail));
    $('streak-min').addEventListener('change', (e) =>
      updateGoal({ streak_min_minutes: Math.max(0, Math.round(Number(e.target.value))) }).catch(fail));
    $('refresh').addEventListener('click', () => load('POST', '/api/refresh').catch(fail));

    load('POST', '/api/refresh').catch(fail);
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_escapes_username() {
        let html = render_dashboard("<b>eve</b>");
        assert!(html.contains("Tracking &lt;b&gt;eve&lt;/b&gt;"));
        assert!(!html.contains("{{USER}}"));
        assert!(!html.contains("{{STYLE}}"));
    }

    #[test]
    fn dashboard_page_load_refetches_stats() {
        let html = render_dashboard("bob");
        let script_end = html.find("</script>").unwrap();
        let last_call = html[..script_end].trim_end().lines().last().unwrap().trim();
        assert_eq!(last_call, "load('POST', '/api/refresh').catch(fail);");
    }

    #[test]
    fn login_prefills_current_user() {
        let html = render_login(Some("U0123"));
        assert!(html.contains(r#"value="U0123""#));
        assert!(html.contains(r#"action="/login""#));
        assert!(render_login(None).contains(r#"value="""#));
    }
}
