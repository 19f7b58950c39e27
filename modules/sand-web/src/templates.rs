/// Render the collector form. Results are fetched from `/collect` client-side.
pub fn render_collect_form() -> String {
    let content = r#"
<div class="container">
    <h1>sand · tweet collector</h1>

    <div class="field">
        <label for="handle">account</label>
        <input type="text" id="handle" placeholder="@handle" autocomplete="off" spellcheck="false">
    </div>

    <div class="field">
        <label for="topic">topic (optional)</label>
        <input type="text" id="topic" placeholder="keyword or phrase" autocomplete="off" spellcheck="false">
        <div class="hint">searches tweets containing this term</div>
    </div>

    <div class="row">
        <div class="field"><label for="from">from</label><input type="date" id="from"></div>
        <div class="field"><label for="to">to</label><input type="date" id="to"></div>
    </div>

    <div class="field">
        <label for="limit">limit</label>
        <select id="limit">
            <option value="20">20 tweets</option>
            <option value="50">50 tweets</option>
            <option value="100" selected>100 tweets</option>
            <option value="500">500 tweets</option>
            <option value="all">all tweets</option>
        </select>
    </div>

    <div class="actions"><button id="fetch">collect</button></div>
    <div class="status" id="status"></div>

    <div class="results" id="results" style="display:none">
        <div class="results-header">
            <span class="count" id="count"></span>
            <button class="secondary" id="download">download json</button>
        </div>
        <div id="tweets"></div>
    </div>
</div>
<script>
const $ = id => document.getElementById(id);
const btn = $('fetch'), status = $('status'), results = $('results');
let collected = null;

['handle', 'topic'].forEach(id => $(id).addEventListener('keydown', e => {
    if (e.key === 'Enter') btn.click();
}));

function escapeHtml(s) {
    return (s || '').replace(/&/g, '&amp;').replace(/</g, '&lt;').replace(/>/g, '&gt;');
}

function formatDate(s) {
    if (!s) return '';
    const d = new Date(s);
    return isNaN(d) ? s : d.toLocaleDateString('en-US', { year: 'numeric', month: 'short', day: 'numeric' });
}

function setStatus(cls, text) {
    status.className = 'status ' + cls;
    status.textContent = text;
}

btn.addEventListener('click', async () => {
    const handle = $('handle').value.trim().replace(/^@/, '');
    if (!handle) return setStatus('error', 'enter a handle');

    btn.disabled = true;
    setStatus('loading', 'collecting...');
    results.style.display = 'none';
    collected = null;

    const params = new URLSearchParams({
        handle,
        topic: $('topic').value.trim(),
        from: $('from').value,
        to: $('to').value,
        limit: $('limit').value,
    });

    try {
        const data = await (await fetch('/collect?' + params)).json();
        if (data.error) {
            setStatus('error', data.error);
        } else {
            collected = data;
            setStatus('success', 'done');
            $('count').textContent = data.tweets.length + ' tweets';
            let html = data.tweets.slice(0, 30).map(t =>
                `<div class="tweet"><div class="tweet-text">${escapeHtml(t.text)}</div><div class="tweet-meta">${formatDate(t.date)}</div></div>`
            ).join('');
            if (data.tweets.length > 30) {
                html += `<div class="hint" style="padding:14px 0">showing 30 of ${data.tweets.length}</div>`;
            }
            $('tweets').innerHTML = html;
            results.style.display = 'block';
        }
    } catch (e) {
        setStatus('error', 'connection failed');
    }
    btn.disabled = false;
});

$('download').addEventListener('click', () => {
    if (!collected) return;
    const blob = new Blob([JSON.stringify(collected, null, 2)], { type: 'application/json' });
    const url = URL.createObjectURL(blob);
    const a = document.createElement('a');
    a.href = url;
    a.download = collected.handle + '_tweets.json';
    a.click();
    URL.revokeObjectURL(url);
});
</script>
"#;

    build_page("sand", content)
}

/// Shared page shell.
pub fn build_page(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
*{{margin:0;padding:0;box-sizing:border-box;}}
body{{font-family:'IBM Plex Mono',ui-monospace,monospace;background:#0a0a0a;color:#e5e5e5;min-height:100vh;padding:60px 24px;}}
.container{{max-width:560px;margin:0 auto;}}
h1{{font-size:13px;font-weight:500;letter-spacing:0.12em;text-transform:uppercase;color:#525252;margin-bottom:40px;}}
.field{{margin-bottom:20px;}}
label{{display:block;font-size:11px;letter-spacing:0.08em;text-transform:uppercase;color:#525252;margin-bottom:8px;}}
input,select{{width:100%;background:transparent;border:1px solid #262626;padding:12px 14px;font-family:inherit;font-size:14px;color:#e5e5e5;outline:none;}}
input:focus,select:focus{{border-color:#404040;}}
select option{{background:#1a1a1a;color:#e5e5e5;}}
.row{{display:grid;grid-template-columns:1fr 1fr;gap:16px;}}
.actions{{display:flex;gap:12px;margin:32px 0 24px;}}
button{{background:#e5e5e5;color:#0a0a0a;border:none;padding:12px 20px;font-family:inherit;font-size:12px;font-weight:500;letter-spacing:0.06em;cursor:pointer;}}
button:disabled{{opacity:0.3;cursor:not-allowed;}}
button.secondary{{background:transparent;border:1px solid #333;color:#a3a3a3;}}
.status{{font-size:12px;color:#525252;min-height:18px;}}
.status.error{{color:#ef4444;}}
.status.success{{color:#22c55e;}}
.status.loading{{color:#a3a3a3;}}
.results{{border-top:1px solid #1a1a1a;padding-top:24px;margin-top:24px;}}
.results-header{{display:flex;justify-content:space-between;align-items:center;margin-bottom:20px;}}
.count{{font-size:12px;color:#737373;}}
.tweet{{padding:14px 0;border-bottom:1px solid #1a1a1a;}}
.tweet:last-child{{border-bottom:none;}}
.tweet-text{{font-size:13px;line-height:1.65;color:#d4d4d4;margin-bottom:6px;}}
.tweet-meta{{font-size:11px;color:#404040;}}
.hint{{font-size:11px;color:#404040;margin-top:6px;}}
</style>
</head>
<body>
{content}
</body>
</html>"#,
        title = html_escape(title),
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_posts_to_collect_with_every_field() {
        let page = render_collect_form();
        assert!(page.starts_with("<!DOCTYPE html>"));
        for id in ["handle", "topic", "from", "to", "limit"] {
            assert!(page.contains(&format!(r#"id="{id}""#)), "missing field {id}");
        }
        assert!(page.contains("'/collect?'"));
        assert!(page.contains(r#"<option value="all">all tweets</option>"#));
    }

    #[test]
    fn titles_are_escaped() {
        let page = build_page("<b>&</b>", "");
        assert!(page.contains("<title>&lt;b&gt;&amp;&lt;/b&gt;</title>"));
    }
}
